use crate::compositing::blit_rgba;
use crate::config::BuildOptions;
use crate::error::{AtlasError, DecodeFailure, Result};
use crate::metadata::{self, FrameTable};
use crate::model::{Atlas, FrameRecord, Rect, Size};
use crate::packer::{BinPacker, MaxRectsPacker};
use crate::trim::{TrimBox, detect_edges};
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A decoded source image: path identifier plus pixels. Pixel data is
/// borrowed read-only for the duration of one build and never mutated.
#[derive(Debug)]
pub struct SpriteSource {
    pub path: String,
    pub image: DynamicImage,
}

impl SpriteSource {
    /// Decode one image from raw file bytes. The path is only an
    /// identifier; the core performs no filesystem access.
    pub fn decode(path: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let path = path.into();
        match image::load_from_memory(bytes) {
            Ok(image) => Ok(Self { path, image }),
            Err(source) => Err(AtlasError::Decode {
                failures: vec![DecodeFailure { path, source }],
            }),
        }
    }
}

/// Decode many images at once. Individual failures are collected and
/// surfaced together as one [`AtlasError::Decode`] listing every offending
/// path; a single bad file never silently disappears from the build.
/// With the `parallel` feature, decoding fans out across a worker pool.
pub fn decode_sprites(inputs: Vec<(String, Vec<u8>)>) -> Result<Vec<SpriteSource>> {
    #[cfg(feature = "parallel")]
    let results: Vec<Result<SpriteSource>> = inputs
        .into_par_iter()
        .map(|(path, bytes)| SpriteSource::decode(path, &bytes))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<SpriteSource>> = inputs
        .into_iter()
        .map(|(path, bytes)| SpriteSource::decode(path, &bytes))
        .collect();

    let mut sources = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(source) => sources.push(source),
            Err(AtlasError::Decode { failures: f }) => failures.extend(f),
            Err(other) => return Err(other),
        }
    }
    if failures.is_empty() {
        Ok(sources)
    } else {
        Err(AtlasError::Decode { failures })
    }
}

/// One named input group. Every group is built independently with its own
/// options; its atlases are emitted in bin-creation order.
pub struct BuildGroup {
    pub name: String,
    pub sources: Vec<SpriteSource>,
    pub options: BuildOptions,
}

/// Builds all groups and concatenates their atlases in group-then-bin
/// order. Any failure aborts the whole call; no partial list is returned.
pub fn build_atlases(groups: Vec<BuildGroup>) -> Result<Vec<Atlas>> {
    let mut atlases = Vec::new();
    for group in groups {
        atlases.extend(build_group(group)?);
    }
    Ok(atlases)
}

/// Builds one group: trim, pack, composite, encode, and assemble
/// metadata, yielding one [`Atlas`] per bin. Errors are wrapped with the
/// group name.
#[instrument(skip_all, fields(group = %group.name))]
pub fn build_group(group: BuildGroup) -> Result<Vec<Atlas>> {
    let name = group.name.clone();
    build_group_inner(group).map_err(|e| AtlasError::InGroup {
        group: name,
        source: Box::new(e),
    })
}

struct Prep {
    path: String,
    rgba: RgbaImage,
    trim: TrimBox,
    /// Trimmed width/height (equal to the source size when trimming is
    /// off).
    w: u32,
    h: u32,
    orig: (u32, u32),
}

struct Placed {
    idx: usize,
    slot: Rect,
}

fn build_group_inner(group: BuildGroup) -> Result<Vec<Atlas>> {
    let BuildGroup {
        name,
        sources,
        options,
    } = group;
    options.validate()?;
    if sources.is_empty() {
        return Err(AtlasError::EmptyInput);
    }

    let prepared = prepare_sources(&sources, &options)?;
    info!(group = %name, sprites = prepared.len(), "packing group");

    let bins = pack_bins(&prepared, &options)?;
    debug!(bins = bins.len(), "layout complete");

    #[cfg(feature = "parallel")]
    let results: Vec<Result<Atlas>> = bins
        .par_iter()
        .map(|placed| assemble_bin(placed, &prepared, &options))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<Atlas>> = bins
        .iter()
        .map(|placed| assemble_bin(placed, &prepared, &options))
        .collect();

    let mut atlases = Vec::with_capacity(results.len());
    for result in results {
        atlases.push(result?);
    }
    Ok(atlases)
}

/// Convert sources to RGBA, trim, and bounds-check each packed footprint.
/// The returned list is in submission order: footprint area descending,
/// ties broken by path, so identical inputs always pack identically.
fn prepare_sources(sources: &[SpriteSource], options: &BuildOptions) -> Result<Vec<Prep>> {
    let margin = options.margin;
    let mut prepared = Vec::with_capacity(sources.len());
    for src in sources {
        let rgba = src.image.to_rgba8();
        let (iw, ih) = rgba.dimensions();
        let trim = if options.trim {
            detect_edges(&rgba, options.trim_tolerance).ok_or_else(|| {
                AtlasError::EdgeDetection {
                    path: src.path.clone(),
                }
            })?
        } else {
            TrimBox::default()
        };
        let (w, h) = trim.trimmed_size(iw, ih);
        if w + margin > options.max_size || h + margin > options.max_size {
            return Err(AtlasError::OversizedItem {
                path: src.path.clone(),
                width: w + margin,
                height: h + margin,
                max: options.max_size,
            });
        }
        prepared.push(Prep {
            path: src.path.clone(),
            rgba,
            trim,
            w,
            h,
            orig: (iw, ih),
        });
    }
    prepared.sort_by(|a, b| {
        let area_a = (a.w + margin) as u64 * (a.h + margin) as u64;
        let area_b = (b.w + margin) as u64 * (b.h + margin) as u64;
        area_b.cmp(&area_a).then_with(|| a.path.cmp(&b.path))
    });
    Ok(prepared)
}

/// Greedy multi-bin packing: place everything that fits the current bin
/// in submission order, then open a new bin for the leftovers. Placement
/// itself is sequential; each decision depends on the previous ones.
fn pack_bins(prepared: &[Prep], options: &BuildOptions) -> Result<Vec<Vec<Placed>>> {
    let margin = options.margin;
    let mut remaining: Vec<usize> = (0..prepared.len()).collect();
    let mut bins: Vec<Vec<Placed>> = Vec::new();
    while !remaining.is_empty() {
        let mut packer = MaxRectsPacker::new(options.max_size, options.max_size);
        let mut placed: Vec<Placed> = Vec::new();
        let mut leftover: Vec<usize> = Vec::new();
        for &idx in &remaining {
            let p = &prepared[idx];
            match packer.insert(p.w + margin, p.h + margin) {
                Some(slot) => placed.push(Placed { idx, slot }),
                None => leftover.push(idx),
            }
        }
        if placed.is_empty() {
            // prepare_sources bounds every footprint by max_size, so the
            // first leftover always fits an empty bin
            let p = &prepared[remaining[0]];
            return Err(AtlasError::OversizedItem {
                path: p.path.clone(),
                width: p.w + margin,
                height: p.h + margin,
                max: options.max_size,
            });
        }
        debug!(bin = bins.len(), frames = placed.len(), "bin packed");
        bins.push(placed);
        remaining = leftover;
    }
    Ok(bins)
}

fn next_pow2(mut v: u32) -> u32 {
    if v <= 1 {
        return 1;
    }
    v -= 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}

/// Final bin dimensions: the content extent under smart sizing, otherwise
/// exactly `max_size` square; pow2/square adjustments are clamped so the
/// hard `max_size` bound always wins.
fn bin_size(placed: &[Placed], options: &BuildOptions) -> (u32, u32) {
    if !options.packer.smart_size {
        return (options.max_size, options.max_size);
    }
    let mut w = 0u32;
    let mut h = 0u32;
    for p in placed {
        w = w.max(p.slot.x + p.slot.w);
        h = h.max(p.slot.y + p.slot.h);
    }
    if options.packer.power_of_two {
        w = next_pow2(w.max(1));
        h = next_pow2(h.max(1));
    }
    if options.packer.square {
        let m = w.max(h);
        w = m;
        h = m;
    }
    (w.min(options.max_size), h.min(options.max_size))
}

/// Composite one bin's sprites onto a fresh transparent canvas, then
/// encode, hash, and build its metadata record.
fn assemble_bin(placed: &[Placed], prepared: &[Prep], options: &BuildOptions) -> Result<Atlas> {
    let margin = options.margin;
    let (bw, bh) = bin_size(placed, options);
    let mut canvas = RgbaImage::new(bw, bh);
    let mut table = FrameTable::new();
    for pl in placed {
        let p = &prepared[pl.idx];
        let (dx, dy) = (pl.slot.x + margin, pl.slot.y + margin);
        blit_rgba(
            &p.rgba,
            &mut canvas,
            dx,
            dy,
            p.trim.left,
            p.trim.top,
            p.w,
            p.h,
        );
        table.insert(
            &p.path,
            options.strip_extensions,
            FrameRecord {
                frame: Rect::new(dx, dy, p.w, p.h),
                trimmed: p.trim.is_trimmed(),
                sprite_source_size: Rect::new(p.trim.left, p.trim.top, p.w, p.h),
                source_size: Size {
                    w: p.orig.0,
                    h: p.orig.1,
                },
            },
        )?;
    }
    let atlas = metadata::finish_atlas(&canvas, table.into_frames(), options)?;
    debug!(image = %atlas.json.meta.image, frames = placed.len(), "atlas assembled");
    Ok(atlas)
}
