use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Cursor;

use image::RgbaImage;
use sha2::{Digest, Sha256};

use crate::config::{BuildOptions, OutputFormat};
use crate::error::{AtlasError, Result};
use crate::model::{Atlas, AtlasJson, AtlasMeta, FrameRecord, Size};

/// Derive the frame name for a source path: the final `/`-delimited
/// segment, minus the last `.`-delimited segment when stripping is
/// enabled. A name without an extension is left untouched.
pub fn frame_name(path: &str, strip_extension: bool) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    if strip_extension {
        match base.rfind('.') {
            Some(idx) if idx > 0 => base[..idx].to_string(),
            _ => base.to_string(),
        }
    } else {
        base.to_string()
    }
}

/// Accumulates the frame table for one atlas, rejecting name collisions.
#[derive(Debug, Default)]
pub struct FrameTable {
    frames: BTreeMap<String, FrameRecord>,
    sources: BTreeMap<String, String>,
}

impl FrameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record for `path`. Two sprites resolving to the same
    /// frame name within one atlas is an error carrying both paths.
    pub fn insert(
        &mut self,
        path: &str,
        strip_extensions: bool,
        record: FrameRecord,
    ) -> Result<()> {
        let name = frame_name(path, strip_extensions);
        if let Some(first) = self.sources.get(&name) {
            return Err(AtlasError::NamingConflict {
                name,
                first: first.clone(),
                second: path.to_string(),
            });
        }
        self.sources.insert(name.clone(), path.to_string());
        self.frames.insert(name, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> BTreeMap<String, FrameRecord> {
        self.frames
    }
}

/// Encode a finished canvas to the configured output format.
///
/// JPEG has no alpha channel, so the canvas is flattened to RGB first;
/// PNG keeps the RGBA data as-is.
pub fn encode_canvas(canvas: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            canvas.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            rgb.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)?;
        }
    }
    Ok(bytes)
}

/// First 8 lowercase hex characters of the SHA-256 digest of `bytes`.
/// Identical pixel output always yields the identical suffix.
pub fn content_hash8(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(8);
    for b in digest.iter().take(4) {
        let _ = write!(hex, "{b:02x}");
    }
    hex
}

/// Compose the content-addressed image name: `<out_dir>/atlas-<hash8>.<ext>`.
pub fn atlas_image_name(out_dir: &str, hash8: &str, format: OutputFormat) -> String {
    format!("{}/atlas-{}.{}", out_dir, hash8, format.extension())
}

/// Encode one bin's canvas, hash it, and assemble the final [`Atlas`].
pub fn finish_atlas(
    canvas: &RgbaImage,
    frames: BTreeMap<String, FrameRecord>,
    options: &BuildOptions,
) -> Result<Atlas> {
    let image = encode_canvas(canvas, options.format)?;
    let hash = content_hash8(&image);
    let (w, h) = canvas.dimensions();
    let json = AtlasJson {
        meta: AtlasMeta {
            image: atlas_image_name(&options.out_dir, &hash, options.format),
            size: Size { w, h },
            scale: 1,
        },
        frames,
    };
    Ok(Atlas { json, image })
}
