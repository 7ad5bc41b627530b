use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
}

/// Width/height pair used for source sizes and atlas page sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Placement and reconstruction metadata for one packed sprite.
///
/// `frame` is the rectangle inside the atlas image. `sprite_source_size`
/// carries the trimmed offset and size within the original image, and
/// `source_size` the pre-trim dimensions, so a renderer can pad the sprite
/// back to its original footprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub frame: Rect,
    pub trimmed: bool,
    pub sprite_source_size: Rect,
    pub source_size: Size,
}

/// Atlas-level metadata. `image` is the content-addressed output file name
/// (`<out_dir>/atlas-<hash8>.<ext>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasMeta {
    pub image: String,
    pub size: Size,
    pub scale: u32,
}

/// The JSON document emitted per atlas. Frames are keyed by name in a
/// `BTreeMap` so serialization order, and therefore the document bytes,
/// is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasJson {
    pub meta: AtlasMeta,
    pub frames: BTreeMap<String, FrameRecord>,
}

impl AtlasJson {
    /// Serialize to the pretty-printed JSON document that ships next to
    /// the atlas image.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One finished atlas: the JSON document plus the encoded image bytes.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub json: AtlasJson,
    pub image: Vec<u8>,
}

impl Atlas {
    /// The file name the encoded image should be served or written under.
    pub fn file_name(&self) -> &str {
        &self.json.meta.image
    }
}
