//! Core library for packing sprites into texture atlases.
//!
//! - Trimming: transparent borders are detected per sprite (alpha-edge scan
//!   with a tolerance) and removed before packing
//! - Packing: best-area-fit MaxRects across one or more size-bounded bins;
//!   frames are never rotated
//! - Output: one RGBA canvas per bin, encoded to PNG/JPEG, plus a
//!   TexturePacker-style JSON document whose image name is derived from a
//!   content hash of the encoded bytes
//!
//! Quick example:
//! ```ignore
//! use spritepress_core::{BuildGroup, BuildOptions, SpriteSource, build_atlases};
//! # fn main() -> anyhow::Result<()> {
//! let sources = vec![
//!     SpriteSource::decode("sprites/a.png", &std::fs::read("sprites/a.png")?)?,
//!     SpriteSource::decode("sprites/b.png", &std::fs::read("sprites/b.png")?)?,
//! ];
//! let group = BuildGroup {
//!     name: "sprites".into(),
//!     sources,
//!     options: BuildOptions::default(),
//! };
//! let atlases = build_atlases(vec![group])?;
//! println!("atlases: {}", atlases.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod trim;

pub use config::*;
pub use error::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use trim::*;

/// Convenience prelude for common types and functions.
/// Importing `spritepress_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{BuildOptions, BuildOptionsBuilder, OutputFormat, PackerOptions};
    pub use crate::error::{AtlasError, Result};
    pub use crate::model::{Atlas, AtlasJson, AtlasMeta, FrameRecord, Rect, Size};
    pub use crate::pipeline::{BuildGroup, SpriteSource, build_atlases, build_group, decode_sprites};
    pub use crate::trim::{TrimBox, detect_edges};
}
