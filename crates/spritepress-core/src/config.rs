use crate::error::AtlasError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output encodings supported for atlas images.
///
/// The set is fixed; parsing anything else yields
/// [`AtlasError::UnsupportedFormat`] before any work starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// File extension used when composing the `meta.image` path.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AtlasError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(AtlasError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Bin sizing knobs, passed through to the packing stage unmodified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerOptions {
    /// Round finished bin dimensions up to the next power of two.
    #[serde(default)]
    pub power_of_two: bool,
    /// Force finished bins to be square (max of width/height).
    #[serde(default)]
    pub square: bool,
    /// Shrink each bin to its content extent. When false, every bin is
    /// exactly `max_size` x `max_size`.
    #[serde(default = "default_smart_size")]
    pub smart_size: bool,
}

impl Default for PackerOptions {
    fn default() -> Self {
        Self {
            power_of_two: false,
            square: false,
            smart_size: default_smart_size(),
        }
    }
}

/// Options for one atlas build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Encoding of the output images.
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    /// Directory prefix recorded in `meta.image`; the core never touches
    /// the filesystem itself.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Empty pixels kept between frames (and folded into each packed
    /// footprint).
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// Drop the last `.`-delimited segment from frame names.
    #[serde(default)]
    pub strip_extensions: bool,
    /// Maximum bin width and height. A new bin opens once a sprite no
    /// longer fits; a sprite that cannot fit an empty bin is an error.
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// Trim transparent sprite borders before packing.
    #[serde(default = "default_trim")]
    pub trim: bool,
    /// Alpha tolerance in `0..=1`; a pixel is transparent iff its alpha
    /// is <= `tolerance * 255`. Zero means exactly fully transparent.
    #[serde(default)]
    pub trim_tolerance: f32,
    /// Bin sizing knobs.
    #[serde(default)]
    pub packer: PackerOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            format: default_format(),
            out_dir: default_out_dir(),
            margin: default_margin(),
            strip_extensions: false,
            max_size: default_max_size(),
            trim: default_trim(),
            trim_tolerance: 0.0,
            packer: PackerOptions::default(),
        }
    }
}

impl BuildOptions {
    /// Validates the option set.
    ///
    /// Returns an error if the bin size is zero, the margin leaves no
    /// usable space, or the tolerance falls outside `0..=1`.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_size == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_size must be at least 1".into(),
            ));
        }
        if self.margin >= self.max_size {
            return Err(AtlasError::InvalidConfig(format!(
                "margin ({}) leaves no usable space in a {}x{} bin",
                self.margin, self.max_size, self.max_size
            )));
        }
        if !(0.0..=1.0).contains(&self.trim_tolerance) {
            return Err(AtlasError::InvalidConfig(format!(
                "trim_tolerance ({}) must be within 0..=1",
                self.trim_tolerance
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `BuildOptions`.
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::new()
    }
}

fn default_format() -> OutputFormat {
    OutputFormat::Png
}
fn default_out_dir() -> String {
    "atlases".into()
}
fn default_margin() -> u32 {
    1
}
fn default_max_size() -> u32 {
    4096
}
fn default_trim() -> bool {
    true
}
fn default_smart_size() -> bool {
    true
}

/// Builder for `BuildOptions` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BuildOptionsBuilder {
    opts: BuildOptions,
}

impl BuildOptionsBuilder {
    pub fn new() -> Self {
        Self {
            opts: BuildOptions::default(),
        }
    }
    pub fn format(mut self, v: OutputFormat) -> Self {
        self.opts.format = v;
        self
    }
    pub fn out_dir(mut self, v: impl Into<String>) -> Self {
        self.opts.out_dir = v.into();
        self
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.opts.margin = v;
        self
    }
    pub fn strip_extensions(mut self, v: bool) -> Self {
        self.opts.strip_extensions = v;
        self
    }
    pub fn max_size(mut self, v: u32) -> Self {
        self.opts.max_size = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.opts.trim = v;
        self
    }
    pub fn trim_tolerance(mut self, v: f32) -> Self {
        self.opts.trim_tolerance = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.opts.packer.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.opts.packer.square = v;
        self
    }
    pub fn smart_size(mut self, v: bool) -> Self {
        self.opts.packer.smart_size = v;
        self
    }
    pub fn build(self) -> BuildOptions {
        self.opts
    }
}
