use thiserror::Error;

/// One image that failed to decode, with the decoder's error.
#[derive(Debug)]
pub struct DecodeFailure {
    pub path: String,
    pub source: image::ImageError,
}

fn decode_paths(failures: &[DecodeFailure]) -> String {
    failures
        .iter()
        .map(|f| f.path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported output format `{format}`; supported formats are png and jpeg")]
    UnsupportedFormat { format: String },
    #[error("no input files")]
    EmptyInput,
    #[error("failed to decode {} image(s): {}", .failures.len(), decode_paths(.failures))]
    Decode { failures: Vec<DecodeFailure> },
    #[error("cannot detect edges of `{path}`: image is fully transparent")]
    EdgeDetection { path: String },
    #[error(
        "`{path}` needs a {width}x{height} slot (margin included), larger than the {max}x{max} bin limit"
    )]
    OversizedItem {
        path: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("frame name `{name}` is claimed by both `{first}` and `{second}`")]
    NamingConflict {
        name: String,
        first: String,
        second: String,
    },
    #[error("group `{group}`: {source}")]
    InGroup {
        group: String,
        #[source]
        source: Box<AtlasError>,
    },
}

pub type Result<T> = std::result::Result<T, AtlasError>;
