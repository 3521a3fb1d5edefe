use thiserror::Error;

/// Failures inside the adjustment pipeline and its buffers.
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("buffer holds {actual} bytes, expected {expected}")]
    InvalidBufferLength { expected: usize, actual: usize },

    #[error("{width}x{height} RGBA buffer does not fit in memory")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("stage produced {actual:?} pixels from a {expected:?} input")]
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("invalid value {value} for {field}")]
    InvalidParameter { field: &'static str, value: f32 },

    #[error("unknown parameter: {0}")]
    UnknownField(String),

    #[error("image is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("no image loaded")]
    NoImage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable failures of the external mosaic collaborator.
///
/// None of these alter the active image or the parameters.
#[derive(Debug, Error)]
pub enum MosaicError {
    #[error("mosaic service answered with status {0}")]
    Status(u16),

    #[error("mosaic request failed: {0}")]
    Transport(String),

    #[error("unexpected mosaic response type: {0}")]
    UnexpectedContentType(String),

    #[error("mosaic response is not a readable image: {0}")]
    Decode(String),

    #[error("mosaic response belongs to a superseded request")]
    Superseded,

    #[error("no image loaded")]
    NoImage,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T, E = AdjustError> = std::result::Result<T, E>;
