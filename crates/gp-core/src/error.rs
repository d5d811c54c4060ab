use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid dimension: {width}x{height} (both must be > 0)")]
    InvalidDimension { width: usize, height: usize },

    #[error("kernel size {width}x{height} must be odd in both dimensions")]
    EvenKernelSize { width: usize, height: usize },

    #[error("sigma must be finite and > 0, got {0}")]
    InvalidSigma(f32),

    #[error("degenerate intensity range: every sample equals {value}")]
    DegenerateRange { value: u8 },

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error(
        "dimension mismatch: expected {}x{}, got {}x{}",
        .expected.0,
        .expected.1,
        .actual.0,
        .actual.1
    )]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("sample {value} at ({x}, {y}) is not a binary label (0 or 1)")]
    NotBinary { x: usize, y: usize, value: u8 },

    #[error("unknown structuring element shape '{0}'")]
    UnknownShape(String),

    #[error("out of bounds")]
    OutOfBounds,

    #[error("invalid stride")]
    InvalidStride,
}
