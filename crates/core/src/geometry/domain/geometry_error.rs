use thiserror::Error;

/// Why a landmark set could not be turned into signal samples.
///
/// Sessions treat every variant exactly like a frame without a face.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("insufficient landmarks: need at least {required}, got {actual}")]
    InsufficientLandmarks { required: usize, actual: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
}
