// ------------------------------------------------------------
// Errors
// ------------------------------------------------------------

use thiserror::Error;

/// Failures raised by the color resolution pipeline.
///
/// Abandoning an in-flight stage is not represented here; see
/// [`crate::pipeline::Stage`].
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed configuration. Always caller-correctable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A weighted computation saw zero total weight across all of its inputs.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("at least one centroid is required")]
    EmptyCentroidSet,

    #[error("unable to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid color: {0}")]
    Color(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
