/// Convenience result type used across strata.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Degenerate geometry is never reported here: empty rectangles and empty
/// intersections are silent no-ops checked through `Rect::valid`.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Invalid task tree, parameters or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A surface could not be allocated. Fatal for the current render.
    #[error("allocation failed for {width}x{height} surface")]
    Allocation {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// The progress callback asked the render to stop.
    #[error("render cancelled")]
    Cancelled,

    /// A surface handle outlived the arena slot it pointed at.
    #[error("stale surface handle: {0}")]
    StaleSurface(String),

    /// An execution invariant did not hold (missing input, busy surface).
    #[error("execution error: {0}")]
    Execution(String),

    /// Errors when serializing or deserializing scene descriptions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Build a [`StrataError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StrataError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Build a [`StrataError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`StrataError::Allocation`] value.
    pub fn allocation(width: usize, height: usize) -> Self {
        Self::Allocation { width, height }
    }

    /// True when the error only signals a requested stop.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
