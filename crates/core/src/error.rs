/// Result alias that carries the custom [`SwitcherError`] type.
pub type Result<T> = std::result::Result<T, SwitcherError>;

/// Common error type for the core crate.
///
/// Switcher operations themselves never fail; errors only surface from the
/// edges (configuration files, storage backends, parsing operator input).
#[derive(Debug, thiserror::Error)]
pub enum SwitcherError {
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a config file or persisted record.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown overlay variant `{0}`")]
    UnknownOverlay(String),
    #[error("unknown video source `{0}`")]
    UnknownVideoSource(String),
    /// Cue timings that would let the overlay swap show on air.
    #[error("invalid transition cue: {0}")]
    InvalidCue(String),
}

impl SwitcherError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SwitcherError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SwitcherError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
