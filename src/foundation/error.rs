/// Convenience result type used across photostrip.
pub type PhotostripResult<T> = Result<T, PhotostripError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum PhotostripError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source photo or frame graphic could not be loaded or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The frame acquisition collaborator could not deliver a frame.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Composition was attempted before the layout's photo count was reached.
    #[error("incomplete photo set: expected {expected} photos, got {actual}")]
    IncompleteSet {
        /// Photos required by the active layout.
        expected: usize,
        /// Photos actually supplied.
        actual: usize,
    },

    /// An enhancement filter failed; callers fall back to a simpler adjustment.
    #[error("enhancement failure: {0}")]
    Enhancement(String),

    /// The capture sequencer refused an operation in its current state.
    #[error("rejected: {0}")]
    Rejected(String),

    /// No usable font could be resolved for caption rendering.
    #[error("font error: {0}")]
    Font(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotostripError {
    /// Build a [`PhotostripError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotostripError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PhotostripError::CaptureUnavailable`] value.
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable(msg.into())
    }

    /// Build a [`PhotostripError::Enhancement`] value.
    pub fn enhancement(msg: impl Into<String>) -> Self {
        Self::Enhancement(msg.into())
    }

    /// Build a [`PhotostripError::Rejected`] value.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Build a [`PhotostripError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Whether the error should be shown to the user as an actionable message.
    ///
    /// `IncompleteSet` is a caller bug and `Enhancement` is recovered locally.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Decode(_) | Self::CaptureUnavailable(_) | Self::Font(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
