/// Crate-wide result alias.
pub type SpeakifyResult<T> = Result<T, SpeakifyError>;

/// Fieldless error category, for callers that branch on the kind of failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad resolution/frame count or bad engine options.
    InvalidArgument,
    /// The input signature matches no supported format.
    UnsupportedFormat,
    /// The input matches a known signature but is structurally invalid.
    CorruptInput,
    /// The input parsed but produced zero frames.
    EmptySource,
    /// A non-positive or unrepresentable resolution reached the resampler.
    InvalidResolution,
    /// Output dimensions or indices exceed what the GIF format can represent.
    EncodingOverflow,
    /// Invariant violation between pipeline stages.
    Internal,
}

/// Typed conversion failure carrying a human-readable message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeakifyError {
    /// See [`ErrorKind::InvalidArgument`].
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// See [`ErrorKind::UnsupportedFormat`].
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// See [`ErrorKind::CorruptInput`].
    #[error("corrupt input: {0}")]
    CorruptInput(String),

    /// See [`ErrorKind::EmptySource`].
    #[error("empty source: {0}")]
    EmptySource(String),

    /// See [`ErrorKind::InvalidResolution`].
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// See [`ErrorKind::EncodingOverflow`].
    #[error("encoding overflow: {0}")]
    EncodingOverflow(String),

    /// See [`ErrorKind::Internal`].
    #[error("internal error: {0}")]
    Internal(String),
}

impl SpeakifyError {
    /// Build an [`SpeakifyError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build an [`SpeakifyError::UnsupportedFormat`].
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build an [`SpeakifyError::CorruptInput`].
    pub fn corrupt_input(msg: impl Into<String>) -> Self {
        Self::CorruptInput(msg.into())
    }

    /// Build an [`SpeakifyError::EmptySource`].
    pub fn empty_source(msg: impl Into<String>) -> Self {
        Self::EmptySource(msg.into())
    }

    /// Build an [`SpeakifyError::InvalidResolution`].
    pub fn invalid_resolution(msg: impl Into<String>) -> Self {
        Self::InvalidResolution(msg.into())
    }

    /// Build an [`SpeakifyError::EncodingOverflow`].
    pub fn encoding_overflow(msg: impl Into<String>) -> Self {
        Self::EncodingOverflow(msg.into())
    }

    /// Build an [`SpeakifyError::Internal`].
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::CorruptInput(_) => ErrorKind::CorruptInput,
            Self::EmptySource(_) => ErrorKind::EmptySource,
            Self::InvalidResolution(_) => ErrorKind::InvalidResolution,
            Self::EncodingOverflow(_) => ErrorKind::EncodingOverflow,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m)
            | Self::UnsupportedFormat(m)
            | Self::CorruptInput(m)
            | Self::EmptySource(m)
            | Self::InvalidResolution(m)
            | Self::EncodingOverflow(m)
            | Self::Internal(m) => m,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
