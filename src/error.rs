/// Crate-level error type for fretscribe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pipeline or analysis setting cannot produce a valid run.
    #[error("invalid configuration `{name}`: got {value}, {reason}")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Data handed to a pipeline stage violates its contract.
    #[error("invalid input `{name}`: got {value}, {reason}")]
    InvalidInput {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// Audio decoding and resampling errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn input(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for fretscribe operations.
pub type Result<T> = std::result::Result<T, Error>;
