use thiserror::Error;

/// Errors raised while building a [`DurationFormat`](crate::format::DurationFormat)
/// or parsing text through one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid format pattern '{pattern}': {reason}")]
    InvalidFormatPattern { pattern: String, reason: String },

    #[error("Malformed duration text '{text}': {reason}")]
    MalformedDurationText { text: String, reason: String },
}

impl FormatError {
    pub(crate) fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormatPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn text(text: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDurationText {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
