//! Error types shared across moviekit crates.

use std::path::PathBuf;

/// Which bound check rejected a trim or seek range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeViolation {
    #[error("the start of the clip can't be bigger than its end")]
    StartAfterEnd,

    #[error("the start cannot be bigger than the length of the clip")]
    StartPastDuration,

    #[error("the end cannot be bigger than the length of the clip")]
    EndPastDuration,

    #[error("the start cannot be negative")]
    NegativeStart,

    #[error("range bounds must be finite numbers")]
    NotFinite,
}

/// Top-level error type for moviekit operations.
#[derive(Debug, thiserror::Error)]
pub enum MoviekitError {
    #[error("Load error for {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid range [{start}, {end}] for clip of {duration}s: {violation}")]
    Range {
        violation: RangeViolation,
        start: f64,
        end: f64,
        duration: f64,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Resource error: {message}")]
    Resource { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MoviekitError.
pub type MoviekitResult<T> = Result<T, MoviekitError>;

impl MoviekitError {
    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn range(violation: RangeViolation, start: f64, end: f64, duration: f64) -> Self {
        Self::Range {
            violation,
            start,
            end,
            duration,
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The range check that failed, if this is a range error.
    pub fn range_violation(&self) -> Option<RangeViolation> {
        match self {
            Self::Range { violation, .. } => Some(*violation),
            _ => None,
        }
    }

    /// Whether the error came from loading or inspecting a source.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::FileNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_message_names_violation() {
        let err = MoviekitError::range(RangeViolation::EndPastDuration, 1.0, 12.0, 10.0);
        let msg = err.to_string();
        assert!(msg.contains("end cannot be bigger"));
        assert!(msg.contains("10s"));
        assert_eq!(err.range_violation(), Some(RangeViolation::EndPastDuration));
    }

    #[test]
    fn test_load_error_classification() {
        assert!(MoviekitError::load("/tmp/x.mp4", "probe failed").is_load_error());
        assert!(MoviekitError::FileNotFound {
            path: PathBuf::from("/missing.mp4")
        }
        .is_load_error());
        assert!(!MoviekitError::render("boom").is_load_error());
        assert_eq!(MoviekitError::render("boom").range_violation(), None);
    }
}
