// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause carried by [`BildwerkError::Processing`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Boundary errors --
    #[error("invalid input file: {}", path.display())]
    InvalidInput { path: PathBuf },

    #[error("invalid output file: {}", path.display())]
    InvalidOutput { path: PathBuf },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    // -- Processing errors --
    /// A named step (`decode`, `encode`, or a core operation) failed.
    #[error("error during {op}: {source}")]
    Processing {
        op: &'static str,
        #[source]
        source: BoxedCause,
    },

    /// Caller contract violation: zero geometry, too few inputs, bad config value.
    #[error("invalid parameter for {op}: {reason}")]
    InvalidParameter { op: &'static str, reason: String },

    // -- Configuration persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// Wrap any error as a failure of the step named `op`.
    pub fn processing(op: &'static str, source: impl Into<BoxedCause>) -> Self {
        Self::Processing {
            op,
            source: source.into(),
        }
    }

    pub fn invalid_parameter(op: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            op,
            reason: reason.into(),
        }
    }

    /// Short machine-friendly tag for the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidOutput { .. } => "invalid_output",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::Processing { .. } => "processing",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_error_names_operation_and_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated stream");
        let err = BildwerkError::processing("decode", cause);
        assert_eq!(err.to_string(), "error during decode: truncated stream");
        assert_eq!(err.kind(), "processing");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn path_variants_display_the_path() {
        let err = BildwerkError::InvalidInput {
            path: PathBuf::from("/tmp/missing.jpg"),
        };
        assert_eq!(err.to_string(), "invalid input file: /tmp/missing.jpg");

        let err = BildwerkError::InvalidOutput {
            path: PathBuf::from("out/x.png"),
        };
        assert_eq!(err.kind(), "invalid_output");
    }

    #[test]
    fn invalid_parameter_carries_reason() {
        let err = BildwerkError::invalid_parameter("resize", "target width is zero");
        assert_eq!(
            err.to_string(),
            "invalid parameter for resize: target width is zero"
        );
    }
}
