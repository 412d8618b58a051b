//! Application errors.

use autodeps_core::SortingError;
use thiserror::Error;

/// Errors raised by the CLI.
#[derive(Debug, Error)]
pub enum AppError {
    /// File system failure (missing file, unreadable directory, write error).
    #[error("I/O error: {0}")]
    IoError(String),

    /// The document could not be parsed into a model.
    #[error("Invalid model document: {0}")]
    DocumentError(String),

    /// Unsupported document format.
    #[error("Unknown format: '{0}' (expected json or toml)")]
    UnknownFormat(String),

    /// The analysis itself failed.
    #[error(transparent)]
    Sorting(#[from] SortingError),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::DocumentError(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        Self::DocumentError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodeps_core::CycleError;

    #[test]
    fn sorting_errors_keep_their_message() {
        let err: AppError = SortingError::from(CycleError {
            from: "a".into(),
            to: "b".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        })
        .into();

        assert_eq!(
            err.to_string(),
            "Edge between 'a' and 'b' introduces a cycle in the graph: a --> b --> a"
        );
    }

    #[test]
    fn json_errors_become_document_errors() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid");
        assert!(matches!(AppError::from(parse), AppError::DocumentError(_)));
    }
}
