use std::io;
use thiserror::Error;

/// Exit code for operational failures (remote call, credential, missing doc file).
pub const EXIT_ERROR: u8 = 1;
/// Exit code for user-correctable input problems.
pub const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Ledger is corrupt ({path}): {reason}")]
    LedgerCorrupt { path: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0} environment variable is not set")]
    MissingCredential(String),
    #[error("Doc file missing: {0}")]
    MissingDocFile(String),
    #[error("LLM error: {0}")]
    Remote(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocgenError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DocgenError::InvalidInput(_) => EXIT_INVALID_INPUT,
            _ => EXIT_ERROR,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DocgenError::InvalidInput(_))
    }
}

impl From<reqwest::Error> for DocgenError {
    fn from(err: reqwest::Error) -> Self {
        DocgenError::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_exit_two() {
        let err = DocgenError::InvalidInput("File is empty: a.py".into());
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
        assert_eq!(err.to_string(), "File is empty: a.py");
    }

    #[test]
    fn operational_errors_map_to_exit_one() {
        let errs = [
            DocgenError::Remote("quota exceeded".into()),
            DocgenError::MissingCredential("OPENAI_API_KEY".into()),
            DocgenError::MissingDocFile("docs/a.md".into()),
            DocgenError::IoError(io::Error::other("disk full")),
        ];
        for err in errs {
            assert_eq!(err.exit_code(), EXIT_ERROR, "{err}");
        }
    }

    #[test]
    fn messages_match_operator_wording() {
        assert_eq!(
            DocgenError::MissingCredential("OPENAI_API_KEY".into()).to_string(),
            "OPENAI_API_KEY environment variable is not set"
        );
        assert_eq!(
            DocgenError::Remote("timeout".into()).to_string(),
            "LLM error: timeout"
        );
    }

    #[test]
    fn json_failures_are_serialization_errors() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = DocgenError::from(json_err);
        assert!(matches!(err, DocgenError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error: "));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }
}
