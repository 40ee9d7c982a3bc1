//! Domain error types.

use crate::domain::universe::ScheduleError;

/// Top-level error type for optpipe.
#[derive(Debug, thiserror::Error)]
pub enum OptpipeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("chain retrieval failed for {root}: {reason}")]
    Chain { root: String, reason: String },

    #[error("malformed chain record in {source_name}: {reason}")]
    ChainFormat { source_name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&OptpipeError> for std::process::ExitCode {
    fn from(err: &OptpipeError) -> Self {
        let code: u8 = match err {
            OptpipeError::Io(_) => 1,
            OptpipeError::ConfigParse { .. }
            | OptpipeError::ConfigMissing { .. }
            | OptpipeError::ConfigInvalid { .. } => 2,
            OptpipeError::Chain { .. } | OptpipeError::ChainFormat { .. } => 3,
            OptpipeError::Schedule(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
