//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => crate::exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(DomainError::MalformedTree { .. })
                | ApplicationError::Domain(DomainError::DuplicateId { .. })
                | ApplicationError::Parse { .. } => crate::exitcode::DATAERR,
                ApplicationError::Domain(_) => crate::exitcode::USAGE,
                ApplicationError::FileNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::Config { .. } | ApplicationError::UnknownScenario(_) => {
                    crate::exitcode::CONFIG
                }
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let malformed: CliError = DomainError::MalformedTree {
            location: "root".into(),
            reason: "missing field 'id'".into(),
        }
        .into();
        assert_eq!(malformed.exit_code(), crate::exitcode::DATAERR);

        let missing: CliError = ApplicationError::FileNotFound(PathBuf::from("x.json")).into();
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);

        let not_found: CliError = DomainError::NodeNotFound("x".into()).into();
        assert_eq!(not_found.exit_code(), crate::exitcode::USAGE);

        let scenario: CliError = ApplicationError::UnknownScenario("x".into()).into();
        assert_eq!(scenario.exit_code(), crate::exitcode::CONFIG);

        assert_eq!(
            CliError::Usage("no command".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
