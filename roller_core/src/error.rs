use thiserror::Error;

/// Operator mistakes in a command token. Reported and then ignored; never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid command format: {0}")]
    InvalidFormat(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// Faults that end the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RollerError {
    #[error("device error: {0}")]
    Device(String),
    #[error("calibration malformed: {0}")]
    CalibrationMalformed(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Result of executing one command line: either the operator can retry, or the run is over.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecError {
    #[error(transparent)]
    Recoverable(#[from] CommandError),
    #[error(transparent)]
    Fatal(#[from] RollerError),
}

impl ExecError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Fatal(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing hardware context")]
    MissingHardware,
}

pub type Result<T> = std::result::Result<T, RollerError>;
