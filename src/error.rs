//! Error taxonomy shared by the library, the CLI and the HTTP layer.
//!
//! Every variant carries a human-readable message. The HTTP layer turns any
//! of them into a `400 {detail}` response; the CLI maps them to exit codes.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Bad or missing user input (dates, identifiers, ranges).
    #[error("{0}")]
    Validation(String),

    /// The requested series file does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The series file exists but is not in the expected shape.
    #[error("{0}")]
    Format(String),

    /// No usable records fall inside the requested window.
    #[error("{0}")]
    EmptyRange(String),

    /// The statistic is undefined for the selected records.
    #[error("{0}")]
    Data(String),

    /// The seasonal model could not be fitted.
    #[error("{0}")]
    ModelFit(String),

    /// The prompt interpreter failed or answered in an unexpected form.
    #[error("{0}")]
    ExternalProcess(String),

    /// Invalid runtime settings.
    #[error("{0}")]
    Config(String),

    /// Failure writing an output file.
    #[error("{0}")]
    Io(String),
}

impl AppError {
    /// Process exit code used by the `carbon` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(_) | AppError::Config(_) | AppError::Io(_) => 2,
            AppError::NotFound(_)
            | AppError::Format(_)
            | AppError::EmptyRange(_)
            | AppError::Data(_) => 3,
            AppError::ModelFit(_) | AppError::ExternalProcess(_) => 4,
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Format(_) => "format",
            AppError::EmptyRange(_) => "empty_range",
            AppError::Data(_) => "data",
            AppError::ModelFit(_) => "model_fit",
            AppError::ExternalProcess(_) => "external_process",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}
