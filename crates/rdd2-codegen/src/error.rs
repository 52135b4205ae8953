//! Code generation errors

use thiserror::Error;

/// Errors raised by the C backend
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Unknown code generation option {0:?}")]
    UnknownOption(String),
    #[error("Option {0:?} is not supported by the C backend")]
    UnsupportedOption(String),
    #[error("Invalid output filename {0:?}")]
    InvalidFilename(String),
    #[error("Function {0} was already added")]
    DuplicateFunction(String),
    #[error("Function {function} contains non-finite constant {value}")]
    NonFiniteConstant { function: String, value: f64 },
    #[error("Invalid options document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Formatting failed")]
    Format(#[from] std::fmt::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
