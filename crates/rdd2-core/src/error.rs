//! Derivation errors

use thiserror::Error;

/// Errors raised while building or evaluating a named function
///
/// Every variant is fatal for the derivation that produced it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Invalid identifier {0:?}")]
    InvalidName(String),
    #[error("Duplicate port {port:?} in function {function}")]
    DuplicatePort { function: String, port: String },
    #[error("Port {port:?} of function {function} has no elements")]
    EmptySignal { function: String, port: String },
    #[error("Input {port:?} of function {function} contains a non-symbolic element at index {index}")]
    InputNotSymbolic {
        function: String,
        port: String,
        index: usize,
    },
    #[error("Symbol {symbol}[{index}] is declared twice in function {function}")]
    DuplicateSymbol {
        function: String,
        symbol: String,
        index: usize,
    },
    #[error("Output of function {function} depends on undeclared symbol {symbol}[{index}]")]
    FreeSymbol {
        function: String,
        symbol: String,
        index: usize,
    },
    #[error("Function {function} expects {expected} arguments, got {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("Argument {port:?} of function {function} expects {expected} elements, got {found}")]
    ShapeMismatch {
        function: String,
        port: String,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while loading or validating a [`LawConfig`](crate::config::LawConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parameter {0} must be finite")]
    NonFinite(&'static str),
    #[error("Parameter {0} must be positive")]
    NotPositive(&'static str),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
