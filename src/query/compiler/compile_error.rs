use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A node, method or operand the compiler cannot translate
    UnsupportedOperation(String),
    /// A member path that matches no column (strict resolution only)
    AmbiguousPath(String),
    /// Table metadata that could not be read or parsed
    InvalidMetadata(String),
}

impl CompileError {
    pub fn err<T>(self) -> Result<T> {
        Err(self)
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UnsupportedOperation(msg) => write!(f, "UnsupportedOperation: {}", msg),
            CompileError::AmbiguousPath(msg) => write!(f, "AmbiguousPath: {}", msg),
            CompileError::InvalidMetadata(msg) => write!(f, "InvalidMetadata: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {}

pub type Result<T> = std::result::Result<T, CompileError>;
