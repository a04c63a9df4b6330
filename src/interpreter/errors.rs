use std::fmt;

use serde::Serialize;

use crate::parser::ParseError;
use crate::tokenizer::LexError;
use crate::vm::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    Syntax,
    Lexical,
    Arithmetic,
    UnboundName,
    MachineFault,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "E001",
            ErrorCode::Lexical => "E002",
            ErrorCode::Arithmetic => "E003",
            ErrorCode::UnboundName => "E004",
            ErrorCode::MachineFault => "E005",
        }
    }
}

/// One user-facing diagnostic: a stable code, a message and, when known,
/// the 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptError {
    pub code: ErrorCode,
    pub message: String,
    pub line: Option<usize>,
}

impl ScriptError {
    pub fn new(code: ErrorCode, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "error[{}] line {line}: {}", self.code_str(), self.message),
            None => write!(f, "error[{}]: {}", self.code_str(), self.message),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<LexError> for ScriptError {
    fn from(value: LexError) -> Self {
        ScriptError::new(ErrorCode::Lexical, value.to_string(), Some(value.line()))
    }
}

impl From<ParseError> for ScriptError {
    fn from(value: ParseError) -> Self {
        match value {
            ParseError::Lexical(err) => err.into(),
            other => ScriptError::new(ErrorCode::Syntax, other.to_string(), Some(other.line())),
        }
    }
}

impl From<RuntimeError> for ScriptError {
    fn from(value: RuntimeError) -> Self {
        ScriptError::new(runtime_error_code(&value), value.to_string(), value.line())
    }
}

pub fn runtime_error_code(error: &RuntimeError) -> ErrorCode {
    match error {
        RuntimeError::DivisionByZero { .. } | RuntimeError::Domain { .. } => {
            ErrorCode::Arithmetic
        }
        RuntimeError::UnboundVariable { .. } => ErrorCode::UnboundName,
        RuntimeError::StackOverflow { .. }
        | RuntimeError::StackUnderflow { .. }
        | RuntimeError::InvalidOperand { .. }
        | RuntimeError::TooDeep { .. }
        | RuntimeError::StackImbalance { .. } => ErrorCode::MachineFault,
    }
}
