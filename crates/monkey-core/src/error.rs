use thiserror::Error;

/// Script loading error, pointing at the offending source line.
///
/// Line numbers are 1-based and count from the top of the file,
/// front matter included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line_number}: {message}\n  | {line_content}")]
pub struct ScriptError {
    pub line_number: usize,
    pub line_content: String,
    pub message: String,
}

impl ScriptError {
    pub fn new(
        line_number: usize,
        line_content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            line_content: line_content.into(),
            message: message.into(),
        }
    }
}
