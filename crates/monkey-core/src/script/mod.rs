//! The `.cm` script parser.
//!
//! A script is UTF-8 text, one directive per line, optionally headed by
//! a `---` front matter block. Line endings may be `\n` or `\r\n`.

mod front_matter;
mod line;
mod types;

pub use front_matter::extract_front_matter;
pub use line::parse_line;
pub use types::{Directive, FrontMatter, ParsedLine, Script, SlideAction};

use crate::error::ScriptError;

/// Parse a whole script file.
///
/// Line numbers in errors and in [`ParsedLine`] are 1-based and relative
/// to the full file, front matter included. The first error wins.
pub fn parse_script(input: &str) -> Result<Script, ScriptError> {
    // str::lines already strips the \r of \r\n endings.
    let raw_lines: Vec<&str> = input.lines().collect();
    let (front_matter, content_start) = extract_front_matter(&raw_lines)?;

    let mut lines = Vec::new();
    for (offset, raw) in raw_lines[content_start..].iter().enumerate() {
        let line_number = content_start + offset + 1;
        if let Some(parsed) = parse_line(raw, line_number)? {
            lines.push(parsed);
        }
    }

    tracing::debug!(
        directives = lines.len(),
        title = front_matter.title.as_deref().unwrap_or(""),
        "parsed script"
    );

    Ok(Script {
        front_matter,
        lines,
    })
}
