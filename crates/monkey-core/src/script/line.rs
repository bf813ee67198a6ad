use crate::error::ScriptError;

use super::types::{Directive, ParsedLine, SlideAction};

const SECTION_PREFIX: &str = "## Section:";

/// Parse a single script line.
///
/// Returns `Ok(None)` for blank lines and comments. Section headers
/// (`## Section: Name`) are the one `#`-prefixed form that is not a
/// comment.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<ParsedLine>, ScriptError> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = trimmed.strip_prefix(SECTION_PREFIX) {
        return Ok(Some(ParsedLine {
            line_number,
            directive: Directive::Section(rest.trim().to_string()),
        }));
    }

    if trimmed.starts_with('#') {
        return Ok(None);
    }

    if !trimmed.starts_with('[') {
        return Err(ScriptError::new(
            line_number,
            line,
            "expected a [DIRECTIVE] or '## Section:' header",
        ));
    }

    let directive = parse_directive(trimmed, line, line_number)?;
    Ok(Some(ParsedLine {
        line_number,
        directive,
    }))
}

/// Parse a `[TAG arg]` / `[TAG] arg` form. Both argument positions are
/// accepted; the after-bracket one wins when both are present.
fn parse_directive(
    trimmed: &str,
    raw: &str,
    line_number: usize,
) -> Result<Directive, ScriptError> {
    let close = trimmed
        .find(']')
        .ok_or_else(|| ScriptError::new(line_number, raw, "missing closing bracket ']'"))?;

    let inside = &trimmed[1..close];
    let after = trimmed[close + 1..].trim();

    let (tag, inline_arg) = match inside.find(char::is_whitespace) {
        Some(pos) => (&inside[..pos], inside[pos + 1..].trim()),
        None => (inside, ""),
    };
    let arg = if after.is_empty() { inline_arg } else { after };

    let err = |message: String| ScriptError::new(line_number, raw, message);
    let require = |what: &str| -> Result<String, ScriptError> {
        if arg.is_empty() {
            Err(err(format!("[{}] requires {what}", tag.to_uppercase())))
        } else {
            Ok(arg.to_string())
        }
    };
    let forbid = || -> Result<(), ScriptError> {
        if arg.is_empty() {
            Ok(())
        } else {
            Err(err(format!(
                "[{}] takes no argument, found '{arg}'",
                tag.to_uppercase()
            )))
        }
    };

    match tag.to_uppercase().as_str() {
        "SAY" => Ok(Directive::Say(require("narration text")?)),
        "TYPE" => Ok(Directive::Type(require("text to type")?)),
        "RUN" => {
            forbid()?;
            Ok(Directive::Run)
        }
        "PAUSE" => {
            if arg.is_empty() {
                Ok(Directive::Pause(None))
            } else {
                let secs: u64 = arg
                    .parse()
                    .map_err(|_| err(format!("invalid PAUSE duration: '{arg}'")))?;
                Ok(Directive::Pause(Some(secs)))
            }
        }
        "FOCUS" => Ok(Directive::Focus(require("an application name")?)),
        "SLIDE" => {
            let action = match require("'next', 'prev', or a slide number")?
                .to_lowercase()
                .as_str()
            {
                "next" => SlideAction::Next,
                "prev" | "previous" => SlideAction::Prev,
                other => {
                    let n: u32 = other.parse().map_err(|_| {
                        err(format!(
                            "invalid SLIDE argument: '{arg}' (expected 'next', 'prev', or a number)"
                        ))
                    })?;
                    if n == 0 {
                        return Err(err("slide numbers start at 1".to_string()));
                    }
                    SlideAction::GoTo(n)
                }
            };
            Ok(Directive::Slide(action))
        }
        "KEY" => Ok(Directive::Key(require("a key combo")?)),
        "CLEAR" => {
            forbid()?;
            Ok(Directive::Clear)
        }
        "WAIT" => {
            let raw_secs = require("a duration in seconds")?;
            let secs: u64 = raw_secs
                .parse()
                .map_err(|_| err(format!("invalid WAIT duration: '{arg}'")))?;
            Ok(Directive::Wait(secs))
        }
        "EXEC" => Ok(Directive::Exec(require("a shell command")?)),
        other => Err(err(format!("unknown directive: [{other}]"))),
    }
}
