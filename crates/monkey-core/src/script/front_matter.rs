use crate::error::ScriptError;

use super::types::FrontMatter;

const FENCE: &str = "---";

/// Extract the optional `---` header block.
///
/// Returns the parsed configuration and the index of the first content
/// line. A script without a leading fence gets the defaults and starts
/// at index 0.
pub fn extract_front_matter(lines: &[&str]) -> Result<(FrontMatter, usize), ScriptError> {
    if lines.first().map(|l| l.trim()) != Some(FENCE) {
        return Ok((FrontMatter::default(), 0));
    }

    let closing = lines[1..]
        .iter()
        .position(|l| l.trim() == FENCE)
        .map(|idx| idx + 1)
        .ok_or_else(|| {
            ScriptError::new(1, FENCE, "front matter opened but never closed with '---'")
        })?;

    let mut fm = FrontMatter::default();

    for (offset, line) in lines[1..closing].iter().enumerate() {
        let line_number = offset + 2;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Inline comments after a value are allowed.
        let entry = match trimmed.find('#') {
            Some(pos) => trimmed[..pos].trim(),
            None => trimmed,
        };
        if entry.is_empty() {
            continue;
        }

        let (key, value) = entry.split_once(':').ok_or_else(|| {
            ScriptError::new(line_number, *line, "expected 'key: value' in front matter")
        })?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "title" => fm.title = Some(value.to_string()),
            "typing_speed" => {
                fm.typing_speed = parse_field(value, key, line, line_number)?;
            }
            "typing_variance" => {
                fm.typing_variance = parse_field(value, key, line, line_number)?;
            }
            "agent_port" => {
                fm.agent_port = parse_field(value, key, line, line_number)?;
            }
            other => {
                tracing::debug!(key = other, "ignoring unknown front matter key");
            }
        }
    }

    Ok((fm, closing + 1))
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    key: &str,
    line: &str,
    line_number: usize,
) -> Result<T, ScriptError> {
    value.parse().map_err(|_| {
        ScriptError::new(line_number, line, format!("invalid {key} value: '{value}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<&str> {
        input.lines().collect()
    }

    #[test]
    fn absent_fence_yields_defaults_at_index_zero() {
        let (fm, start) = extract_front_matter(&split("[SAY] hi")).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(start, 0);
    }

    #[test]
    fn recognized_keys_override_defaults() {
        let input = "---\ntitle: My Talk\ntyping_speed: 60\n---\n[SAY] hi";
        let (fm, start) = extract_front_matter(&split(input)).unwrap();
        assert_eq!(fm.title, Some("My Talk".to_string()));
        assert_eq!(fm.typing_speed, 60);
        assert_eq!(fm.typing_variance, 15);
        assert_eq!(fm.agent_port, 9876);
        assert_eq!(start, 4);
    }

    #[test]
    fn all_fields() {
        let input = "---\ntitle: Demo\ntyping_speed: 50\ntyping_variance: 20\nagent_port: 4444\n---";
        let (fm, _) = extract_front_matter(&split(input)).unwrap();
        assert_eq!(fm.title, Some("Demo".to_string()));
        assert_eq!(fm.typing_speed, 50);
        assert_eq!(fm.typing_variance, 20);
        assert_eq!(fm.agent_port, 4444);
    }

    #[test]
    fn empty_block() {
        let (fm, start) = extract_front_matter(&split("---\n---\n[SAY] hi")).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(start, 2);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (fm, _) = extract_front_matter(&split("---\nspeaker: me\n---")).unwrap();
        assert_eq!(fm, FrontMatter::default());
    }

    #[test]
    fn inline_comments_are_stripped() {
        let (fm, _) =
            extract_front_matter(&split("---\ntyping_speed: 60  # fast\n---")).unwrap();
        assert_eq!(fm.typing_speed, 60);
    }

    #[test]
    fn non_numeric_value_reports_its_line() {
        let err = extract_front_matter(&split("---\ntyping_speed: abc\n---")).unwrap_err();
        assert_eq!(err.line_number, 2);
        assert!(err.message.contains("typing_speed"));
    }

    #[test]
    fn oversized_port_is_rejected() {
        let err = extract_front_matter(&split("---\nagent_port: 99999\n---")).unwrap_err();
        assert!(err.message.contains("agent_port"));
    }

    #[test]
    fn unterminated_fence_is_an_error() {
        let err = extract_front_matter(&split("---\ntitle: X")).unwrap_err();
        assert!(err.message.contains("never closed"));
    }
}
