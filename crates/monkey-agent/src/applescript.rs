//! AppleScript text generation and execution.
//!
//! Generation is pure string work; only [`run_applescript`] touches the
//! host's `osascript` interpreter.

use tokio::process::Command;

use crate::backend::BackendError;

/// Bring an application to the foreground.
pub fn focus_app_script(app_name: &str) -> String {
    format!("tell application \"{}\" to activate", escape(app_name))
}

pub fn slide_next_script() -> String {
    "tell application \"Keynote\"\nshow next\nend tell".to_string()
}

pub fn slide_prev_script() -> String {
    "tell application \"Keynote\"\nshow previous\nend tell".to_string()
}

pub fn slide_goto_script(n: u32) -> String {
    format!(
        "tell application \"Keynote\"\ntell front document\nset current slide to slide {n}\nend tell\nend tell"
    )
}

/// Keystroke for a `mod(+mod)*+key` combo, e.g. `cmd+shift+s`.
///
/// Reserved key names become `key code` forms; anything else is sent as
/// a literal `keystroke`. Modifier order follows the combo.
pub fn keystroke_script(combo: &str) -> String {
    let (modifiers, key) = split_combo(combo);

    let modifier_clause = match modifiers.len() {
        0 => String::new(),
        1 => format!(" using {}", modifier_name(modifiers[0])),
        _ => {
            let names: Vec<&str> = modifiers.iter().map(|m| modifier_name(m)).collect();
            format!(" using {{{}}}", names.join(", "))
        }
    };

    match key_code(key) {
        Some(code) => {
            format!("tell application \"System Events\" to key code {code}{modifier_clause}")
        }
        None => format!(
            "tell application \"System Events\" to keystroke \"{}\"{modifier_clause}",
            escape(key)
        ),
    }
}

/// Keystroke for a single typed character.
pub fn type_char_script(ch: char) -> String {
    let mut text = String::new();
    text.push(ch);
    format!(
        "tell application \"System Events\" to keystroke \"{}\"",
        escape(&text)
    )
}

/// Control-L, the conventional terminal clear.
pub fn clear_script() -> String {
    keystroke_script("ctrl+l")
}

/// Run a script through the host `osascript`, returning its stdout.
pub async fn run_applescript(script: &str) -> Result<String, BackendError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(BackendError::Osascript)?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(BackendError::Script(stderr))
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn split_combo(combo: &str) -> (Vec<&str>, &str) {
    let parts: Vec<&str> = combo.split('+').collect();
    match parts.split_last() {
        Some((key, modifiers)) => (modifiers.to_vec(), key),
        None => (Vec::new(), combo),
    }
}

fn modifier_name(raw: &str) -> &str {
    match raw.to_lowercase().as_str() {
        "cmd" | "command" => "command down",
        "ctrl" | "control" => "control down",
        "shift" => "shift down",
        "alt" | "opt" | "option" => "option down",
        _ => "command down",
    }
}

fn key_code(key: &str) -> Option<u32> {
    match key.to_lowercase().as_str() {
        "return" | "enter" => Some(36),
        "tab" => Some(48),
        "space" => Some(49),
        "delete" | "backspace" => Some(51),
        "escape" | "esc" => Some(53),
        "f1" => Some(122),
        "f2" => Some(120),
        "f3" => Some(99),
        "f4" => Some(118),
        "f5" => Some(96),
        "left" => Some(123),
        "right" => Some(124),
        "down" => Some(125),
        "up" => Some(126),
        _ => None,
    }
}
