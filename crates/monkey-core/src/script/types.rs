use std::fmt;

use serde::{Deserialize, Serialize};

/// Slide deck movement carried by a `[SLIDE]` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideAction {
    Next,
    Prev,
    GoTo(u32),
}

/// One parsed line of a `.cm` script.
///
/// `Say`, `Pause`, and `Section` are presenter-side; everything else is
/// shipped to the agent inside an action block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    Say(String),
    Type(String),
    Run,
    Pause(Option<u64>),
    Focus(String),
    Slide(SlideAction),
    Key(String),
    Clear,
    Wait(u64),
    Exec(String),
    Section(String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Say(text) => write!(f, "[SAY] {text}"),
            Directive::Type(text) => write!(f, "[TYPE] {text}"),
            Directive::Run => write!(f, "[RUN]"),
            Directive::Pause(None) => write!(f, "[PAUSE]"),
            Directive::Pause(Some(secs)) => write!(f, "[PAUSE {secs}]"),
            Directive::Focus(app) => write!(f, "[FOCUS] {app}"),
            Directive::Slide(SlideAction::Next) => write!(f, "[SLIDE next]"),
            Directive::Slide(SlideAction::Prev) => write!(f, "[SLIDE prev]"),
            Directive::Slide(SlideAction::GoTo(n)) => write!(f, "[SLIDE {n}]"),
            Directive::Key(combo) => write!(f, "[KEY {combo}]"),
            Directive::Clear => write!(f, "[CLEAR]"),
            Directive::Wait(secs) => write!(f, "[WAIT {secs}]"),
            Directive::Exec(cmd) => write!(f, "[EXEC {cmd}]"),
            Directive::Section(name) => write!(f, "## Section: {name}"),
        }
    }
}

/// Typed configuration from the optional `---` header block.
///
/// Unknown keys are ignored so scripts can carry annotations for other
/// tooling. Timing fields are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub typing_speed: u64,
    pub typing_variance: u64,
    pub agent_port: u16,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            typing_speed: 40,
            typing_variance: 15,
            agent_port: 9876,
        }
    }
}

/// A directive together with the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line_number: usize,
    pub directive: Directive,
}

/// A fully parsed script: header configuration plus ordered directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub front_matter: FrontMatter,
    pub lines: Vec<ParsedLine>,
}
