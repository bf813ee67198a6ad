//! The action backend capability.
//!
//! The server is written against [`ActionBackend`] so tests can swap in
//! a recording implementation; production uses [`AppleScriptBackend`].

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::{sleep, Duration};

use monkey_core::script::{Directive, SlideAction};

use crate::applescript;
use crate::typewriter;

/// Why an action block could not be enacted. The Display text is what
/// travels back to the Controller inside an error ack.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to run osascript: {0}")]
    Osascript(#[source] std::io::Error),
    #[error("osascript error: {0}")]
    Script(String),
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{directive} failed: {cause}")]
    Action { directive: String, cause: String },
}

/// Capability for enacting a list of actions against a desktop.
///
/// One call per `Execute` message; implementations process the list in
/// order and stop at the first failure.
#[async_trait]
pub trait ActionBackend: Send + Sync {
    async fn execute(
        &self,
        actions: &[Directive],
        typing_speed: u64,
        typing_variance: u64,
    ) -> Result<(), BackendError>;
}

/// The production backend: AppleScript via the host `osascript`.
#[derive(Debug, Default)]
pub struct AppleScriptBackend;

impl AppleScriptBackend {
    pub fn new() -> Self {
        Self
    }

    async fn dispatch(
        &self,
        action: &Directive,
        typing_speed: u64,
        typing_variance: u64,
    ) -> Result<(), BackendError> {
        match action {
            Directive::Focus(app) => {
                applescript::run_applescript(&applescript::focus_app_script(app)).await?;
            }
            Directive::Type(text) => {
                typewriter::type_text(text, typing_speed, typing_variance).await?;
            }
            Directive::Run => {
                applescript::run_applescript(&applescript::keystroke_script("return")).await?;
            }
            Directive::Slide(slide) => {
                let script = match slide {
                    SlideAction::Next => applescript::slide_next_script(),
                    SlideAction::Prev => applescript::slide_prev_script(),
                    SlideAction::GoTo(n) => applescript::slide_goto_script(*n),
                };
                applescript::run_applescript(&script).await?;
            }
            Directive::Key(combo) => {
                applescript::run_applescript(&applescript::keystroke_script(combo)).await?;
            }
            Directive::Clear => {
                applescript::run_applescript(&applescript::clear_script()).await?;
            }
            Directive::Wait(secs) => {
                sleep(Duration::from_secs(*secs)).await;
            }
            Directive::Exec(cmd) => {
                // Fire and forget; the subprocess outlives this block.
                Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .spawn()
                    .map_err(|source| BackendError::Spawn {
                        command: cmd.clone(),
                        source,
                    })?;
            }
            // Presenter-side directives never reach a backend, but an
            // agent must stay well-behaved if they do.
            Directive::Say(_) | Directive::Pause(_) | Directive::Section(_) => {}
        }
        Ok(())
    }
}

#[async_trait]
impl ActionBackend for AppleScriptBackend {
    async fn execute(
        &self,
        actions: &[Directive],
        typing_speed: u64,
        typing_variance: u64,
    ) -> Result<(), BackendError> {
        for action in actions {
            tracing::debug!(action = %action, "dispatching");
            if let Err(err) = self.dispatch(action, typing_speed, typing_variance).await {
                return Err(BackendError::Action {
                    directive: action.to_string(),
                    cause: err.to_string(),
                });
            }
        }
        Ok(())
    }
}
