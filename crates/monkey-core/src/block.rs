//! Grouping of parsed directives into presentable blocks.
//!
//! A block is the unit the presenter advances through: an action group
//! shipped to the agent, a pause, or a narration-only waypoint.

use serde::{Deserialize, Serialize};

use crate::script::{Directive, Script};

/// What a [`Block`] asks the presenter to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Ship `actions` to the agent and await the ack.
    Action,
    /// Hold, optionally auto-continuing after the timeout in seconds.
    Pause(Option<u64>),
    /// Nothing to execute; the narration is the point.
    NarrationOnly,
}

/// A unit of advancement.
///
/// Invariants upheld by [`group_blocks`]:
/// - `Action` blocks have non-empty `actions` containing no `Say`,
///   `Pause`, or `Section`.
/// - `Pause` and `NarrationOnly` blocks have empty `actions`.
/// - `NarrationOnly` blocks have non-empty `narration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub narration: Option<String>,
    pub actions: Vec<Directive>,
    pub section: Option<String>,
    pub kind: BlockKind,
}

/// Group a parsed script into ordered blocks.
pub fn group_blocks(script: &Script) -> Vec<Block> {
    let mut grouper = Grouper::default();
    for parsed in &script.lines {
        grouper.push(&parsed.directive);
    }
    grouper.finish()
}

#[derive(Default)]
struct Grouper {
    blocks: Vec<Block>,
    narration: Vec<String>,
    actions: Vec<Directive>,
    section: Option<String>,
}

impl Grouper {
    fn push(&mut self, directive: &Directive) {
        match directive {
            Directive::Section(name) => {
                self.flush_actions();
                self.section = Some(name.clone());
            }
            Directive::Say(text) => {
                // Narration after actions starts a new block.
                self.flush_actions();
                self.narration.push(text.clone());
            }
            Directive::Pause(timeout) => {
                self.flush_actions();
                let narration = self.take_narration();
                self.emit(narration, Vec::new(), BlockKind::Pause(*timeout));
            }
            action => self.actions.push(action.clone()),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_actions();
        if let Some(narration) = self.take_narration() {
            self.emit(Some(narration), Vec::new(), BlockKind::NarrationOnly);
        }
        self.blocks
    }

    fn flush_actions(&mut self) {
        if self.actions.is_empty() {
            return;
        }
        let narration = self.take_narration();
        let actions = std::mem::take(&mut self.actions);
        self.emit(narration, actions, BlockKind::Action);
    }

    fn take_narration(&mut self) -> Option<String> {
        if self.narration.is_empty() {
            None
        } else {
            let text = self.narration.join("\n");
            self.narration.clear();
            Some(text)
        }
    }

    fn emit(&mut self, narration: Option<String>, actions: Vec<Directive>, kind: BlockKind) {
        self.blocks.push(Block {
            narration,
            actions,
            section: self.section.clone(),
            kind,
        });
    }
}
