//! # Monkey Core
//!
//! Script model and deterministic logic for Code Monkey.
//!
//! This crate contains:
//! - Directive / FrontMatter / Script definitions
//! - The line-based `.cm` parser
//! - The grouper that turns directives into presentable blocks
//! - Dry-run rendering
//!
//! This crate does NOT care about:
//! - How blocks travel between machines
//! - How actions are enacted on a desktop
//! - How anything is displayed to the presenter

pub mod block;
pub mod dry_run;
pub mod error;
pub mod script;

pub use block::{group_blocks, Block, BlockKind};
pub use dry_run::render_dry_run;
pub use error::ScriptError;
pub use script::{
    parse_script, Directive, FrontMatter, ParsedLine, Script, SlideAction,
};
