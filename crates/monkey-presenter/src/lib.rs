//! # Monkey Presenter
//!
//! The Controller side of Code Monkey: owns the block list and the
//! connection to the agent, and advances one block per step.
//!
//! This crate contains:
//! - The [`Presenter`] state machine (cursor, connection lifecycle)
//! - [`StepResult`], the typed outcome of one advancement
//!
//! Narration and pause blocks never touch the network; action blocks
//! are shipped as a single `Execute` and the ack awaited under a
//! deadline. Connection loss and agent errors leave the cursor where
//! it was, so reconnecting resumes at the same block.

mod session;

pub use session::{Presenter, StepResult, ACK_DEADLINE};
