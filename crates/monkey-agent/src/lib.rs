//! # Monkey Agent
//!
//! The process on the demo machine. Listens on TCP for action blocks
//! from the Controller and enacts them against the local desktop
//! through an [`ActionBackend`].
//!
//! This crate contains:
//! - The `ActionBackend` capability trait and its AppleScript
//!   implementation
//! - Pure AppleScript text generation (testable without a desktop)
//! - The typewriter decomposition of `[TYPE]` text
//! - The single-connection agent server

pub mod applescript;
pub mod backend;
pub mod server;
pub mod typewriter;

pub use backend::{ActionBackend, AppleScriptBackend, BackendError};
pub use server::Agent;
