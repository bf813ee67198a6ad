use serde::{Deserialize, Serialize};

use monkey_core::script::Directive;

/// A protocol message. The serialized form carries the variant name in
/// a `type` field alongside the variant's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Controller → agent: enact these actions, in order.
    Execute {
        actions: Vec<Directive>,
        typing_speed: u64,
        typing_variance: u64,
    },
    /// Agent → Controller: outcome of the last `Execute`.
    Ack {
        status: AckStatus,
        message: Option<String>,
    },
    Ping,
    Pong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckStatus {
    Ok,
    Error,
}
