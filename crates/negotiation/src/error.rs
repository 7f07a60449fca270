//! Error types for the negotiation crate.

use thiserror::Error;

use crate::bus::ActorId;
use crate::conversation::{ConversationEvent, ConversationState};

/// Delivery failures on the message bus.
#[derive(Debug, Error, PartialEq)]
pub enum BusError {
    #[error("no mailbox registered for {0}")]
    UnknownRecipient(ActorId),

    #[error("mailbox of {0} is closed")]
    Closed(ActorId),
}

/// A message body that does not match its performative.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("malformed message body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown performative: {0}")]
    UnknownPerformative(String),
}

/// Rejected conversation state changes.
#[derive(Debug, Error, PartialEq)]
pub enum ConversationError {
    #[error("conversation {0} already started")]
    AlreadyStarted(String),

    #[error("unknown conversation {0}")]
    Unknown(String),

    #[error("conversation {id}: {event:?} is not allowed in state {state}")]
    IllegalTransition {
        id: String,
        state: ConversationState,
        event: ConversationEvent,
    },
}

/// Invalid negotiation settings.
#[derive(Debug, Error, PartialEq)]
pub enum NegotiationConfigError {
    #[error("unknown resource kind in pool: {0}")]
    UnknownResource(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Failures while running or stopping the actors.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("configuration: {0}")]
    Config(#[from] NegotiationConfigError),

    #[error("actor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
