//! Conversation State Machine
//!
//! ```text
//! STARTED --request--> REQUESTED --agree--> (agreed) --confirm--> GRANTED
//!                          |
//!                          +-----refuse----> DECLINED
//! ```
//!
//! No state is revisited. Anything else is rejected and leaves the
//! conversation untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConversationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    Started,
    Requested,
    Granted,
    Declined,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Started => "STARTED",
            ConversationState::Requested => "REQUESTED",
            ConversationState::Granted => "GRANTED",
            ConversationState::Declined => "DECLINED",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConversationState::Granted | ConversationState::Declined)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened on a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEvent {
    Request,
    Agree,
    Refuse,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conversation {
    state: ConversationState,
    agreed: bool,
}

/// State of every conversation one actor takes part in.
#[derive(Debug, Clone, Default)]
pub struct ConversationTracker {
    conversations: BTreeMap<String, Conversation>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: &str) -> Result<(), ConversationError> {
        if self.conversations.contains_key(id) {
            return Err(ConversationError::AlreadyStarted(id.to_string()));
        }
        self.conversations.insert(
            id.to_string(),
            Conversation {
                state: ConversationState::Started,
                agreed: false,
            },
        );
        Ok(())
    }

    /// Applies `event`, returning the resulting state.
    pub fn apply(
        &mut self,
        id: &str,
        event: ConversationEvent,
    ) -> Result<ConversationState, ConversationError> {
        let conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| ConversationError::Unknown(id.to_string()))?;

        let next = match (conversation.state, conversation.agreed, event) {
            (ConversationState::Started, _, ConversationEvent::Request) => Conversation {
                state: ConversationState::Requested,
                agreed: false,
            },
            (ConversationState::Requested, false, ConversationEvent::Agree) => Conversation {
                state: ConversationState::Requested,
                agreed: true,
            },
            (ConversationState::Requested, true, ConversationEvent::Confirm) => Conversation {
                state: ConversationState::Granted,
                agreed: true,
            },
            (ConversationState::Requested, false, ConversationEvent::Refuse) => Conversation {
                state: ConversationState::Declined,
                agreed: false,
            },
            (state, _, event) => {
                return Err(ConversationError::IllegalTransition {
                    id: id.to_string(),
                    state,
                    event,
                })
            }
        };

        *conversation = next;
        Ok(next.state)
    }

    pub fn state(&self, id: &str) -> Option<ConversationState> {
        self.conversations.get(id).map(|c| c.state)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Every conversation and its state, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<String, ConversationState> {
        self.conversations
            .iter()
            .map(|(id, c)| (id.clone(), c.state))
            .collect()
    }
}
