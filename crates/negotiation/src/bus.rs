//! Message Bus
//!
//! Per-actor unbounded mailboxes keyed by recipient. Sending never blocks;
//! a message for an unknown or closed mailbox is reported back to the
//! sender, which logs it and moves on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::message::NegotiationMessage;

/// Name of an actor on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Routing table from actor id to mailbox sender. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    routes: HashMap<ActorId, mpsc::UnboundedSender<NegotiationMessage>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailbox for `id`. Registering an id twice replaces the
    /// earlier mailbox, which then sees its channel close.
    pub fn register(&mut self, id: ActorId) -> Mailbox {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.insert(id.clone(), tx);
        Mailbox { owner: id, rx }
    }

    /// Delivers `message` to its recipient's mailbox.
    pub fn send(&self, message: NegotiationMessage) -> Result<(), BusError> {
        let recipient = message.recipient.clone();
        let route = self
            .routes
            .get(&recipient)
            .ok_or_else(|| BusError::UnknownRecipient(recipient.clone()))?;
        route.send(message).map_err(|_| BusError::Closed(recipient))
    }
}

/// Receiving end owned by one actor.
#[derive(Debug)]
pub struct Mailbox {
    owner: ActorId,
    rx: mpsc::UnboundedReceiver<NegotiationMessage>,
}

impl Mailbox {
    pub fn owner(&self) -> &ActorId {
        &self.owner
    }

    /// Waits up to `timeout` for the next message. A timeout and a closed
    /// channel both yield `None`.
    pub async fn receive(&mut self, timeout: Duration) -> Option<NegotiationMessage> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Takes a message if one is already queued.
    pub fn try_receive(&mut self) -> Option<NegotiationMessage> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Performative, PROTOCOL_ALERT};

    fn ping(to: &str) -> NegotiationMessage {
        NegotiationMessage::new(
            Performative::Inform,
            ActorId::from("reporter"),
            ActorId::from(to),
            "CONV-reporter-1",
            &serde_json::json!({"ping": true}),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_reaches_recipient() {
        let mut bus = MessageBus::new();
        let mut mailbox = bus.register(ActorId::from("responder"));

        bus.send(ping("responder")).unwrap();
        let message = mailbox.receive(Duration::from_millis(50)).await.unwrap();
        assert_eq!(message.conversation_id, "CONV-reporter-1");
        assert_eq!(message.protocol, PROTOCOL_ALERT);
        assert_eq!(mailbox.owner().as_str(), "responder");
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_an_error() {
        let bus = MessageBus::new();
        assert_eq!(
            bus.send(ping("nobody")),
            Err(BusError::UnknownRecipient(ActorId::from("nobody")))
        );
    }

    #[tokio::test]
    async fn test_closed_mailbox_is_an_error() {
        let mut bus = MessageBus::new();
        let mailbox = bus.register(ActorId::from("responder"));
        drop(mailbox);
        assert_eq!(
            bus.send(ping("responder")),
            Err(BusError::Closed(ActorId::from("responder")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_times_out_with_none() {
        let mut bus = MessageBus::new();
        let mut mailbox = bus.register(ActorId::from("coordinator"));
        assert!(mailbox.receive(Duration::from_secs(10)).await.is_none());
        assert!(mailbox.try_receive().is_none());
    }
}
