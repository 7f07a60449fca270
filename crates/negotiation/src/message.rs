//! Negotiation Messages
//!
//! Speech-act tagged envelopes with a JSON body. The performative travels as
//! a plain string so that an unknown act can be received and ignored rather
//! than failing to decode.

use relief_events::{DisasterType, ResourceMap, Severity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bus::ActorId;
use crate::error::ContentError;

pub const ONTOLOGY: &str = "disaster-response";
pub const PROTOCOL_ALERT: &str = "disaster-alert";
pub const PROTOCOL_ALLOCATION: &str = "resource-allocation";
pub const ACTION_ALLOCATE: &str = "allocate_resources";
pub const MESSAGE_TYPE_DETECTED: &str = "disaster_detected";

/// Communicative acts used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performative {
    Inform,
    Request,
    Agree,
    Refuse,
    Confirm,
}

impl Performative {
    pub fn as_str(&self) -> &'static str {
        match self {
            Performative::Inform => "inform",
            Performative::Request => "request",
            Performative::Agree => "agree",
            Performative::Refuse => "refuse",
            Performative::Confirm => "confirm",
        }
    }

    /// Alerts travel on their own protocol; everything else is allocation.
    pub fn protocol(&self) -> &'static str {
        match self {
            Performative::Inform => PROTOCOL_ALERT,
            _ => PROTOCOL_ALLOCATION,
        }
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Performative {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inform" => Ok(Performative::Inform),
            "request" => Ok(Performative::Request),
            "agree" => Ok(Performative::Agree),
            "refuse" => Ok(Performative::Refuse),
            "confirm" => Ok(Performative::Confirm),
            other => Err(ContentError::UnknownPerformative(other.to_string())),
        }
    }
}

/// One message on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationMessage {
    pub performative: String,
    pub sender: ActorId,
    pub recipient: ActorId,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    pub ontology: String,
    pub protocol: String,
    pub body: serde_json::Value,
}

impl NegotiationMessage {
    pub fn new<T: Serialize>(
        performative: Performative,
        sender: ActorId,
        recipient: ActorId,
        conversation_id: impl Into<String>,
        body: &T,
    ) -> Result<Self, ContentError> {
        Ok(Self {
            performative: performative.as_str().to_string(),
            sender,
            recipient,
            conversation_id: conversation_id.into(),
            in_reply_to: None,
            ontology: ONTOLOGY.to_string(),
            protocol: performative.protocol().to_string(),
            body: serde_json::to_value(body)?,
        })
    }

    pub fn with_in_reply_to(mut self, id: impl Into<String>) -> Self {
        self.in_reply_to = Some(id.into());
        self
    }

    /// Answers this message on the same conversation.
    pub fn reply<T: Serialize>(
        &self,
        performative: Performative,
        body: &T,
    ) -> Result<Self, ContentError> {
        Ok(Self::new(
            performative,
            self.recipient.clone(),
            self.sender.clone(),
            self.conversation_id.clone(),
            body,
        )?
        .with_in_reply_to(self.conversation_id.clone()))
    }

    /// The parsed performative, if it is one the protocol knows.
    pub fn performative(&self) -> Result<Performative, ContentError> {
        self.performative.parse()
    }

    /// Decodes the body.
    pub fn content<T: DeserializeOwned>(&self) -> Result<T, ContentError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Body of `inform`: a disaster seen by the reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformContent {
    pub message_type: String,
    pub location: String,
    pub disaster_type: DisasterType,
    pub severity: Severity,
    pub casualties: u32,
    pub infrastructure_damage: f64,
    pub resources_needed: ResourceMap,
    pub event_id: String,
}

/// Body of `request`: resources wanted for one disaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContent {
    pub action: String,
    pub disaster_location: String,
    pub disaster_type: DisasterType,
    pub severity: Severity,
    pub resources_needed: ResourceMap,
    pub event_id: String,
}

/// Body of `agree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreeContent {
    pub action: String,
    pub resources_allocated: ResourceMap,
    pub location: String,
    pub event_id: String,
}

/// Body of `refuse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefuseContent {
    pub action: String,
    pub reason: String,
    pub available_resources: ResourceMap,
    pub requested_resources: ResourceMap,
}

/// Body of `confirm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmContent {
    pub message: String,
    pub allocation: ResourceMap,
    pub remaining_resources: ResourceMap,
}
