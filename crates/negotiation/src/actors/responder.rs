//! Responder: turns informs into resource requests and follows each
//! conversation to its outcome.

use relief_events::format_resources;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

use super::{next_message, ActorTrace, Next, TraceClock};
use crate::bus::{ActorId, Mailbox, MessageBus};
use crate::conversation::{ConversationEvent, ConversationTracker};
use crate::error::ContentError;
use crate::ledger::ResourceLedger;
use crate::message::{
    AgreeContent, ConfirmContent, InformContent, NegotiationMessage, Performative,
    RefuseContent, RequestContent, ACTION_ALLOCATE,
};

/// What the responder hands back when it stops.
#[derive(Debug, Clone)]
pub struct ResponderOutput {
    pub trace: ActorTrace,
    pub conversations: ConversationTracker,
    /// Latest inform per event id
    pub known_disasters: BTreeMap<String, InformContent>,
}

pub struct Responder {
    id: ActorId,
    coordinator: ActorId,
    bus: MessageBus,
    mailbox: Mailbox,
    timeout: Duration,
    conversations: ConversationTracker,
    known_disasters: BTreeMap<String, InformContent>,
    trace: ActorTrace,
}

impl Responder {
    pub fn new(
        coordinator: ActorId,
        bus: MessageBus,
        mailbox: Mailbox,
        timeout: Duration,
        clock: TraceClock,
    ) -> Self {
        let id = mailbox.owner().clone();
        Self {
            trace: ActorTrace::new(id.clone(), clock),
            id,
            coordinator,
            bus,
            mailbox,
            timeout,
            conversations: ConversationTracker::new(),
            known_disasters: BTreeMap::new(),
        }
    }

    pub fn trace(&self) -> &ActorTrace {
        &self.trace
    }

    pub fn conversations(&self) -> &ConversationTracker {
        &self.conversations
    }

    /// Serves the mailbox until stopped, then hands itself back with its
    /// mailbox still open so late replies can be [`settle`](Self::settle)d.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Self {
        self.trace.log("Responder started");
        loop {
            match next_message(&mut self.mailbox, &mut stop, self.timeout).await {
                Next::Message(message) => self.handle(message),
                Next::Idle => {}
                Next::Stop => break,
            }
        }
        self
    }

    /// Handles every message already queued. Returns how many there were.
    pub fn settle(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.mailbox.try_receive() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    pub fn into_output(mut self) -> ResponderOutput {
        self.trace.log("Responder stopped");
        ResponderOutput {
            trace: self.trace,
            conversations: self.conversations,
            known_disasters: self.known_disasters,
        }
    }

    /// Processes one message. Malformed or unexpected messages are logged
    /// and ignored.
    pub fn handle(&mut self, message: NegotiationMessage) {
        let result = match message.performative() {
            Ok(Performative::Inform) => self.on_inform(&message),
            Ok(Performative::Agree) => self.on_agree(&message),
            Ok(Performative::Refuse) => self.on_refuse(&message),
            Ok(Performative::Confirm) => self.on_confirm(&message),
            Ok(Performative::Request) => {
                warn!(actor = %self.id, sender = %message.sender, "responder does not serve requests");
                Ok(())
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!(
                actor = %self.id,
                conversation_id = %message.conversation_id,
                error = %e,
                "ignoring message"
            );
            self.trace.log(format!(
                "IGNORE {} from {} | Conv:{} | {}",
                message.performative.to_uppercase(),
                message.sender,
                message.conversation_id,
                e
            ));
        }
    }

    fn on_inform(&mut self, message: &NegotiationMessage) -> Result<(), ContentError> {
        let content: InformContent = message.content()?;
        let conversation_id = message.conversation_id.as_str();
        self.trace.log(format!(
            "RECV INFORM from {} | Conv:{} | {} at {}",
            message.sender, conversation_id, content.disaster_type, content.location
        ));

        if let Err(e) = self.conversations.start(conversation_id) {
            self.reject(conversation_id, &e);
            return Ok(());
        }
        self.known_disasters
            .insert(content.event_id.clone(), content.clone());

        let request = RequestContent {
            action: ACTION_ALLOCATE.to_string(),
            disaster_location: content.location.clone(),
            disaster_type: content.disaster_type,
            severity: content.severity,
            resources_needed: ResourceLedger::managed(&content.resources_needed),
            event_id: content.event_id.clone(),
        };
        let outgoing = NegotiationMessage::new(
            Performative::Request,
            self.id.clone(),
            self.coordinator.clone(),
            conversation_id,
            &request,
        )?
        .with_in_reply_to(conversation_id);

        let stamp = self.trace.reserve();
        match self.bus.send(outgoing) {
            Ok(()) => {
                if let Err(e) = self
                    .conversations
                    .apply(conversation_id, ConversationEvent::Request)
                {
                    self.reject(conversation_id, &e);
                }
                self.trace.log_at(stamp, format!(
                    "SEND REQUEST to {} | Conv:{} | Request resources for {}",
                    self.coordinator, conversation_id, content.location
                ));
            }
            Err(e) => {
                warn!(actor = %self.id, conversation_id, error = %e, "request dropped");
                self.trace.log_at(stamp, format!(
                    "DROP REQUEST to {} | Conv:{} | {}",
                    self.coordinator, conversation_id, e
                ));
            }
        }
        Ok(())
    }

    fn on_agree(&mut self, message: &NegotiationMessage) -> Result<(), ContentError> {
        let content: AgreeContent = message.content()?;
        self.trace.log(format!(
            "RECV AGREE from {} | Conv:{} | Resources allocated: {}",
            message.sender,
            message.conversation_id,
            format_resources(&content.resources_allocated)
        ));
        self.advance(&message.conversation_id, ConversationEvent::Agree);
        Ok(())
    }

    fn on_refuse(&mut self, message: &NegotiationMessage) -> Result<(), ContentError> {
        let content: RefuseContent = message.content()?;
        self.trace.log(format!(
            "RECV REFUSE from {} | Conv:{} | Reason: {}",
            message.sender, message.conversation_id, content.reason
        ));
        self.advance(&message.conversation_id, ConversationEvent::Refuse);
        Ok(())
    }

    fn on_confirm(&mut self, message: &NegotiationMessage) -> Result<(), ContentError> {
        let content: ConfirmContent = message.content()?;
        self.trace.log(format!(
            "RECV CONFIRM from {} | Conv:{} | {}",
            message.sender, message.conversation_id, content.message
        ));
        self.advance(&message.conversation_id, ConversationEvent::Confirm);
        Ok(())
    }

    fn advance(&mut self, conversation_id: &str, event: ConversationEvent) {
        if let Err(e) = self.conversations.apply(conversation_id, event) {
            self.reject(conversation_id, &e);
        }
    }

    fn reject(&mut self, conversation_id: &str, error: &dyn std::error::Error) {
        warn!(actor = %self.id, conversation_id, error = %error, "conversation transition rejected");
        self.trace
            .log(format!("REJECT Conv:{} | {}", conversation_id, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationState;
    use relief_events::{DisasterType, ResourceKind, ResourceMap, Severity};

    fn responder(bus: &mut MessageBus) -> Responder {
        let mailbox = bus.register(ActorId::from("responder"));
        Responder::new(
            ActorId::from("coordinator"),
            bus.clone(),
            mailbox,
            Duration::from_millis(100),
            TraceClock::start(),
        )
    }

    fn inform(conversation_id: &str) -> NegotiationMessage {
        let mut needed = ResourceMap::new();
        needed.insert(ResourceKind::RescueTeams, 3);
        needed.insert(ResourceKind::Water, 120);
        let content = InformContent {
            message_type: "disaster_detected".to_string(),
            location: "Accra".to_string(),
            disaster_type: DisasterType::Flood,
            severity: Severity::High,
            casualties: 10,
            infrastructure_damage: 20.0,
            resources_needed: needed,
            event_id: "EVT0001".to_string(),
        };
        NegotiationMessage::new(
            Performative::Inform,
            ActorId::from("reporter"),
            ActorId::from("responder"),
            conversation_id,
            &content,
        )
        .unwrap()
    }

    fn from_coordinator<T: serde::Serialize>(
        performative: Performative,
        conversation_id: &str,
        body: &T,
    ) -> NegotiationMessage {
        NegotiationMessage::new(
            performative,
            ActorId::from("coordinator"),
            ActorId::from("responder"),
            conversation_id,
            body,
        )
        .unwrap()
        .with_in_reply_to(conversation_id)
    }

    #[tokio::test]
    async fn test_inform_becomes_filtered_request() {
        let mut bus = MessageBus::new();
        let mut coordinator = bus.register(ActorId::from("coordinator"));
        let mut responder = responder(&mut bus);

        responder.handle(inform("CONV-reporter-1"));

        let request = coordinator.try_receive().expect("request sent");
        assert_eq!(request.performative().unwrap(), Performative::Request);
        assert_eq!(request.in_reply_to.as_deref(), Some("CONV-reporter-1"));
        let content: RequestContent = request.content().unwrap();
        assert_eq!(content.action, "allocate_resources");
        assert_eq!(content.disaster_location, "Accra");
        assert_eq!(content.resources_needed.len(), 1);
        assert_eq!(content.resources_needed.get(&ResourceKind::RescueTeams), Some(&3));
        assert_eq!(
            responder.conversations().state("CONV-reporter-1"),
            Some(ConversationState::Requested)
        );
    }

    #[tokio::test]
    async fn test_agree_then_confirm_grants() {
        let mut bus = MessageBus::new();
        let _coordinator = bus.register(ActorId::from("coordinator"));
        let mut responder = responder(&mut bus);
        responder.handle(inform("c1"));

        let allocated: ResourceMap = [(ResourceKind::RescueTeams, 3)].into_iter().collect();
        responder.handle(from_coordinator(
            Performative::Agree,
            "c1",
            &AgreeContent {
                action: ACTION_ALLOCATE.to_string(),
                resources_allocated: allocated.clone(),
                location: "Accra".to_string(),
                event_id: "EVT0001".to_string(),
            },
        ));
        responder.handle(from_coordinator(
            Performative::Confirm,
            "c1",
            &ConfirmContent {
                message: "Resources allocated to Accra".to_string(),
                allocation: allocated,
                remaining_resources: ResourceMap::new(),
            },
        ));

        assert_eq!(
            responder.conversations().state("c1"),
            Some(ConversationState::Granted)
        );
        let entries = responder.trace().entries();
        assert!(entries
            .iter()
            .any(|l| l.ends_with("RECV AGREE from coordinator | Conv:c1 | Resources allocated: {rescue_teams: 3}")));
        assert!(entries
            .iter()
            .any(|l| l.ends_with("RECV CONFIRM from coordinator | Conv:c1 | Resources allocated to Accra")));
    }

    #[tokio::test]
    async fn test_confirm_before_agree_is_rejected() {
        let mut bus = MessageBus::new();
        let _coordinator = bus.register(ActorId::from("coordinator"));
        let mut responder = responder(&mut bus);
        responder.handle(inform("c1"));

        responder.handle(from_coordinator(
            Performative::Confirm,
            "c1",
            &ConfirmContent {
                message: "Resources allocated to Accra".to_string(),
                allocation: ResourceMap::new(),
                remaining_resources: ResourceMap::new(),
            },
        ));

        assert_eq!(
            responder.conversations().state("c1"),
            Some(ConversationState::Requested)
        );
        assert!(responder
            .trace()
            .entries()
            .iter()
            .any(|l| l.contains("REJECT Conv:c1")));
    }

    #[tokio::test]
    async fn test_unknown_performative_and_bad_body_are_ignored() {
        let mut bus = MessageBus::new();
        let mut coordinator = bus.register(ActorId::from("coordinator"));
        let mut responder = responder(&mut bus);

        let mut odd = inform("c1");
        odd.performative = "propose".to_string();
        responder.handle(odd);

        let mut broken = inform("c2");
        broken.body = serde_json::json!({"location": 42});
        responder.handle(broken);

        assert!(coordinator.try_receive().is_none());
        assert!(responder.conversations().is_empty());
        let ignored = responder
            .trace()
            .entries()
            .iter()
            .filter(|l| l.contains("IGNORE"))
            .count();
        assert_eq!(ignored, 2);
    }

    #[tokio::test]
    async fn test_mail_queued_at_stop_is_still_answered() {
        use crate::actors::Coordinator;
        use crate::ledger::{AccountingMode, ResourceLedger};

        let mut bus = MessageBus::new();
        let coordinator_box = bus.register(ActorId::from("coordinator"));
        let responder = responder(&mut bus);
        let mut pool = ResourceMap::new();
        pool.insert(ResourceKind::RescueTeams, 5);
        let coordinator = Coordinator::new(
            bus.clone(),
            coordinator_box,
            ResourceLedger::new(pool, AccountingMode::Overwrite),
            Duration::from_millis(100),
            TraceClock::start(),
        );
        bus.send(inform("CONV-reporter-1")).unwrap();

        // Stop is already raised before either loop looks at its mailbox.
        let (_stop, stopped) = watch::channel(true);
        let mut responder = responder.run(stopped.clone()).await;
        assert_eq!(
            responder.conversations().state("CONV-reporter-1"),
            Some(ConversationState::Requested)
        );

        let coordinator = coordinator.run(stopped).await;
        assert_eq!(
            coordinator.ledger.available().get(&ResourceKind::RescueTeams),
            Some(&2)
        );

        assert_eq!(responder.settle(), 2);
        let output = responder.into_output();
        assert_eq!(
            output.conversations.state("CONV-reporter-1"),
            Some(ConversationState::Granted)
        );
        assert!(output.trace.entries().last().unwrap().ends_with("Responder stopped"));
    }
}
