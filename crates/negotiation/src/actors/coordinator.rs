//! Coordinator: sole owner of the resource pool. Answers each request with
//! `agree` + `confirm` or with `refuse`.

use relief_events::format_resources;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{next_message, ActorTrace, Next, TraceClock};
use crate::bus::{ActorId, Mailbox, MessageBus};
use crate::error::ContentError;
use crate::ledger::{AllocationDecision, ResourceLedger};
use crate::message::{
    AgreeContent, ConfirmContent, NegotiationMessage, Performative, RefuseContent,
    RequestContent, ACTION_ALLOCATE,
};

/// What the coordinator hands back when it stops.
#[derive(Debug, Clone)]
pub struct CoordinatorOutput {
    pub trace: ActorTrace,
    pub ledger: ResourceLedger,
}

pub struct Coordinator {
    id: ActorId,
    bus: MessageBus,
    mailbox: Mailbox,
    timeout: Duration,
    ledger: ResourceLedger,
    trace: ActorTrace,
}

impl Coordinator {
    pub fn new(
        bus: MessageBus,
        mailbox: Mailbox,
        ledger: ResourceLedger,
        timeout: Duration,
        clock: TraceClock,
    ) -> Self {
        let id = mailbox.owner().clone();
        Self {
            trace: ActorTrace::new(id.clone(), clock),
            id,
            bus,
            mailbox,
            timeout,
            ledger,
        }
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn trace(&self) -> &ActorTrace {
        &self.trace
    }

    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> CoordinatorOutput {
        self.trace.log("Coordinator started");
        self.trace.log(format!(
            "Initial resources: {}",
            format_resources(self.ledger.available())
        ));
        loop {
            match next_message(&mut self.mailbox, &mut stop, self.timeout).await {
                Next::Message(message) => self.handle(message),
                Next::Idle => {}
                Next::Stop => break,
            }
        }
        self.trace.log("Coordinator stopped");
        CoordinatorOutput {
            trace: self.trace,
            ledger: self.ledger,
        }
    }

    /// Processes one message. Only `request` is served.
    pub fn handle(&mut self, message: NegotiationMessage) {
        let result = match message.performative() {
            Ok(Performative::Request) => self.on_request(&message),
            Ok(other) => {
                warn!(actor = %self.id, performative = %other, "coordinator only serves requests");
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

    fn on_request(&mut self, message: &NegotiationMessage) -> Result<(), ContentError> {
        let request: RequestContent = message.content()?;
        let conversation_id = message.conversation_id.as_str();
        self.trace.log(format!(
            "RECV REQUEST from {} | Conv:{} | Action: {}",
            message.sender, conversation_id, request.action
        ));
        if request.action != ACTION_ALLOCATE {
            warn!(actor = %self.id, action = %request.action, "unsupported action");
            return Ok(());
        }

        match self.ledger.decide(&request.event_id, &request.resources_needed) {
            AllocationDecision::Granted {
                allocated,
                remaining,
            } => {
                info!(
                    event_id = %request.event_id,
                    allocated = %format_resources(&allocated),
                    "resources allocated"
                );
                let agree = message.reply(
                    Performative::Agree,
                    &AgreeContent {
                        action: ACTION_ALLOCATE.to_string(),
                        resources_allocated: allocated.clone(),
                        location: request.disaster_location.clone(),
                        event_id: request.event_id.clone(),
                    },
                )?;
                self.deliver(agree, format!("Resources: {}", format_resources(&allocated)));

                let confirm = message.reply(
                    Performative::Confirm,
                    &ConfirmContent {
                        message: format!("Resources allocated to {}", request.disaster_location),
                        allocation: allocated,
                        remaining_resources: remaining,
                    },
                )?;
                self.deliver(confirm, "Allocation complete".to_string());
            }
            AllocationDecision::Refused {
                reason,
                available,
                requested,
            } => {
                info!(event_id = %request.event_id, reason = %reason, "request refused");
                let refuse = message.reply(
                    Performative::Refuse,
                    &RefuseContent {
                        action: ACTION_ALLOCATE.to_string(),
                        reason: reason.to_string(),
                        available_resources: available,
                        requested_resources: requested,
                    },
                )?;
                self.deliver(refuse, format!("Reason: {}", reason));
            }
        }
        Ok(())
    }

    fn deliver(&mut self, message: NegotiationMessage, summary: String) {
        let label = message.performative.to_uppercase();
        let recipient = message.recipient.clone();
        let conversation_id = message.conversation_id.clone();

        let stamp = self.trace.reserve();
        match self.bus.send(message) {
            Ok(()) => self.trace.log_at(stamp, format!(
                "SEND {} to {} | Conv:{} | {}",
                label, recipient, conversation_id, summary
            )),
            Err(e) => {
                warn!(actor = %self.id, conversation_id = %conversation_id, error = %e, "reply dropped");
                self.trace.log_at(stamp, format!(
                    "DROP {} to {} | Conv:{} | {}",
                    label, recipient, conversation_id, e
                ));
            }
        }
    }
}
