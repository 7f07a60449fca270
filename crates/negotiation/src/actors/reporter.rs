//! Reporter: scans percepts and informs the responder about disasters.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{ActorTrace, TraceClock};
use crate::bus::{ActorId, MessageBus};
use crate::message::{InformContent, NegotiationMessage, Performative, MESSAGE_TYPE_DETECTED};
use crate::PerceptFeed;

pub struct Reporter<F> {
    id: ActorId,
    responder: ActorId,
    bus: MessageBus,
    feed: F,
    interval: Duration,
    conversation_counter: u32,
    informs_sent: u32,
    trace: ActorTrace,
}

impl<F: PerceptFeed> Reporter<F> {
    pub fn new(
        id: ActorId,
        responder: ActorId,
        bus: MessageBus,
        feed: F,
        interval: Duration,
        clock: TraceClock,
    ) -> Self {
        let trace = ActorTrace::new(id.clone(), clock);
        Self {
            id,
            responder,
            bus,
            feed,
            interval,
            conversation_counter: 0,
            informs_sent: 0,
            trace,
        }
    }

    pub fn trace(&self) -> &ActorTrace {
        &self.trace
    }

    pub fn informs_sent(&self) -> u32 {
        self.informs_sent
    }

    /// Conversation ids are `CONV-<actor>-<n>`, one per inform.
    fn next_conversation_id(&mut self) -> String {
        self.conversation_counter += 1;
        format!("CONV-{}-{}", self.id, self.conversation_counter)
    }

    /// Pulls one batch of percepts and informs about the first active
    /// disaster at each location.
    pub fn scan(&mut self) {
        let percepts = self.feed.next_percepts();
        debug!(actor = %self.id, percepts = percepts.len(), "scanning percepts");

        for percept in &percepts {
            let Some(disaster) = percept.first_disaster() else {
                continue;
            };

            let content = InformContent {
                message_type: MESSAGE_TYPE_DETECTED.to_string(),
                location: percept.location.name.clone(),
                disaster_type: disaster.disaster_type,
                severity: disaster.severity,
                casualties: disaster.casualties,
                infrastructure_damage: disaster.infrastructure_damage,
                resources_needed: disaster.resources_needed.clone(),
                event_id: disaster.event_id.clone(),
            };
            let conversation_id = self.next_conversation_id();

            let stamp = self.trace.reserve();
            let sent = NegotiationMessage::new(
                Performative::Inform,
                self.id.clone(),
                self.responder.clone(),
                conversation_id.clone(),
                &content,
            )
            .map_err(|e| e.to_string())
            .and_then(|message| self.bus.send(message).map_err(|e| e.to_string()));

            match sent {
                Ok(()) => {
                    self.informs_sent += 1;
                    self.trace.log_at(stamp, format!(
                        "SEND INFORM to {} | Conv:{} | {} at {}",
                        self.responder, conversation_id, content.disaster_type, content.location
                    ));
                }
                Err(error) => {
                    warn!(actor = %self.id, conversation_id = %conversation_id, %error, "inform dropped");
                    self.trace.log_at(stamp, format!(
                        "DROP INFORM to {} | Conv:{} | {}",
                        self.responder, conversation_id, error
                    ));
                }
            }
        }
    }

    /// Scans every interval until stopped.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> ActorTrace {
        self.trace.log("Reporter started");
        loop {
            if *stop.borrow() {
                break;
            }
            self.scan();

            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        self.trace.log(format!("Reporter stopped after {} informs", self.informs_sent));
        self.trace
    }
}
