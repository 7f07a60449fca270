//! Resource negotiation between disaster-response actors.
//!
//! Three actors run as independent tokio tasks and talk only through
//! tagged messages on a [`MessageBus`]:
//!
//! ```text
//! Reporter --inform--> Responder --request--> Coordinator
//!                          ^                       |
//!                          +--agree/confirm/refuse-+
//! ```
//!
//! The coordinator is the only writer of the [`ResourceLedger`]. Every
//! conversation is tracked by the responder with a small state machine.
//!
//! # Modules
//!
//! - [`bus`]: actor ids, mailboxes and routing
//! - [`message`]: performatives, envelopes and JSON bodies
//! - [`conversation`]: per-conversation state machine
//! - [`ledger`]: pool, allocation records and the conservation audit
//! - [`actors`]: reporter, responder and coordinator loops
//! - [`report`]: merged traces and final pool state

pub mod actors;
pub mod bus;
pub mod config;
pub mod conversation;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod message;
pub mod report;

pub use actors::{
    ActorTrace, Coordinator, Reporter, Responder, TraceClock, COORDINATOR_ID, REPORTER_ID,
    RESPONDER_ID,
};
pub use bus::{ActorId, Mailbox, MessageBus};
pub use config::NegotiationConfig;
pub use conversation::{ConversationEvent, ConversationState, ConversationTracker};
pub use error::{BusError, ContentError, ConversationError, NegotiationConfigError, NegotiationError};
pub use feed::{PerceptFeed, ScriptedFeed};
pub use ledger::{
    AccountingMode, AllocationDecision, Imbalance, LedgerAudit, RefusalReason, ResourceLedger,
    MANAGED_KINDS,
};
pub use message::{NegotiationMessage, Performative};
pub use report::NegotiationReport;

use actors::coordinator::CoordinatorOutput;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Entry point for starting a negotiation run.
pub struct Negotiation;

impl Negotiation {
    /// Validates `config` and spawns the three actors on the current
    /// runtime. The reporter pulls percepts from `feed`.
    pub fn spawn<F>(config: &NegotiationConfig, feed: F) -> Result<NegotiationHandle, NegotiationError>
    where
        F: PerceptFeed + 'static,
    {
        config.validate()?;
        let pool = config.pool()?;
        let clock = TraceClock::start();

        let mut bus = MessageBus::new();
        let responder_box = bus.register(ActorId::from(RESPONDER_ID));
        let coordinator_box = bus.register(ActorId::from(COORDINATOR_ID));

        let reporter = Reporter::new(
            ActorId::from(REPORTER_ID),
            ActorId::from(RESPONDER_ID),
            bus.clone(),
            feed,
            config.reporter_interval(),
            clock.clone(),
        );
        let responder = Responder::new(
            ActorId::from(COORDINATOR_ID),
            bus.clone(),
            responder_box,
            config.receive_timeout(),
            clock.clone(),
        );
        let coordinator = Coordinator::new(
            bus,
            coordinator_box,
            ResourceLedger::new(pool, config.accounting),
            config.receive_timeout(),
            clock.clone(),
        );

        let (stop_reporter, reporter_rx) = watch::channel(false);
        let (stop_responder, responder_rx) = watch::channel(false);
        let (stop_coordinator, coordinator_rx) = watch::channel(false);
        info!(accounting = ?config.accounting, "negotiation actors starting");

        Ok(NegotiationHandle {
            stop_reporter,
            stop_responder,
            stop_coordinator,
            coordinator: tokio::spawn(coordinator.run(coordinator_rx)),
            responder: tokio::spawn(responder.run(responder_rx)),
            reporter: tokio::spawn(reporter.run(reporter_rx)),
        })
    }
}

/// Running actors. Dropping the handle without `shutdown` also stops them.
pub struct NegotiationHandle {
    stop_reporter: watch::Sender<bool>,
    stop_responder: watch::Sender<bool>,
    stop_coordinator: watch::Sender<bool>,
    reporter: JoinHandle<ActorTrace>,
    responder: JoinHandle<Responder>,
    coordinator: JoinHandle<CoordinatorOutput>,
}

impl NegotiationHandle {
    /// Lets the actors run for `duration`, then stops them.
    pub async fn run_for(
        self,
        duration: std::time::Duration,
    ) -> Result<NegotiationReport, NegotiationError> {
        tokio::time::sleep(duration).await;
        self.shutdown().await
    }

    /// Stops the actors upstream first so every message already sent is
    /// answered, then collects their results.
    ///
    /// Order: the reporter stops informing, the responder turns queued
    /// informs into requests, the coordinator answers every queued request,
    /// and the responder finally settles those replies.
    pub async fn shutdown(self) -> Result<NegotiationReport, NegotiationError> {
        // Receivers may already be gone if a task ended early; that is fine.
        let _ = self.stop_reporter.send(true);
        let reporter = self.reporter.await?;

        let _ = self.stop_responder.send(true);
        let mut responder = self.responder.await?;

        let _ = self.stop_coordinator.send(true);
        let coordinator = self.coordinator.await?;

        responder.settle();
        let responder = responder.into_output();

        let trace = ActorTrace::merge([
            reporter,
            responder.trace,
            coordinator.trace,
        ]);

        let report = NegotiationReport {
            trace,
            remaining: coordinator.ledger.available().clone(),
            allocations: coordinator.ledger.allocations().clone(),
            conversations: responder.conversations.snapshot(),
            audit: coordinator.ledger.audit(),
        };
        info!(
            conversations = report.conversations.len(),
            granted = report.granted(),
            declined = report.declined(),
            "negotiation finished"
        );
        Ok(report)
    }
}
