//! The three negotiation actors and what they share.
//!
//! Each actor is a receive-or-act loop run as its own tokio task. Actors
//! only talk through the [`MessageBus`](crate::bus::MessageBus). Each one
//! stops when its own watch signal flips to `true`, after handling whatever
//! was already queued.

pub mod coordinator;
pub mod reporter;
pub mod responder;

pub use coordinator::Coordinator;
pub use reporter::Reporter;
pub use responder::Responder;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::bus::{ActorId, Mailbox};
use crate::message::NegotiationMessage;

pub const REPORTER_ID: &str = "reporter";
pub const RESPONDER_ID: &str = "responder";
pub const COORDINATOR_ID: &str = "coordinator";

/// Shared stamp source for every actor in one run.
///
/// The sequence number is global across actors, so merged traces follow
/// emission order even when several entries share a millisecond.
#[derive(Debug, Clone)]
pub struct TraceClock {
    started: Instant,
    sequence: Arc<AtomicU64>,
}

impl TraceClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    fn stamp(&self) -> TraceStamp {
        TraceStamp {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

/// A reserved position in the merged trace.
#[derive(Debug, Clone, Copy)]
pub struct TraceStamp {
    sequence: u64,
    elapsed: Duration,
}

/// Per-actor audit trail stamped with time since the run started.
#[derive(Debug, Clone)]
pub struct ActorTrace {
    actor: ActorId,
    clock: TraceClock,
    sequence: Vec<u64>,
    entries: Vec<String>,
}

impl ActorTrace {
    pub fn new(actor: ActorId, clock: TraceClock) -> Self {
        Self {
            actor,
            clock,
            sequence: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn log(&mut self, message: impl AsRef<str>) {
        let stamp = self.clock.stamp();
        self.log_at(stamp, message);
    }

    /// Reserves a stamp now for a line written later. Sends reserve before
    /// handing the message to the bus so the receiver's line sorts after.
    pub fn reserve(&self) -> TraceStamp {
        self.clock.stamp()
    }

    pub fn log_at(&mut self, stamp: TraceStamp, message: impl AsRef<str>) {
        self.sequence.push(stamp.sequence);
        self.entries.push(format!(
            "[+{:08}ms] {} | {}",
            stamp.elapsed.as_millis(),
            self.actor,
            message.as_ref()
        ));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Interleaves several traces in the order their entries were logged.
    pub fn merge(traces: impl IntoIterator<Item = ActorTrace>) -> Vec<String> {
        let mut stamped: Vec<(u64, String)> = traces
            .into_iter()
            .flat_map(|trace| trace.sequence.into_iter().zip(trace.entries))
            .collect();
        stamped.sort_by_key(|(sequence, _)| *sequence);
        stamped.into_iter().map(|(_, line)| line).collect()
    }
}

/// What an actor loop should do next.
pub(crate) enum Next {
    Message(NegotiationMessage),
    Idle,
    Stop,
}

/// Waits for a message, the receive timeout, or the stop signal.
///
/// Once stopped, messages already queued are still handed out one by one
/// before `Stop` is returned.
pub(crate) async fn next_message(
    mailbox: &mut Mailbox,
    stop: &mut watch::Receiver<bool>,
    timeout: Duration,
) -> Next {
    if *stop.borrow() {
        return drain(mailbox);
    }
    tokio::select! {
        changed = stop.changed() => {
            // A dropped sender also means stop.
            if changed.is_err() || *stop.borrow() {
                drain(mailbox)
            } else {
                Next::Idle
            }
        }
        message = mailbox.receive(timeout) => match message {
            Some(message) => Next::Message(message),
            None => Next::Idle,
        },
    }
}

fn drain(mailbox: &mut Mailbox) -> Next {
    mailbox.try_receive().map_or(Next::Stop, Next::Message)
}
