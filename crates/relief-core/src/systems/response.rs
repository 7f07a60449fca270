//! Response Controller
//!
//! A four-state machine (MONITORING, ASSESSING, DISPATCHING, RECOVERY) fed
//! once per cycle with derived events. Each call sweeps the state handlers
//! in order, so a single cycle with a disaster walks the whole response
//! loop and lands back in MONITORING.

use relief_events::{
    DerivedEvent, DisasterEvent, DisasterType, Percept, ResourceKind, ResponseState, Severity,
    SimTimestamp, TransitionRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::derive::{derive_events, SeenEvents};

pub const GOAL_RESCUE_PEOPLE: &str = "Minimize casualties through rapid rescue operations";
pub const GOAL_STABILIZE_INFRASTRUCTURE: &str =
    "Stabilize critical infrastructure to prevent further damage";
pub const GOAL_OPTIMIZE_RESOURCES: &str = "Optimize resource allocation for maximum efficiency";

/// All goals, in report order.
pub const GOALS: [&str; 3] = [
    GOAL_RESCUE_PEOPLE,
    GOAL_STABILIZE_INFRASTRUCTURE,
    GOAL_OPTIMIZE_RESOURCES,
];

/// Picks the disaster to act on: highest (severity, casualties,
/// infrastructure damage), first occurrence on ties.
pub fn prioritize(events: &[DerivedEvent]) -> Option<&DisasterEvent> {
    let mut best: Option<&DisasterEvent> = None;
    for disaster in events.iter().filter_map(|e| e.disaster.as_ref()) {
        let replace = match best {
            None => true,
            Some(current) => outranks(disaster, current),
        };
        if replace {
            best = Some(disaster);
        }
    }
    best
}

fn outranks(candidate: &DisasterEvent, current: &DisasterEvent) -> bool {
    candidate
        .severity
        .cmp(&current.severity)
        .then(candidate.casualties.cmp(&current.casualties))
        .then(
            candidate
                .infrastructure_damage
                .total_cmp(&current.infrastructure_damage),
        )
        .is_gt()
}

/// What the controller decided to send during DISPATCHING.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchIntent {
    pub event_id: String,
    pub location: String,
    pub disaster_type: DisasterType,
    pub severity: Severity,
    pub rescue_teams: u32,
    pub medical_kits: u32,
}

impl DispatchIntent {
    fn for_disaster(disaster: &DisasterEvent) -> Self {
        Self {
            event_id: disaster.event_id.clone(),
            location: disaster.location.name.clone(),
            disaster_type: disaster.disaster_type,
            severity: disaster.severity,
            rescue_teams: disaster.needed(ResourceKind::RescueTeams),
            medical_kits: disaster.needed(ResourceKind::MedicalKits),
        }
    }
}

/// Everything one `react` call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutcome {
    pub timestamp: SimTimestamp,
    pub events: Vec<DerivedEvent>,
    pub transitions: Vec<TransitionRecord>,
    /// Formatted trace lines, in emission order
    pub trace_lines: Vec<String>,
    pub dispatch: Option<DispatchIntent>,
}

/// Per-cycle scratch state handed to each state handler.
struct CycleContext {
    timestamp: SimTimestamp,
    priority: Option<DisasterEvent>,
    outcome: CycleOutcome,
}

/// Goal-reactive response controller.
#[derive(Debug, Clone)]
pub struct ResponseController {
    agent_id: String,
    state: ResponseState,
    trace: Vec<String>,
    transitions: Vec<TransitionRecord>,
    seen: SeenEvents,
    clock: SimTimestamp,
}

impl ResponseController {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            state: ResponseState::Monitoring,
            trace: Vec::new(),
            transitions: Vec::new(),
            seen: SeenEvents::new(),
            clock: SimTimestamp::start(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Full trace history, oldest first.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn seen(&self) -> &SeenEvents {
        &self.seen
    }

    /// Derives events from `percepts` and reacts to them.
    ///
    /// The cycle timestamp is taken from the percepts; an empty batch keeps
    /// the controller's current clock.
    pub fn react_cycle(&mut self, percepts: &[Percept]) -> CycleOutcome {
        let timestamp = percepts.first().map(|p| p.timestamp).unwrap_or(self.clock);
        let events = derive_events(percepts, &mut self.seen);
        self.react(events, timestamp)
    }

    /// Runs one sweep of the state machine over already-derived events.
    pub fn react(&mut self, events: Vec<DerivedEvent>, timestamp: SimTimestamp) -> CycleOutcome {
        self.clock = timestamp;
        let mut ctx = CycleContext {
            timestamp,
            priority: prioritize(&events).cloned(),
            outcome: CycleOutcome {
                timestamp,
                ..CycleOutcome::default()
            },
        };

        if events.is_empty() {
            if self.state != ResponseState::Monitoring {
                self.switch_state(&mut ctx, ResponseState::Monitoring, "No active trigger events");
            }
            self.log(&mut ctx, "Action: Continue periodic monitoring");
            return ctx.outcome;
        }

        for event in &events {
            self.log(&mut ctx, event.to_string());
        }

        if self.state == ResponseState::Monitoring {
            self.handle_monitoring(&mut ctx);
        }
        if self.state == ResponseState::Assessing {
            self.handle_assessing(&mut ctx);
        }
        if self.state == ResponseState::Dispatching {
            self.handle_dispatching(&mut ctx);
        }
        if self.state == ResponseState::Recovery {
            self.handle_recovery(&mut ctx);
        }

        debug!(
            cycle = timestamp.cycle,
            events = events.len(),
            state = %self.state,
            "response cycle complete"
        );
        ctx.outcome.events = events;
        ctx.outcome
    }

    /// Appends a free-form line to the trace and returns it formatted.
    pub fn note(&mut self, message: impl AsRef<str>) -> String {
        let line = self.format_line(self.clock, message.as_ref());
        self.trace.push(line.clone());
        line
    }

    fn handle_monitoring(&mut self, ctx: &mut CycleContext) {
        self.switch_state(ctx, ResponseState::Assessing, "Disaster-related event detected");
    }

    fn handle_assessing(&mut self, ctx: &mut CycleContext) {
        let assessment = ctx.priority.as_ref().map(|priority| {
            format!(
                "Assessment: Prioritize {} at {} (Severity {})",
                priority.disaster_type, priority.location.name, priority.severity
            )
        });
        if let Some(line) = assessment {
            self.log(ctx, line);
        }
        self.switch_state(ctx, ResponseState::Dispatching, "Assessment complete");
    }

    fn handle_dispatching(&mut self, ctx: &mut CycleContext) {
        if let Some(intent) = ctx.priority.as_ref().map(DispatchIntent::for_disaster) {
            let line = format!(
                "Dispatch: Send {} rescue teams and {} medical kits to {}",
                intent.rescue_teams, intent.medical_kits, intent.location
            );
            self.log(ctx, line);
            self.log(ctx, format!("Goal Alignment: {}", GOAL_RESCUE_PEOPLE));
            self.log(ctx, format!("Goal Alignment: {}", GOAL_OPTIMIZE_RESOURCES));
            info!(
                event_id = %intent.event_id,
                location = %intent.location,
                rescue_teams = intent.rescue_teams,
                medical_kits = intent.medical_kits,
                "dispatch issued"
            );
            ctx.outcome.dispatch = Some(intent);
        }
        self.switch_state(ctx, ResponseState::Recovery, "Initial dispatch actions completed");
    }

    fn handle_recovery(&mut self, ctx: &mut CycleContext) {
        // Without a disaster to judge, recovery holds until the next cycle.
        let Some(severity) = ctx.priority.as_ref().map(|p| p.severity) else {
            return;
        };

        if severity <= Severity::Moderate {
            self.log(ctx, "Recovery: Situation is stabilizing; downgrade response level");
            self.switch_state(ctx, ResponseState::Monitoring, "Disaster impact under control");
        } else {
            self.log(ctx, "Recovery: Continue containment and infrastructure stabilization");
            self.log(ctx, format!("Goal Alignment: {}", GOAL_STABILIZE_INFRASTRUCTURE));
            self.switch_state(
                ctx,
                ResponseState::Monitoring,
                "Return to monitor after recovery cycle",
            );
        }
    }

    fn switch_state(&mut self, ctx: &mut CycleContext, to: ResponseState, reason: &str) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;

        let record = TransitionRecord {
            from,
            to,
            reason: reason.to_string(),
            timestamp: ctx.timestamp,
        };
        self.transitions.push(record.clone());
        ctx.outcome.transitions.push(record);

        info!(from = %from, to = %to, reason, "state transition");
        self.log(ctx, format!("STATE {} -> {} | Reason: {}", from, to, reason));
    }

    fn log(&mut self, ctx: &mut CycleContext, message: impl AsRef<str>) {
        let line = self.format_line(ctx.timestamp, message.as_ref());
        self.trace.push(line.clone());
        ctx.outcome.trace_lines.push(line);
    }

    fn format_line(&self, timestamp: SimTimestamp, message: &str) -> String {
        format!("[{}] {} | {}", timestamp, self.agent_id, message)
    }
}
