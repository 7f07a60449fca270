//! Resource Ledger
//!
//! The coordinator's stock and the allocations made from it. Decisions are
//! all-or-nothing: either every managed kind in a request is available and
//! all of it is taken, or nothing changes.

use relief_events::{format_resources, ResourceKind, ResourceMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Kinds the coordinator hands out. Other requested kinds are ignored.
pub const MANAGED_KINDS: [ResourceKind; 4] = [
    ResourceKind::RescueTeams,
    ResourceKind::MedicalKits,
    ResourceKind::FireTrucks,
    ResourceKind::Ambulances,
];

/// How a repeated request for the same event id is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMode {
    /// The new allocation replaces the old record; the old stock stays
    /// taken, so the books no longer balance.
    #[default]
    Overwrite,
    /// The old allocation goes back to the pool before deciding.
    Reconcile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    NoManagedResources,
    InsufficientResources,
}

impl RefusalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefusalReason::NoManagedResources => "no managed resources",
            RefusalReason::InsufficientResources => "insufficient resources",
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one allocation request.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationDecision {
    Granted {
        allocated: ResourceMap,
        remaining: ResourceMap,
    },
    Refused {
        reason: RefusalReason,
        available: ResourceMap,
        requested: ResourceMap,
    },
}

impl AllocationDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AllocationDecision::Granted { .. })
    }
}

/// One kind whose books do not balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imbalance {
    pub kind: ResourceKind,
    pub initial: u32,
    pub available: u32,
    pub allocated: u32,
}

/// Result of checking `available + allocated == initial` per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerAudit {
    pub imbalances: Vec<Imbalance>,
    /// Event ids allocated more than once
    pub reused_event_ids: Vec<String>,
}

impl LedgerAudit {
    pub fn is_balanced(&self) -> bool {
        self.imbalances.is_empty()
    }
}

/// Stock plus allocation records, owned by a single coordinator.
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    initial: ResourceMap,
    available: ResourceMap,
    allocations: BTreeMap<String, ResourceMap>,
    reused: Vec<String>,
    mode: AccountingMode,
}

impl ResourceLedger {
    pub fn new(pool: ResourceMap, mode: AccountingMode) -> Self {
        Self {
            initial: pool.clone(),
            available: pool,
            allocations: BTreeMap::new(),
            reused: Vec::new(),
            mode,
        }
    }

    pub fn available(&self) -> &ResourceMap {
        &self.available
    }

    pub fn available_of(&self, kind: ResourceKind) -> u32 {
        self.available.get(&kind).copied().unwrap_or(0)
    }

    pub fn allocations(&self) -> &BTreeMap<String, ResourceMap> {
        &self.allocations
    }

    pub fn mode(&self) -> AccountingMode {
        self.mode
    }

    /// Keeps only the managed kinds of `requested`.
    pub fn managed(requested: &ResourceMap) -> ResourceMap {
        requested
            .iter()
            .filter(|(kind, _)| MANAGED_KINDS.contains(kind))
            .map(|(kind, amount)| (*kind, *amount))
            .collect()
    }

    /// Decides one request atomically.
    pub fn decide(&mut self, event_id: &str, requested: &ResourceMap) -> AllocationDecision {
        let managed = Self::managed(requested);

        if self.allocations.contains_key(event_id) {
            self.reused.push(event_id.to_string());
            match self.mode {
                AccountingMode::Overwrite => {
                    warn!(event_id, "event already has an allocation; it will be overwritten");
                }
                AccountingMode::Reconcile => {
                    if let Some(previous) = self.allocations.remove(event_id) {
                        for (kind, amount) in previous {
                            *self.available.entry(kind).or_insert(0) += amount;
                        }
                        debug!(event_id, "returned previous allocation to the pool");
                    }
                }
            }
        }

        if managed.is_empty() {
            return self.refuse(RefusalReason::NoManagedResources, managed);
        }
        if managed
            .iter()
            .any(|(kind, amount)| *amount > self.available_of(*kind))
        {
            return self.refuse(RefusalReason::InsufficientResources, managed);
        }

        for (kind, amount) in &managed {
            if let Some(stock) = self.available.get_mut(kind) {
                *stock -= amount;
            }
        }
        self.allocations.insert(event_id.to_string(), managed.clone());

        debug!(
            event_id,
            allocated = %format_resources(&managed),
            remaining = %format_resources(&self.available),
            "allocation granted"
        );
        AllocationDecision::Granted {
            allocated: managed,
            remaining: self.available.clone(),
        }
    }

    fn refuse(&self, reason: RefusalReason, requested: ResourceMap) -> AllocationDecision {
        debug!(reason = %reason, requested = %format_resources(&requested), "allocation refused");
        AllocationDecision::Refused {
            reason,
            available: self.available.clone(),
            requested,
        }
    }

    /// Checks the conservation invariant for every kind ever stocked or
    /// allocated.
    pub fn audit(&self) -> LedgerAudit {
        let mut allocated = ResourceMap::new();
        for record in self.allocations.values() {
            for (kind, amount) in record {
                *allocated.entry(*kind).or_insert(0) += amount;
            }
        }

        let mut kinds: Vec<ResourceKind> = self.initial.keys().copied().collect();
        kinds.extend(allocated.keys().copied());
        kinds.sort();
        kinds.dedup();

        let imbalances = kinds
            .into_iter()
            .filter_map(|kind| {
                let initial = self.initial.get(&kind).copied().unwrap_or(0);
                let available = self.available_of(kind);
                let held = allocated.get(&kind).copied().unwrap_or(0);
                (available + held != initial).then_some(Imbalance {
                    kind,
                    initial,
                    available,
                    allocated: held,
                })
            })
            .collect();

        let mut reused_event_ids = self.reused.clone();
        reused_event_ids.sort();
        reused_event_ids.dedup();

        LedgerAudit {
            imbalances,
            reused_event_ids,
        }
    }
}
