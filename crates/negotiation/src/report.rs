//! Negotiation Report
//!
//! Merged actor traces plus the final state of the pool.

use relief_events::{format_resources, ResourceMap};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::conversation::ConversationState;
use crate::ledger::LedgerAudit;

#[derive(Debug, Clone)]
pub struct NegotiationReport {
    /// Every actor's trace, merged and sorted
    pub trace: Vec<String>,
    pub remaining: ResourceMap,
    pub allocations: BTreeMap<String, ResourceMap>,
    pub conversations: BTreeMap<String, ConversationState>,
    pub audit: LedgerAudit,
}

impl NegotiationReport {
    pub fn granted(&self) -> usize {
        self.count(ConversationState::Granted)
    }

    pub fn declined(&self) -> usize {
        self.count(ConversationState::Declined)
    }

    fn count(&self, state: ConversationState) -> usize {
        self.conversations.values().filter(|s| **s == state).count()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(90);
        let mut out = String::new();
        out.push_str("NEGOTIATION EXECUTION TRACE\n");
        out.push_str(&format!("{}\n\n", rule));

        out.push_str(&format!("COMBINED AGENT TRACES\n{}\n\n", rule));
        for entry in &self.trace {
            out.push_str(entry);
            out.push('\n');
        }

        out.push_str(&format!("\n\nRESOURCE ALLOCATION SUMMARY\n{}\n", rule));
        out.push_str("Remaining Resources:\n");
        for (kind, amount) in &self.remaining {
            out.push_str(&format!("  {}: {}\n", kind, amount));
        }

        out.push_str("\nAllocated to Disasters:\n");
        for (event_id, resources) in &self.allocations {
            out.push_str(&format!("  Event {}: {}\n", event_id, format_resources(resources)));
        }

        out.push_str(&format!(
            "\nConversations: {} total, {} granted, {} declined\n",
            self.conversations.len(),
            self.granted(),
            self.declined()
        ));

        if self.audit.is_balanced() {
            out.push_str("Ledger audit: balanced\n");
        } else {
            out.push_str("Ledger audit: IMBALANCED\n");
            for imbalance in &self.audit.imbalances {
                out.push_str(&format!(
                    "  {}: initial {}, available {}, allocated {}\n",
                    imbalance.kind, imbalance.initial, imbalance.available, imbalance.allocated
                ));
            }
        }
        if !self.audit.reused_event_ids.is_empty() {
            out.push_str(&format!(
                "Re-requested events: {}\n",
                self.audit.reused_event_ids.join(", ")
            ));
        }
        out
    }

    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Imbalance;
    use relief_events::ResourceKind;

    fn report() -> NegotiationReport {
        let mut remaining = ResourceMap::new();
        remaining.insert(ResourceKind::RescueTeams, 2);
        let mut allocations = BTreeMap::new();
        allocations.insert(
            "EVT0001".to_string(),
            [(ResourceKind::RescueTeams, 3)].into_iter().collect(),
        );
        let mut conversations = BTreeMap::new();
        conversations.insert("CONV-reporter-1".to_string(), ConversationState::Granted);
        conversations.insert("CONV-reporter-2".to_string(), ConversationState::Declined);

        NegotiationReport {
            trace: vec!["[+00000000ms] coordinator | Coordinator started".to_string()],
            remaining,
            allocations,
            conversations,
            audit: LedgerAudit::default(),
        }
    }

    #[test]
    fn test_render_sections() {
        let text = report().render();
        assert!(text.contains("COMBINED AGENT TRACES"));
        assert!(text.contains("  rescue_teams: 2\n"));
        assert!(text.contains("  Event EVT0001: {rescue_teams: 3}\n"));
        assert!(text.contains("Conversations: 2 total, 1 granted, 1 declined"));
        assert!(text.contains("Ledger audit: balanced"));
    }

    #[test]
    fn test_render_imbalance() {
        let mut report = report();
        report.audit = LedgerAudit {
            imbalances: vec![Imbalance {
                kind: ResourceKind::RescueTeams,
                initial: 5,
                available: 1,
                allocated: 2,
            }],
            reused_event_ids: vec!["EVT0001".to_string()],
        };
        let text = report.render();
        assert!(text.contains("Ledger audit: IMBALANCED"));
        assert!(text.contains("  rescue_teams: initial 5, available 1, allocated 2"));
        assert!(text.contains("Re-requested events: EVT0001"));
    }
}
