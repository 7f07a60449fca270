//! Percept sources for the reporter.

use relief_events::Percept;
use std::collections::VecDeque;

/// Anything that can hand the reporter a fresh batch of percepts.
pub trait PerceptFeed: Send {
    /// Returns the next batch. Each call may advance the underlying world.
    fn next_percepts(&mut self) -> Vec<Percept>;
}

/// Replays prepared batches in order, then yields empty batches.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    batches: VecDeque<Vec<Percept>>,
}

impl ScriptedFeed {
    pub fn new(batches: Vec<Vec<Percept>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl PerceptFeed for ScriptedFeed {
    fn next_percepts(&mut self) -> Vec<Percept> {
        self.batches.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_events::fixtures;

    #[test]
    fn test_scripted_feed_drains_then_goes_quiet() {
        let mut feed = ScriptedFeed::new(vec![vec![fixtures::percept(
            fixtures::calm_conditions(),
            vec![],
        )]]);
        assert_eq!(feed.remaining(), 1);
        assert_eq!(feed.next_percepts().len(), 1);
        assert!(feed.next_percepts().is_empty());
    }
}
