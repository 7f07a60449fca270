//! Lets the negotiation reporter pull percepts straight from an engine.

use negotiation::PerceptFeed;
use rand::Rng;
use relief_events::Percept;

use super::engine::EnvironmentEngine;

impl<R: Rng + Send> PerceptFeed for EnvironmentEngine<R> {
    /// Advances one cycle, then senses every location.
    fn next_percepts(&mut self) -> Vec<Percept> {
        self.advance();
        self.sense_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{default_locations, EnvironmentParams};

    #[test]
    fn test_feed_advances_engine() {
        let mut engine =
            EnvironmentEngine::seeded(5, default_locations(), EnvironmentParams::default())
                .unwrap();
        let percepts = engine.next_percepts();
        assert_eq!(percepts.len(), 5);
        assert_eq!(engine.clock().cycle, 1);
        assert!(percepts.iter().all(|p| p.timestamp.cycle == 1));
    }
}
