//! End-to-end negotiation runs on a paused tokio clock.

use negotiation::{
    AccountingMode, ConversationState, Negotiation, NegotiationConfig, ScriptedFeed,
};
use relief_events::fixtures;
use relief_events::{DisasterEvent, DisasterType, Percept, ResourceKind, ResourceMap, Severity};
use std::time::Duration;

fn pool(entries: &[(ResourceKind, u32)]) -> ResourceMap {
    entries.iter().copied().collect()
}

fn needing(event_id: &str, needs: &[(ResourceKind, u32)]) -> DisasterEvent {
    let mut disaster = fixtures::disaster(event_id, DisasterType::Fire, Severity::Critical);
    disaster.resources_needed = pool(needs);
    disaster
}

fn batch(disaster: DisasterEvent) -> Vec<Percept> {
    vec![fixtures::percept(fixtures::calm_conditions(), vec![disaster])]
}

fn config(initial: &ResourceMap) -> NegotiationConfig {
    NegotiationConfig::default()
        .with_pool(initial)
        .with_reporter_interval_ms(3000)
}

#[tokio::test(start_paused = true)]
async fn test_request_within_stock_is_granted() {
    let initial = pool(&[(ResourceKind::RescueTeams, 5)]);
    let disaster = needing(
        "EVT0001",
        &[(ResourceKind::RescueTeams, 3), (ResourceKind::Water, 80)],
    );
    let feed = ScriptedFeed::new(vec![batch(disaster)]);

    let report = Negotiation::spawn(&config(&initial), feed)
        .unwrap()
        .run_for(Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(
        report.conversations.get("CONV-reporter-1"),
        Some(&ConversationState::Granted)
    );
    assert_eq!(report.remaining, pool(&[(ResourceKind::RescueTeams, 2)]));
    assert_eq!(
        report.allocations.get("EVT0001"),
        Some(&pool(&[(ResourceKind::RescueTeams, 3)]))
    );
    assert!(report.audit.is_balanced());
    assert!(report
        .trace
        .iter()
        .any(|l| l.contains("RECV CONFIRM from coordinator | Conv:CONV-reporter-1")));
}

#[tokio::test(start_paused = true)]
async fn test_request_beyond_stock_is_declined() {
    let initial = pool(&[(ResourceKind::RescueTeams, 5)]);
    let disaster = needing(
        "EVT0001",
        &[(ResourceKind::RescueTeams, 5), (ResourceKind::FireTrucks, 2)],
    );
    let feed = ScriptedFeed::new(vec![batch(disaster)]);

    let report = Negotiation::spawn(&config(&initial), feed)
        .unwrap()
        .run_for(Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(
        report.conversations.get("CONV-reporter-1"),
        Some(&ConversationState::Declined)
    );
    assert_eq!(report.remaining, initial);
    assert!(report.allocations.is_empty());
    assert!(report
        .trace
        .iter()
        .any(|l| l.ends_with("RECV REFUSE from coordinator | Conv:CONV-reporter-1 | Reason: insufficient resources")));
}

fn position(trace: &[String], needle: &str) -> usize {
    trace
        .iter()
        .position(|l| l.contains(needle))
        .unwrap_or_else(|| panic!("no trace line containing {needle:?}"))
}

fn assert_exchange_in_order(trace: &[String]) {
    let before = [
        ("reporter | SEND INFORM", "responder | RECV INFORM"),
        ("responder | RECV INFORM", "responder | SEND REQUEST"),
        ("responder | SEND REQUEST", "coordinator | RECV REQUEST"),
        ("coordinator | RECV REQUEST", "coordinator | SEND AGREE"),
        ("coordinator | SEND AGREE", "responder | RECV AGREE"),
        ("coordinator | SEND AGREE", "coordinator | SEND CONFIRM"),
        ("coordinator | SEND CONFIRM", "responder | RECV CONFIRM"),
        ("responder | RECV AGREE", "responder | RECV CONFIRM"),
        ("Responder started", "responder | RECV INFORM"),
    ];
    for (first, then) in before {
        assert!(
            position(trace, first) < position(trace, then),
            "{first:?} should precede {then:?}: {trace:#?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_merged_trace_follows_the_exchange() {
    let initial = pool(&[(ResourceKind::FireTrucks, 4)]);
    let disaster = needing("EVT0001", &[(ResourceKind::FireTrucks, 2)]);
    let feed = ScriptedFeed::new(vec![batch(disaster)]);

    let report = Negotiation::spawn(&config(&initial), feed)
        .unwrap()
        .run_for(Duration::from_secs(1))
        .await
        .unwrap();

    assert_exchange_in_order(&report.trace);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_merged_trace_follows_the_exchange_on_threads() {
    let initial = pool(&[(ResourceKind::FireTrucks, 4)]);
    let disaster = needing("EVT0001", &[(ResourceKind::FireTrucks, 2)]);
    let feed = ScriptedFeed::new(vec![batch(disaster)]);

    let report = Negotiation::spawn(&config(&initial), feed)
        .unwrap()
        .run_for(Duration::from_millis(200))
        .await
        .unwrap();

    assert_exchange_in_order(&report.trace);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_inform_double_books_in_overwrite_mode() {
    let initial = pool(&[(ResourceKind::RescueTeams, 10)]);
    let disaster = needing("EVT0007", &[(ResourceKind::RescueTeams, 3)]);
    let feed = ScriptedFeed::new(vec![batch(disaster.clone()), batch(disaster)]);

    let report = Negotiation::spawn(&config(&initial), feed)
        .unwrap()
        .run_for(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(report.granted(), 2);
    assert_eq!(report.remaining, pool(&[(ResourceKind::RescueTeams, 4)]));
    assert!(!report.audit.is_balanced());
    assert_eq!(report.audit.reused_event_ids, vec!["EVT0007".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_inform_is_reconciled() {
    let initial = pool(&[(ResourceKind::RescueTeams, 10)]);
    let disaster = needing("EVT0007", &[(ResourceKind::RescueTeams, 3)]);
    let feed = ScriptedFeed::new(vec![batch(disaster.clone()), batch(disaster)]);
    let config = config(&initial).with_accounting(AccountingMode::Reconcile);

    let report = Negotiation::spawn(&config, feed)
        .unwrap()
        .run_for(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(report.granted(), 2);
    assert_eq!(report.remaining, pool(&[(ResourceKind::RescueTeams, 7)]));
    assert!(report.audit.is_balanced());
}

#[tokio::test(start_paused = true)]
async fn test_quiet_feed_produces_no_conversations() {
    let report = Negotiation::spawn(&NegotiationConfig::default(), ScriptedFeed::default())
        .unwrap()
        .run_for(Duration::from_secs(30))
        .await
        .unwrap();

    assert!(report.conversations.is_empty());
    assert!(report.allocations.is_empty());
    assert!(report.trace.iter().any(|l| l.contains("Coordinator started")));
    assert!(report.trace.iter().any(|l| l.contains("Reporter stopped after 0 informs")));
}

#[tokio::test]
async fn test_invalid_pool_is_rejected_before_spawning() {
    let mut config = NegotiationConfig::default();
    config.initial_pool.insert("boats".to_string(), 3);
    assert!(Negotiation::spawn(&config, ScriptedFeed::default()).is_err());
}
