//! End-to-end coaching pipeline behavior
//!
//! Drives a CoachingSession the way the connection layer does (one turn at
//! a time, arrival order) and checks the externally observable properties:
//! dedup, cooldown, queue bounds, metrics invariants.

use chrono::{DateTime, Duration, Utc};
use pitchcoach_engine::{CoachConfig, CoachingSession, Speaker};

fn ts(offset_secs: i64) -> DateTime<Utc> {
    chrono::DateTime::from_timestamp(1_750_000_000 + offset_secs, 0).unwrap()
}

#[test]
fn full_conversation_produces_expected_feedback() {
    let mut session = CoachingSession::default();

    session.on_transcript(Speaker::Trainee, "How do you currently handle pest issues?", ts(0));
    session.on_transcript(Speaker::Counterpart, "We spray ourselves, honestly it's too expensive to hire anyone", ts(5));
    session.on_transcript(Speaker::Trainee, "I understand, a lot of other customers started out the same way", ts(10));
    session.on_transcript(Speaker::Counterpart, "I'd still have to talk to my boss about it", ts(15));

    let feedback = session.feedback();
    let categories: Vec<&str> = feedback.iter().map(|i| i.category.as_str()).collect();

    assert!(categories.contains(&"technique:open-ended-question"));
    assert!(categories.contains(&"objection:price"));
    assert!(categories.contains(&"technique:empathy-framing"));
    assert!(categories.contains(&"technique:social-proof"));
    assert!(categories.contains(&"objection:authority"));

    let metrics = session.metrics();
    assert_eq!(metrics.objection_count, 2);
    assert_eq!(metrics.techniques_used.len(), 3);
}

#[test]
fn no_two_items_share_category_and_turn() {
    // ratio_low of 0 disables below-band warnings so only detection-keyed
    // items are in play
    let mut session = CoachingSession::new(CoachConfig {
        ratio_low: 0,
        ..Default::default()
    });

    // Each turn hits the same category through several phrases
    session.on_transcript(Speaker::Counterpart, "too expensive, over budget, costs too much", ts(0));
    session.on_transcript(Speaker::Counterpart, "still too expensive I think", ts(10));

    let feedback = session.feedback();
    assert_eq!(feedback.len(), 2, "one item per (category, turn)");
    assert!(feedback.iter().all(|i| i.category == "objection:price"));
}

#[test]
fn metrics_ratio_stays_in_bounds_for_any_turn_sequence() {
    let mut session = CoachingSession::default();
    assert_eq!(session.metrics().talk_time_ratio, 50, "empty log defaults to 50");

    let scripts = [
        (Speaker::Trainee, "a short one"),
        (Speaker::Counterpart, "a much longer counterpart reply with many words in it"),
        (Speaker::Trainee, "x"),
        (Speaker::Counterpart, "y"),
    ];
    for (i, (speaker, text)) in scripts.iter().enumerate() {
        session.on_transcript(*speaker, text, ts(i as i64));
        assert!(session.metrics().talk_time_ratio <= 100);
    }
}

#[test]
fn queue_is_capped_and_keeps_newest() {
    // Zero cooldown so every trainee-dominated turn emits a warning
    let mut session = CoachingSession::new(CoachConfig {
        cooldown: Duration::zero(),
        queue_capacity: 50,
        ..Default::default()
    });

    for i in 0..60 {
        session.on_transcript(Speaker::Trainee, "filler words to keep the ratio high", ts(i));
    }

    let feedback = session.feedback();
    assert_eq!(feedback.len(), 50);
    // Oldest 10 were evicted; the list stays timestamp-ascending
    assert_eq!(feedback.first().unwrap().timestamp, ts(10));
    assert_eq!(feedback.last().unwrap().timestamp, ts(59));
    assert!(feedback.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn imbalance_recovers_and_warns_again_after_cooldown() {
    let mut session = CoachingSession::new(CoachConfig {
        cooldown: Duration::seconds(30),
        ..Default::default()
    });

    session.on_transcript(Speaker::Trainee, &"t".repeat(100), ts(0));
    let warnings = |s: &CoachingSession| {
        s.feedback()
            .into_iter()
            .filter(|i| i.category == "talk-time-imbalance")
            .count()
    };
    assert_eq!(warnings(&session), 1);

    // Counterpart catches up, ratio returns to band: no new warning even
    // after the window
    session.on_transcript(Speaker::Counterpart, &"c".repeat(100), ts(40));
    assert_eq!(warnings(&session), 1);

    // Trainee dominates again past the window: warned again
    session.on_transcript(Speaker::Trainee, &"t".repeat(500), ts(80));
    assert_eq!(warnings(&session), 2);
}

#[test]
fn feedback_items_serialize_for_the_presentation_layer() {
    let mut session = CoachingSession::default();
    session.on_transcript(Speaker::Counterpart, "not interested, we don't need it", ts(0));

    let feedback = session.feedback();
    let json = serde_json::to_string(&feedback).unwrap();
    assert!(json.contains("\"category\":\"objection:need\""));
    assert!(json.contains("\"severity\":\"neutral\""));

    let metrics_json = serde_json::to_string(&session.metrics()).unwrap();
    assert!(metrics_json.contains("\"talk_time_ratio\":0"));
}
