use zukunftstag::core::scoring::{ScoringEngine, perimeter_delta, validate_member_name};
use zukunftstag::errors::AppError;
use zukunftstag::models::{GameKind, GamePayload};

fn score(kind: GameKind, raw: &str) -> f64 {
    ScoringEngine::evaluate(kind, raw).expect("valid payload").1
}

fn rejected(kind: GameKind, raw: &str) -> String {
    match ScoringEngine::evaluate(kind, raw) {
        Err(AppError::InvalidPayload { reason, .. }) => reason,
        other => panic!("expected InvalidPayload, got {other:?}"),
    }
}

#[test]
fn tech_check_scores_one_for_valid_names() {
    let s = score(
        GameKind::TechCheck,
        r#"{"parent_name":"Hans-Peter","child_name":"Zoë"}"#,
    );
    assert_eq!(s, 1.0);
}

#[test]
fn tech_check_rejects_digits_and_short_names() {
    let reason = rejected(
        GameKind::TechCheck,
        r#"{"parent_name":"R2D2","child_name":"Lea"}"#,
    );
    assert!(reason.contains("letters"));

    let reason = rejected(GameKind::TechCheck, r#"{"parent_name":"A","child_name":"Lea"}"#);
    assert!(reason.contains("at least 2"));
}

#[test]
fn member_name_rules() {
    assert!(validate_member_name("Anna Lena").is_ok());
    assert!(validate_member_name("Jürg").is_ok());
    assert!(validate_member_name(" ").is_err());
    assert!(validate_member_name("Anna!").is_err());
}

#[test]
fn heights_within_bounds_score_one() {
    let s = score(
        GameKind::Game1Heights,
        r#"{"parent_height":180,"child_height":120}"#,
    );
    assert_eq!(s, 1.0);

    // bounds are inclusive
    let s = score(
        GameKind::Game1Heights,
        r#"{"parent_height":100,"child_height":200}"#,
    );
    assert_eq!(s, 1.0);
}

#[test]
fn heights_out_of_range_are_rejected() {
    let reason = rejected(
        GameKind::Game1Heights,
        r#"{"parent_height":250,"child_height":120}"#,
    );
    assert!(reason.contains("parent_height"));

    let reason = rejected(
        GameKind::Game1Heights,
        r#"{"parent_height":170,"child_height":79.5}"#,
    );
    assert!(reason.contains("child_height"));
}

#[test]
fn perimeter_exact_estimates_score_hundred() {
    let s = score(
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":28,"child_estimate":28}"#,
    );
    assert_eq!(s, 100.0);
}

#[test]
fn perimeter_accuracy_uses_mean_absolute_delta() {
    // deltas +2 and -4 → mean 3 → 100 * (1 - 3/28) = 89.2857… → 89.29
    let s = score(
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":30,"child_estimate":24}"#,
    );
    assert_eq!(s, 89.29);
    assert_eq!(perimeter_delta(24.0), -4.0);
}

#[test]
fn perimeter_accuracy_is_floored_at_zero() {
    let s = score(
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":100,"child_estimate":90}"#,
    );
    assert_eq!(s, 0.0);
}

#[test]
fn perimeter_outside_range_is_rejected() {
    rejected(
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":4.9,"child_estimate":28}"#,
    );
}

#[test]
fn memory_counts_answers_matching_the_key() {
    let all = r#"{"answers":[{"round":1,"answer":"C"},{"round":2,"answer":"A"},{"round":3,"answer":"D"}]}"#;
    assert_eq!(score(GameKind::Game3Memory, all), 3.0);

    // order of rounds does not matter, answers are case-insensitive
    let two = r#"{"answers":[{"round":3,"answer":"d"},{"round":1,"answer":"B"},{"round":2,"answer":"a"}]}"#;
    assert_eq!(score(GameKind::Game3Memory, two), 2.0);
}

#[test]
fn memory_requires_exactly_three_distinct_rounds() {
    rejected(
        GameKind::Game3Memory,
        r#"{"answers":[{"round":1,"answer":"C"},{"round":2,"answer":"A"}]}"#,
    );
    let reason = rejected(
        GameKind::Game3Memory,
        r#"{"answers":[{"round":1,"answer":"C"},{"round":1,"answer":"A"},{"round":3,"answer":"D"}]}"#,
    );
    assert!(reason.contains("twice"));
    rejected(
        GameKind::Game3Memory,
        r#"{"answers":[{"round":1,"answer":"C"},{"round":2,"answer":"A"},{"round":4,"answer":"D"}]}"#,
    );
    rejected(
        GameKind::Game3Memory,
        r#"{"answers":[{"round":1,"answer":"E"},{"round":2,"answer":"A"},{"round":3,"answer":"D"}]}"#,
    );
}

#[test]
fn clinical_sums_pain_reduction_and_can_be_negative() {
    let s = score(
        GameKind::Game4Clinical,
        r#"{"parent_before":7,"parent_after":3,"child_before":6,"child_after":5}"#,
    );
    assert_eq!(s, 5.0);

    let s = score(
        GameKind::Game4Clinical,
        r#"{"parent_before":2,"parent_after":4,"child_before":3,"child_after":3}"#,
    );
    assert_eq!(s, -2.0);
}

#[test]
fn clinical_rejects_scores_outside_zero_to_ten() {
    let reason = rejected(
        GameKind::Game4Clinical,
        r#"{"parent_before":11,"parent_after":3,"child_before":6,"child_after":5}"#,
    );
    assert!(reason.contains("parent_before"));
}

#[test]
fn feedback_scores_the_rating() {
    let s = score(
        GameKind::Feedback,
        r#"{"overall_rating":4,"favorite_game":"Game 3: Memory"}"#,
    );
    assert_eq!(s, 4.0);

    rejected(
        GameKind::Feedback,
        r#"{"overall_rating":6,"favorite_game":"Game 3: Memory"}"#,
    );
    rejected(GameKind::Feedback, r#"{"overall_rating":3,"favorite_game":"  "}"#);
}

#[test]
fn payload_of_another_game_is_rejected() {
    // heights answer sent as perimeter
    let reason = rejected(
        GameKind::Game2Perimeter,
        r#"{"parent_height":180,"child_height":120}"#,
    );
    assert!(reason.contains("malformed"));

    rejected(GameKind::Feedback, "not json");
}

#[test]
fn parsed_payload_knows_its_kind() {
    let p = GamePayload::parse(GameKind::Game4Clinical, r#"{"parent_before":1,"parent_after":1,"child_before":1,"child_after":1}"#)
        .unwrap();
    assert_eq!(p.kind(), GameKind::Game4Clinical);
}
