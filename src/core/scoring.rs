//! Deterministic scoring, one pure function per game kind.
//!
//! Nothing in here touches the database: every function takes the decoded
//! payload only, validates it, and returns either the score or the reason the
//! payload was rejected. A rejected payload never produces a score.

use crate::errors::{AppError, AppResult};
use crate::models::GameKind;
use crate::models::payload::{
    ClinicalPayload, FeedbackPayload, GamePayload, HeightsPayload, MemoryPayload,
    PerimeterPayload, TechCheckPayload,
};
use regex::Regex;
use std::sync::OnceLock;

pub const PARENT_HEIGHT_RANGE: (f64, f64) = (100.0, 230.0);
pub const CHILD_HEIGHT_RANGE: (f64, f64) = (80.0, 200.0);

/// True perimeter of the measured room, metres.
pub const PERIMETER_GROUND_TRUTH: f64 = 28.0;
pub const PERIMETER_RANGE: (f64, f64) = (5.0, 100.0);

/// Correct molecule per memory round (round 1 → index 0).
pub const MEMORY_ANSWER_KEY: [&str; 3] = ["C", "A", "D"];
pub const MEMORY_OPTIONS: [&str; 4] = ["A", "B", "C", "D"];

pub const PAIN_SCORE_RANGE: (i64, i64) = (0, 10);
pub const RATING_RANGE: (i64, i64) = (1, 5);

pub const NAME_MIN_LENGTH: usize = 2;

/// Outcome of a scoring function: the score, or why the payload was rejected.
pub type Scored = Result<f64, String>;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Dispatch on the payload variant.
    pub fn score(payload: &GamePayload) -> Scored {
        match payload {
            GamePayload::TechCheck(p) => score_tech_check(p),
            GamePayload::Heights(p) => score_heights(p),
            GamePayload::Perimeter(p) => score_perimeter(p),
            GamePayload::Memory(p) => score_memory(p),
            GamePayload::Clinical(p) => score_clinical(p),
            GamePayload::Feedback(p) => score_feedback(p),
        }
    }

    /// Decode and score a raw JSON answer for `kind`.
    pub fn evaluate(kind: GameKind, raw: &str) -> AppResult<(GamePayload, f64)> {
        let invalid = |reason: String| AppError::InvalidPayload {
            kind: kind.to_string(),
            reason,
        };

        let payload = GamePayload::parse(kind, raw).map_err(invalid)?;
        debug_assert_eq!(payload.kind(), kind);
        let score = Self::score(&payload).map_err(invalid)?;
        Ok((payload, score))
    }
}

/// Member names: at least two characters, letters, spaces and hyphens only.
pub fn validate_member_name(name: &str) -> Result<(), String> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| Regex::new(r"^[\p{L} \-]+$").expect("static regex"));

    let trimmed = name.trim();
    if trimmed.chars().count() < NAME_MIN_LENGTH {
        return Err(format!(
            "name '{name}' must have at least {NAME_MIN_LENGTH} characters"
        ));
    }
    if !re.is_match(trimmed) {
        return Err(format!(
            "name '{name}' may only contain letters, spaces and hyphens"
        ));
    }
    Ok(())
}

fn check_range(label: &str, value: f64, (min, max): (f64, f64), unit: &str) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!(
            "{label} must be between {min} and {max} {unit} (got {value})"
        ));
    }
    Ok(())
}

fn check_int_range(label: &str, value: i64, (min, max): (i64, i64)) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{label} must be between {min} and {max} (got {value})"));
    }
    Ok(())
}

/// Registration check: both names valid → 1 point.
pub fn score_tech_check(p: &TechCheckPayload) -> Scored {
    validate_member_name(&p.parent_name)?;
    validate_member_name(&p.child_name)?;
    Ok(1.0)
}

/// Heights have no right answer: a plausible pair earns 1 point.
pub fn score_heights(p: &HeightsPayload) -> Scored {
    check_range("parent_height", p.parent_height, PARENT_HEIGHT_RANGE, "cm")?;
    check_range("child_height", p.child_height, CHILD_HEIGHT_RANGE, "cm")?;
    Ok(1.0)
}

/// Signed deviation of an estimate from the ground truth.
pub fn perimeter_delta(estimate: f64) -> f64 {
    estimate - PERIMETER_GROUND_TRUTH
}

/// Accuracy in percent: 100 minus the mean relative error, floored at 0.
pub fn score_perimeter(p: &PerimeterPayload) -> Scored {
    check_range("parent_estimate", p.parent_estimate, PERIMETER_RANGE, "m")?;
    check_range("child_estimate", p.child_estimate, PERIMETER_RANGE, "m")?;

    let mean_abs =
        (perimeter_delta(p.parent_estimate).abs() + perimeter_delta(p.child_estimate).abs()) / 2.0;
    let accuracy = (100.0 * (1.0 - mean_abs / PERIMETER_GROUND_TRUTH)).max(0.0);
    Ok((accuracy * 100.0).round() / 100.0)
}

/// One point per round answered with the molecule from the key.
pub fn score_memory(p: &MemoryPayload) -> Scored {
    let rounds = MEMORY_ANSWER_KEY.len();
    if p.answers.len() != rounds {
        return Err(format!(
            "expected {rounds} answers, got {}",
            p.answers.len()
        ));
    }

    let mut seen = [false; MEMORY_ANSWER_KEY.len()];
    let mut correct = 0u32;

    for a in &p.answers {
        let idx = (a.round as usize)
            .checked_sub(1)
            .filter(|i| *i < rounds)
            .ok_or_else(|| format!("round {} is outside 1..={rounds}", a.round))?;

        if seen[idx] {
            return Err(format!("round {} answered twice", a.round));
        }
        seen[idx] = true;

        let answer = a.answer.trim().to_uppercase();
        if !MEMORY_OPTIONS.contains(&answer.as_str()) {
            return Err(format!(
                "answer '{}' for round {} is not one of {:?}",
                a.answer, a.round, MEMORY_OPTIONS
            ));
        }
        if answer == MEMORY_ANSWER_KEY[idx] {
            correct += 1;
        }
    }

    Ok(correct as f64)
}

/// Total pain reduction across both members; negative when pain increased.
pub fn score_clinical(p: &ClinicalPayload) -> Scored {
    check_int_range("parent_before", p.parent_before, PAIN_SCORE_RANGE)?;
    check_int_range("parent_after", p.parent_after, PAIN_SCORE_RANGE)?;
    check_int_range("child_before", p.child_before, PAIN_SCORE_RANGE)?;
    check_int_range("child_after", p.child_after, PAIN_SCORE_RANGE)?;

    let reduction = (p.parent_before - p.parent_after) + (p.child_before - p.child_after);
    Ok(reduction as f64)
}

/// The overall rating is the score.
pub fn score_feedback(p: &FeedbackPayload) -> Scored {
    check_int_range("overall_rating", p.overall_rating, RATING_RANGE)?;
    if p.favorite_game.trim().is_empty() {
        return Err("favorite_game must not be empty".to_string());
    }
    Ok(p.overall_rating as f64)
}
