mod common;
use common::{SECRET, memory_pool};

use zukunftstag::core::admin::{ActiveSessionCheck, AdminAuth, AdminLogic};
use zukunftstag::core::progress::ProgressLogic;
use zukunftstag::core::session::SessionLogic;
use zukunftstag::core::team::{Members, RegistrationPolicy, TeamLogic};
use zukunftstag::errors::AppError;
use zukunftstag::models::{GameKind, GameStatus, TeamRef, Treatment};

const HEIGHTS: &str = r#"{"parent_height":180,"child_height":120}"#;
const OPEN: RegistrationPolicy = RegistrationPolicy {
    require_token: false,
};

fn auth() -> AdminAuth {
    AdminAuth::check(SECRET, SECRET).expect("secret")
}

fn register(pool: &mut zukunftstag::db::pool::DbPool, name: &str) -> i64 {
    TeamLogic::register_by_name(pool, OPEN, name, &Members::default())
        .expect("register")
        .id
}

#[test]
fn bootstrap_creates_default_sessions_once() {
    let mut pool = memory_pool();

    let sessions = SessionLogic::list(&pool).unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&"morning_session"));
    assert!(ids.contains(&"afternoon_session"));
    assert_eq!(SessionLogic::active(&pool).unwrap().id, "test_session");

    // re-running is a no-op
    assert!(SessionLogic::bootstrap(&mut pool).unwrap().is_empty());
    assert_eq!(SessionLogic::list(&pool).unwrap().len(), 3);
}

#[test]
fn scenario_register_play_and_read_back() {
    let mut pool = memory_pool();
    let session = SessionLogic::create(&mut pool, "evening_session", "Evening").unwrap();
    assert_eq!(session.id, "evening_session");
    assert!(!session.is_active);
    SessionLogic::switch_active(&mut pool, "evening_session").unwrap();

    let team = TeamLogic::register_by_name(&mut pool, OPEN, "Herceptin", &Members::default()).unwrap();
    assert_eq!(team.session_id, "evening_session");

    let started = ProgressLogic::start(&mut pool, team.id, GameKind::Game1Heights).unwrap();
    assert_eq!(started.status, GameStatus::InProgress);
    assert!(started.started_at.is_some());

    ProgressLogic::submit(&mut pool, team.id, GameKind::Game1Heights, HEIGHTS).unwrap();

    let record = ProgressLogic::get(&pool, team.id, GameKind::Game1Heights).unwrap();
    assert_eq!(record.status, GameStatus::Completed);
    assert_eq!(record.score, Some(1.0));
    assert!(record.completed_at.is_some());
    assert!(record.payload.unwrap().contains("parent_height"));
}

#[test]
fn registration_creates_one_record_per_game() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Aspirin");

    let records = AdminLogic::list_game_records(&pool, id).unwrap();
    assert_eq!(records.len(), GameKind::ALL.len());
    assert!(records.iter().all(|r| r.status == GameStatus::NotStarted));
    assert!(records.iter().all(|r| r.score.is_none()));
}

#[test]
fn duplicate_name_in_same_session_is_rejected() {
    let mut pool = memory_pool();
    register(&mut pool, "Ibuprofen");

    let err = TeamLogic::register_by_name(&mut pool, OPEN, " Ibuprofen ", &Members::default())
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateName { .. }));
}

#[test]
fn same_name_is_allowed_in_another_session() {
    let mut pool = memory_pool();
    register(&mut pool, "Insulin");

    SessionLogic::switch_active(&mut pool, "morning_session").unwrap();
    let id = register(&mut pool, "Insulin");
    let team = TeamLogic::resolve(&pool, &TeamRef::Id(id)).unwrap();
    assert_eq!(team.session_id, "morning_session");
}

#[test]
fn name_registration_closed_when_tokens_required() {
    let mut pool = memory_pool();
    let policy = RegistrationPolicy {
        require_token: true,
    };
    let err = TeamLogic::register_by_name(&mut pool, policy, "Penicillin", &Members::default())
        .unwrap_err();
    assert!(matches!(err, AppError::RegistrationClosed));
}

#[test]
fn invalid_member_names_are_rejected_before_registration() {
    let err = Members::new(Some("X"), Some("Lea")).unwrap_err();
    assert!(matches!(err, AppError::InvalidName(_)));

    let m = Members::new(Some("  Vreni "), None).unwrap();
    assert_eq!(m.parent_name, "Vreni");
    assert_eq!(m.child_name, "");
}

#[test]
fn scenario_switch_makes_old_teams_stale() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Cortison");

    SessionLogic::switch_active(&mut pool, "afternoon_session").unwrap();

    let err = TeamLogic::resolve(&pool, &TeamRef::Id(id)).unwrap_err();
    match err {
        AppError::StaleSession {
            team_session,
            active_session,
            ..
        } => {
            assert_eq!(team_session, "test_session");
            assert_eq!(active_session, "afternoon_session");
        }
        other => panic!("expected StaleSession, got {other:?}"),
    }

    // by name too, even though no team of that name exists in the new session
    let err = TeamLogic::resolve(&pool, &TeamRef::Name("Cortison".into())).unwrap_err();
    assert!(matches!(err, AppError::StaleSession { .. }));

    // and every team-facing operation goes through the same check
    let err = ProgressLogic::start(&mut pool, id, GameKind::TechCheck).unwrap_err();
    assert!(matches!(err, AppError::StaleSession { .. }));
}

#[test]
fn switch_keeps_exactly_one_active_session() {
    let mut pool = memory_pool();
    for target in ["morning_session", "afternoon_session", "afternoon_session", "test_session"] {
        SessionLogic::switch_active(&mut pool, target).unwrap();
        assert_eq!(
            AdminLogic::check_active_session(&pool).unwrap(),
            ActiveSessionCheck::Ok(target.to_string())
        );
    }

    let err = SessionLogic::switch_active(&mut pool, "night_session").unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
    assert_eq!(SessionLogic::active(&pool).unwrap().id, "test_session");
}

#[test]
fn database_refuses_a_second_active_row() {
    let pool = memory_pool();
    let res = pool.conn.execute(
        "UPDATE sessions SET is_active = 1 WHERE id = 'morning_session'",
        [],
    );
    assert!(res.is_err());
}

#[test]
fn missing_active_session_is_reported() {
    let mut pool = memory_pool();
    pool.conn
        .execute("UPDATE sessions SET is_active = 0", [])
        .unwrap();

    let err = TeamLogic::register_by_name(&mut pool, OPEN, "Morphin", &Members::default())
        .unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession(0)));
    assert!(err.is_integrity_breach());
    assert_eq!(
        AdminLogic::check_active_session(&pool).unwrap(),
        ActiveSessionCheck::NoneActive
    );
}

#[test]
fn submit_requires_started_game() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Heparin");

    let err = ProgressLogic::submit(&mut pool, id, GameKind::Game1Heights, HEIGHTS).unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            action: "submit",
            ..
        }
    ));
}

#[test]
fn double_submit_keeps_first_result() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Lithium");
    ProgressLogic::start(&mut pool, id, GameKind::Game2Perimeter).unwrap();
    ProgressLogic::submit(
        &mut pool,
        id,
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":28,"child_estimate":28}"#,
    )
    .unwrap();

    let err = ProgressLogic::submit(
        &mut pool,
        id,
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":50,"child_estimate":50}"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let record = ProgressLogic::get(&pool, id, GameKind::Game2Perimeter).unwrap();
    assert_eq!(record.score, Some(100.0));
}

#[test]
fn invalid_payload_leaves_game_in_progress() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Ritalin");
    ProgressLogic::start(&mut pool, id, GameKind::Game1Heights).unwrap();

    let err = ProgressLogic::submit(
        &mut pool,
        id,
        GameKind::Game1Heights,
        r#"{"parent_height":400,"child_height":120}"#,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidPayload { .. }));

    let record = ProgressLogic::get(&pool, id, GameKind::Game1Heights).unwrap();
    assert_eq!(record.status, GameStatus::InProgress);
    assert!(record.payload.is_none());

    // corrected answer goes through
    ProgressLogic::submit(&mut pool, id, GameKind::Game1Heights, HEIGHTS).unwrap();
}

#[test]
fn restarting_a_game_is_idempotent() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Codein");

    let first = ProgressLogic::start(&mut pool, id, GameKind::Feedback).unwrap();
    let again = ProgressLogic::start(&mut pool, id, GameKind::Feedback).unwrap();
    assert_eq!(first.started_at, again.started_at);
    assert_eq!(again.status, GameStatus::InProgress);
}

#[test]
fn games_can_be_played_in_any_order() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Valium");

    ProgressLogic::start(&mut pool, id, GameKind::Feedback).unwrap();
    ProgressLogic::submit(
        &mut pool,
        id,
        GameKind::Feedback,
        r#"{"overall_rating":5,"favorite_game":"Game 2: Perimeter","comments":"super"}"#,
    )
    .unwrap();

    let progress = ProgressLogic::progress(&pool, &TeamRef::Id(id)).unwrap();
    assert_eq!(progress.len(), 6);
    assert_eq!(progress[0], (GameKind::TechCheck, GameStatus::NotStarted));
    assert_eq!(progress[5], (GameKind::Feedback, GameStatus::Completed));
}

#[test]
fn admin_reset_returns_game_to_not_started() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Tamiflu");
    ProgressLogic::start(&mut pool, id, GameKind::Game1Heights).unwrap();
    ProgressLogic::submit(&mut pool, id, GameKind::Game1Heights, HEIGHTS).unwrap();

    let record = AdminLogic::reset_game(&mut pool, &auth(), id, GameKind::Game1Heights).unwrap();
    assert_eq!(record.status, GameStatus::NotStarted);
    assert!(record.score.is_none());
    assert!(record.payload.is_none());
    assert!(record.started_at.is_none());

    // playable again
    ProgressLogic::start(&mut pool, id, GameKind::Game1Heights).unwrap();
    ProgressLogic::submit(&mut pool, id, GameKind::Game1Heights, HEIGHTS).unwrap();
}

#[test]
fn scenario_clear_keeps_session_and_flag() {
    let mut pool = memory_pool();
    let a = register(&mut pool, "Alpha");
    register(&mut pool, "Beta");
    ProgressLogic::start(&mut pool, a, GameKind::TechCheck).unwrap();

    let report = AdminLogic::clear_session_data(&mut pool, &auth(), "test_session").unwrap();
    assert_eq!(report.teams, 2);
    assert_eq!(report.records, 12);

    let session = SessionLogic::get(&pool, "test_session").unwrap();
    assert!(session.is_active);
    assert!(AdminLogic::list_teams(&pool, "test_session").unwrap().is_empty());

    // names are free again
    register(&mut pool, "Alpha");
}

#[test]
fn clear_only_touches_the_given_session() {
    let mut pool = memory_pool();
    register(&mut pool, "Stay");
    SessionLogic::switch_active(&mut pool, "morning_session").unwrap();
    register(&mut pool, "Go");

    AdminLogic::clear_session_data(&mut pool, &auth(), "morning_session").unwrap();
    assert_eq!(AdminLogic::list_teams(&pool, "test_session").unwrap().len(), 1);
}

#[test]
fn wrong_secret_is_unauthorized() {
    assert!(matches!(AdminAuth::check(SECRET, "nope"), Err(AppError::Unauthorized)));
    assert!(matches!(AdminAuth::check("", ""), Err(AppError::Unauthorized)));
}

#[test]
fn overview_counts_statuses_per_game() {
    let mut pool = memory_pool();
    let a = register(&mut pool, "Alpha");
    let b = register(&mut pool, "Beta");
    register(&mut pool, "Gamma");

    ProgressLogic::start(&mut pool, a, GameKind::Game1Heights).unwrap();
    ProgressLogic::submit(&mut pool, a, GameKind::Game1Heights, HEIGHTS).unwrap();
    ProgressLogic::start(&mut pool, b, GameKind::Game1Heights).unwrap();

    let overview = AdminLogic::session_overview(&pool, "test_session").unwrap();
    let heights = overview
        .iter()
        .find(|g| g.kind == GameKind::Game1Heights)
        .unwrap();
    assert_eq!(heights.completed, 1);
    assert_eq!(heights.in_progress, 1);
    assert_eq!(heights.not_started, 1);
    assert_eq!(heights.mean_score, Some(1.0));

    let memory = overview
        .iter()
        .find(|g| g.kind == GameKind::Game3Memory)
        .unwrap();
    assert_eq!(memory.not_started, 3);
    assert_eq!(memory.mean_score, None);
}

#[test]
fn export_rows_cover_every_team_and_game() {
    let mut pool = memory_pool();
    let a = register(&mut pool, "Alpha");
    register(&mut pool, "Beta");
    ProgressLogic::start(&mut pool, a, GameKind::Game2Perimeter).unwrap();
    ProgressLogic::submit(
        &mut pool,
        a,
        GameKind::Game2Perimeter,
        r#"{"parent_estimate":30,"child_estimate":24}"#,
    )
    .unwrap();

    // a team in another session never shows up
    SessionLogic::switch_active(&mut pool, "morning_session").unwrap();
    register(&mut pool, "Elsewhere");

    let rows = AdminLogic::export_results(&pool, "test_session").unwrap();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.session_id == "test_session"));

    let perimeter = rows
        .iter()
        .find(|r| r.team_id == a && r.game_kind == "game2_perimeter")
        .unwrap();
    assert_eq!(perimeter.status, "completed");
    assert_eq!(perimeter.score, Some(89.29));
    assert_eq!(perimeter.parent_delta, Some(2.0));
    assert_eq!(perimeter.child_delta, Some(-4.0));
    assert_eq!(perimeter.mean_abs_delta, Some(3.0));

    let untouched = rows
        .iter()
        .find(|r| r.team_name == "Beta" && r.game_kind == "feedback")
        .unwrap();
    assert_eq!(untouched.status, "not_started");
    assert_eq!(untouched.score, None);
}

#[test]
fn rescore_recomputes_changed_scores_only() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Alpha");
    ProgressLogic::start(&mut pool, id, GameKind::Game3Memory).unwrap();
    ProgressLogic::submit(
        &mut pool,
        id,
        GameKind::Game3Memory,
        r#"{"answers":[{"round":1,"answer":"C"},{"round":2,"answer":"A"},{"round":3,"answer":"B"}]}"#,
    )
    .unwrap();

    // simulate a score written under an older answer key
    pool.conn
        .execute("UPDATE game_records SET score = 0 WHERE team_id = ?1 AND game_kind = 'game3_memory'", [id])
        .unwrap();

    let report = AdminLogic::rescore(&mut pool, &auth(), "test_session", GameKind::Game3Memory).unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.unreadable, 0);

    let record = ProgressLogic::get(&pool, id, GameKind::Game3Memory).unwrap();
    assert_eq!(record.score, Some(2.0));

    let again = AdminLogic::rescore(&mut pool, &auth(), "test_session", GameKind::Game3Memory).unwrap();
    assert_eq!(again.updated, 0);
}

#[test]
fn state_changes_are_written_to_the_log() {
    let mut pool = memory_pool();
    let id = register(&mut pool, "Alpha");
    ProgressLogic::start(&mut pool, id, GameKind::TechCheck).unwrap();
    SessionLogic::switch_active(&mut pool, "morning_session").unwrap();

    let ops: Vec<String> = pool
        .conn
        .prepare("SELECT operation FROM log ORDER BY id")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    for op in ["migration_applied", "init", "register", "start", "session_switch"] {
        assert!(ops.iter().any(|o| o == op), "missing log entry {op}: {ops:?}");
    }
}

#[test]
fn clinical_arms_are_opposite_and_balanced() {
    let mut pool = memory_pool();
    let names = ["Aspirin", "Herceptin", "Insulin", "Ibuprofen", "Cortison", "Penicillin"];
    for name in names {
        register(&mut pool, name);
    }

    let teams = AdminLogic::list_teams(&pool, "test_session").unwrap();
    for team in &teams {
        let parent = team.parent_treatment.expect("parent arm");
        assert_eq!(team.child_treatment, Some(parent.other()));
    }

    let placebo = teams
        .iter()
        .filter(|t| t.parent_treatment == Some(Treatment::Placebo))
        .count();
    assert_eq!(placebo, names.len() / 2);
}

#[test]
fn clinical_arms_follow_registration_order() {
    let arms = || {
        let mut pool = memory_pool();
        ["Aspirin", "Herceptin", "Insulin"]
            .into_iter()
            .map(|name| {
                TeamLogic::register_by_name(&mut pool, OPEN, name, &Members::default())
                    .unwrap()
                    .parent_treatment
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(arms(), arms());
}
