use predicates::str::contains;
use std::fs;

mod common;
use common::{SECRET, init_cli_db, setup_test_db, temp_out, zkt};

fn db_with_results(name: &str) -> String {
    let db_path = setup_test_db(name);
    init_cli_db(&db_path);

    zkt()
        .args(["--db", &db_path, "team", "register", "Herceptin"])
        .assert()
        .success();
    zkt()
        .args(["--db", &db_path, "game", "start", "Herceptin", "game2_perimeter"])
        .assert()
        .success();
    zkt()
        .args([
            "--db",
            &db_path,
            "game",
            "submit",
            "Herceptin",
            "game2_perimeter",
            "--payload",
            r#"{"parent_estimate":30,"child_estimate":24}"#,
        ])
        .assert()
        .success();

    db_path
}

#[test]
fn export_csv_has_one_row_per_game() {
    let db_path = db_with_results("export_csv");
    let out = temp_out("export_csv", "csv");

    zkt()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out, "--secret", SECRET,
        ])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("session_id,team_id,team_name"));
    assert!(header.ends_with("mean_abs_delta,parent_treatment,child_treatment"));
    assert_eq!(lines.count(), 6);
    assert!(content.contains("game2_perimeter,completed,89.29"));
}

#[test]
fn export_json_is_an_array_of_rows() {
    let db_path = db_with_results("export_json");
    let out = temp_out("export_json", "json");

    zkt()
        .args([
            "--db", &db_path, "export", "--format", "json", "--file", &out, "--secret", SECRET,
        ])
        .assert()
        .success();

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 6);

    let perimeter = rows
        .iter()
        .find(|r| r["game_kind"] == "game2_perimeter")
        .unwrap();
    assert_eq!(perimeter["score"], 89.29);
    assert_eq!(perimeter["child_delta"], -4.0);
    assert!(rows.iter().any(|r| r["status"] == "not_started" && r["score"].is_null()));
}

#[test]
fn export_xlsx_writes_a_workbook() {
    let db_path = db_with_results("export_xlsx");
    let out = temp_out("export_xlsx", "xlsx");

    zkt()
        .args([
            "--db", &db_path, "export", "--format", "xlsx", "--file", &out, "--secret", SECRET,
        ])
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    // xlsx is a zip container
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn export_of_another_session_only_contains_its_teams() {
    let db_path = db_with_results("export_other_session");
    let out = temp_out("export_other_session", "json");

    zkt()
        .args([
            "--db",
            &db_path,
            "export",
            "--format",
            "json",
            "--file",
            &out,
            "--session",
            "morning_session",
            "--secret",
            SECRET,
        ])
        .assert()
        .success()
        .stdout(contains("No teams registered"));

    assert!(!std::path::Path::new(&out).exists());
}

#[test]
fn export_requires_absolute_path_and_secret() {
    let db_path = db_with_results("export_errors");

    zkt()
        .args([
            "--db", &db_path, "export", "--file", "relative.csv", "--secret", SECRET,
        ])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));

    let out = temp_out("export_errors", "csv");
    zkt()
        .args(["--db", &db_path, "export", "--file", &out])
        .assert()
        .failure()
        .stderr(contains("Administrator secret rejected"));
}

#[test]
fn existing_file_needs_force() {
    let db_path = db_with_results("export_force");
    let out = temp_out("export_force", "csv");
    fs::write(&out, "old").unwrap();

    // no "y" on stdin → cancelled
    zkt()
        .args(["--db", &db_path, "export", "--file", &out, "--secret", SECRET])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("export cancelled"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "old");

    zkt()
        .args([
            "--db", &db_path, "export", "--file", &out, "--force", "--secret", SECRET,
        ])
        .assert()
        .success();
    assert!(fs::read_to_string(&out).unwrap().starts_with("session_id"));
}

#[test]
fn export_carries_clinical_arms_on_clinical_rows() {
    let db_path = db_with_results("export_arms");
    let out = temp_out("export_arms", "json");

    zkt()
        .args([
            "--db", &db_path, "export", "--format", "json", "--file", &out, "--secret", SECRET,
        ])
        .assert()
        .success();

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let rows = rows.as_array().unwrap();

    let clinical = rows
        .iter()
        .find(|r| r["game_kind"] == "game4_clinical")
        .unwrap();
    let parent = clinical["parent_treatment"].as_str().unwrap();
    let child = clinical["child_treatment"].as_str().unwrap();
    assert!(parent == "placebo" || parent == "molecule");
    assert_ne!(parent, child);

    let heights = rows
        .iter()
        .find(|r| r["game_kind"] == "game1_heights")
        .unwrap();
    assert!(heights["parent_treatment"].is_null());
}
