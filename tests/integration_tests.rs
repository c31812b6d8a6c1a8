use calamine::{Reader, Xlsx, open_workbook};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{MALFORMED_TCX, TWO_LAPS_TCX, setup_test_db, tcx, temp_dir, temp_out, write_file};

fn sheet_names(path: &std::path::Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("open workbook");
    workbook.sheet_names().to_vec()
}

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    tcx()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());
}

#[test]
fn test_ingest_single_file_writes_workbook_and_store() {
    let db_path = setup_test_db("cli_ingest_single");
    let out = temp_out("cli_ingest_single", "xlsx");
    let dir = temp_dir("cli_ingest_single");
    let file = write_file(&dir, "RunnerUp_2025-08-05-08-24-01_Running.tcx", TWO_LAPS_TCX);

    tcx()
        .args(["--db", &db_path, "ingest"])
        .arg(&file)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("2 laps / 4 trackpoints"));

    let names = sheet_names(&out);
    assert_eq!(names, vec!["2025-08-05_summary", "2025-08-05_detail"]);

    tcx()
        .args(["--db", &db_path, "summary"])
        .assert()
        .success()
        .stdout(contains("RunnerUp_2025-08-05-08-24-01_Running.tcx"))
        .stdout(contains("2.00 km"))
        .stdout(contains("Fastest lap"));
}

#[test]
fn test_ingest_twice_is_idempotent() {
    let db_path = setup_test_db("cli_ingest_twice");
    let out = temp_out("cli_ingest_twice", "xlsx");
    let dir = temp_dir("cli_ingest_twice");
    let file = write_file(&dir, "run.tcx", TWO_LAPS_TCX);

    for _ in 0..2 {
        tcx()
            .args(["--db", &db_path, "ingest"])
            .arg(&file)
            .arg("--output")
            .arg(&out)
            .assert()
            .success();
    }

    assert_eq!(sheet_names(&out).len(), 2);

    let store = tcxlog::db::DocumentStore::open(&db_path, std::time::Duration::from_secs(1))
        .expect("open store");
    assert_eq!(store.count("summary").expect("count"), 2);
    assert_eq!(store.count("detail").expect("count"), 4);
    store.close().expect("close");
}

#[test]
fn test_ingest_summary_mode_without_store() {
    let db_path = setup_test_db("cli_ingest_no_store");
    let out = temp_out("cli_ingest_no_store", "xlsx");
    let dir = temp_dir("cli_ingest_no_store");
    let file = write_file(&dir, "run.tcx", TWO_LAPS_TCX);

    tcx()
        .args(["--db", &db_path, "ingest", "--mode", "summary", "--no-store"])
        .arg(&file)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(sheet_names(&out), vec!["2025-08-05_summary"]);
    assert!(!std::path::Path::new(&db_path).exists());
}

#[test]
fn test_ingest_directory_continues_after_bad_file() {
    let db_path = setup_test_db("cli_ingest_dir");
    let out = temp_out("cli_ingest_dir", "xlsx");
    let dir = temp_dir("cli_ingest_dir");
    write_file(&dir, "a_good.TCX", TWO_LAPS_TCX);
    write_file(&dir, "b_broken.tcx", MALFORMED_TCX);
    write_file(&dir, "notes.txt", "not a workout");

    tcx()
        .args(["--db", &db_path, "ingest"])
        .arg(&dir)
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stdout(contains("a_good.TCX"))
        .stderr(contains("b_broken.tcx"));

    assert_eq!(sheet_names(&out).len(), 2);

    tcx()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("ingest_error").and(contains("(a_good.TCX)")));
}

#[test]
fn test_ingest_missing_input_fails() {
    let db_path = setup_test_db("cli_ingest_missing");

    tcx()
        .args(["--db", &db_path, "ingest", "/definitely/not/here.tcx"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn test_ingest_empty_directory_warns() {
    let db_path = setup_test_db("cli_ingest_empty_dir");
    let dir = temp_dir("cli_ingest_empty_dir");

    tcx()
        .args(["--db", &db_path, "ingest"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(contains("No .tcx files found"));
}

#[test]
fn test_detail_json_has_merge_info() {
    let db_path = setup_test_db("cli_detail_json");
    let out = temp_out("cli_detail_json", "xlsx");
    let dir = temp_dir("cli_detail_json");
    let file = write_file(&dir, "run.tcx", TWO_LAPS_TCX);

    tcx()
        .args(["--db", &db_path, "ingest"])
        .arg(&file)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let output = tcx()
        .args(["--db", &db_path, "detail", "--json", "--source", "run.tcx"])
        .output()
        .expect("run detail");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let rows = value["run.tcx"].as_array().expect("rows");
    // 4 points, sampled every 60 rows
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["_merge_info"]["LapNumber"]["show"], true);
    assert_eq!(rows[0]["AltitudeDelta_m"], 0.0);
}

#[test]
fn test_summary_on_empty_store() {
    let db_path = setup_test_db("cli_summary_empty");

    tcx()
        .args(["--db", &db_path, "summary"])
        .assert()
        .success()
        .stdout(contains("No summary records"));
}

#[test]
fn test_config_print_shows_database_override() {
    let db_path = setup_test_db("cli_config_print");

    tcx()
        .args(["--db", &db_path, "config", "--print"])
        .assert()
        .success()
        .stdout(contains(db_path.as_str()).and(contains("sample_interval")));
}
