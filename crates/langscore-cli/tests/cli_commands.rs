use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn write_fixtures(dir: &Path) {
    std::fs::create_dir_all(dir.join("suites")).unwrap();
    std::fs::write(
        dir.join("suites/agreement.json"),
        r#"{
  "meta": {"name": "agreement", "metric": "sum"},
  "predictions": [{"type": "formula", "formula": "(2;%match%) < (2;%mismatch%)"}],
  "items": [
    {"item_number": 1, "conditions": [
      {"condition_name": "match", "regions": [
        {"region_number": 1, "content": "the dog"},
        {"region_number": 2, "content": "runs"}]},
      {"condition_name": "mismatch", "regions": [
        {"region_number": 1, "content": "the dog"},
        {"region_number": 2, "content": "run"}]}
    ]}
  ]
}"#,
    )
    .unwrap();
    std::fs::write(dir.join("corpus.txt"), "the dog runs\nthe dogs run\n").unwrap();
    std::fs::write(
        dir.join("langscore.yaml"),
        r#"configVersion: 1
suite_dir: suites
benchmarks:
  - id: syntaxgym-agreement
    kind: syntaxgym
    suites: [agreement]
models:
  - id: bigram-test
    kind: bigram
    corpus: corpus.txt
"#,
    )
    .unwrap();
}

fn langscore() -> Command {
    let mut cmd = Command::cargo_bin("langscore").unwrap();
    cmd.env("LANGSCORE_LOG", "warn");
    cmd
}

fn add_user(db: &Path) {
    langscore()
        .args(["db", "add-user", "--id", "1", "--email", "owner@example.com", "--db"])
        .arg(db)
        .assert()
        .success();
}

fn score(dir: &Path, db: &Path, models: &[&str], benchmarks: &[&str]) -> assert_cmd::assert::Assert {
    langscore()
        .arg("score")
        .arg("--config")
        .arg(dir.join("langscore.yaml"))
        .arg("--db")
        .arg(db)
        .args(["--job-id", "7", "--user-id", "1", "--specified-only", "--models"])
        .args(models)
        .arg("--benchmarks")
        .args(benchmarks)
        .assert()
}

#[test]
fn score_then_list_scores() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let db = dir.path().join("out/scores.db");
    add_user(&db);

    score(dir.path(), &db, &["bigram-test"], &["syntaxgym-agreement"])
        .success()
        .stderr(predicate::str::contains("1 scored"));

    langscore()
        .args(["scores", "--format", "json", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"bigram-test\""))
        .stdout(predicate::str::contains("\"score_ceiled\": 1.0"));
}

#[test]
fn capability_errors_are_stored_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let db = dir.path().join("scores.db");
    add_user(&db);

    score(dir.path(), &db, &["randomembedding-16"], &["syntaxgym-agreement"])
        .success()
        .stderr(predicate::str::contains("NotImplementedError"));

    let conn = rusqlite::Connection::open(&db).unwrap();
    let comment: String = conn
        .query_row("SELECT comment FROM scores", [], |r| r.get(0))
        .unwrap();
    assert!(comment.contains("embedding.rs"));
}

#[test]
fn unknown_benchmark_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let db = dir.path().join("scores.db");
    add_user(&db);

    score(dir.path(), &db, &["bigram-test"], &["does-not-exist"])
        .success()
        .stderr(predicate::str::contains("benchmark not found"));

    let conn = rusqlite::Connection::open(&db).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM scores", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn missing_user_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let db = dir.path().join("scores.db");

    score(dir.path(), &db, &["bigram-test"], &["syntaxgym-agreement"])
        .code(1)
        .stderr(predicate::str::contains("user 1 does not exist"));
}

#[test]
fn db_clear_empties_scores() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let db = dir.path().join("scores.db");
    add_user(&db);
    score(dir.path(), &db, &["bigram-test"], &["syntaxgym-agreement"]).success();

    langscore().args(["db", "clear", "--db"]).arg(&db).assert().success();
    langscore()
        .args(["scores", "--format", "json", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn region_totals_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langscore()
        .arg("region-totals")
        .arg("--config")
        .arg(dir.path().join("langscore.yaml"))
        .args(["--suite", "agreement", "--model", "bigram-test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"condition\": \"mismatch\""))
        .stdout(predicate::str::contains("\"item_number\": 1"));
}

#[test]
fn benchmarks_lists_config_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langscore()
        .arg("benchmarks")
        .arg("--config")
        .arg(dir.path().join("langscore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("syntaxgym-agreement"))
        .stdout(predicate::str::contains("[agreement]"));
}

#[test]
fn validate_reports_config_errors_with_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    langscore()
        .arg("validate")
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("error: config"));

    write_fixtures(dir.path());
    langscore()
        .args(["validate", "--strict", "--config"])
        .arg(dir.path().join("langscore.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 2 entries loaded"));
}

#[test]
fn validate_flags_unloadable_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    std::fs::write(
        dir.path().join("broken.yaml"),
        "suite_dir: suites\nbenchmarks:\n  - id: sg-missing\n    kind: syntaxgym\n    suites: [nope]\n",
    )
    .unwrap();

    langscore()
        .args(["validate", "--format", "json", "--config"])
        .arg(dir.path().join("broken.yaml"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("sg-missing"));
}

#[test]
fn init_writes_sample_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("langscore.yaml");
    langscore().arg("init").arg("--config").arg(&cfg).assert().success();
    assert!(std::fs::read_to_string(&cfg).unwrap().contains("syntaxgym2020"));
    langscore().arg("init").arg("--config").arg(&cfg).assert().code(2);
}
