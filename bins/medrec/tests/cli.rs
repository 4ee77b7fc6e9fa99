use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn medrec(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medrec").unwrap();
    cmd.current_dir(dir)
        .env_remove("MEDREC_API_URL")
        .env_remove("MEDREC_TIMEOUT_SECS")
        .env_remove("MEDREC_SESSION_TTL_SECS")
        .env_remove("MEDREC_PASSWORD")
        .env_remove("RUST_LOG")
        .env("MEDREC_STORAGE", dir.join("storage.json"))
        .env("NO_COLOR", "1");
    cmd
}

async fn run(cmd: Command) -> std::process::Output {
    let mut cmd = cmd;
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    medrec(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("records"))
        .stdout(predicate::str::contains("prescriptions"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_whoami_without_session() {
    let dir = TempDir::new().unwrap();
    medrec(dir.path())
        .args(["--format", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""authenticated": false"#));
}

#[test]
fn test_invalid_json_argument_is_validation_error() {
    let dir = TempDir::new().unwrap();
    medrec(dir.path())
        .args(["--api-url", "http://127.0.0.1:9", "records", "create", "{not json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_unreachable_backend_reports_network_error() {
    let dir = TempDir::new().unwrap();
    medrec(dir.path())
        .args(["--api-url", "http://127.0.0.1:9", "records", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Network error"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    medrec(dir.path())
        .args(["--config", "does-not-exist.toml", "whoami"])
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list_records_with_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "role": "doctor",
            "organization": "General Hospital",
            "token": "cli-token"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/records"))
        .and(header("authorization", "Bearer cli-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"RecordID": "r1", "Name": "Jane Doe"},
            {"RecordID": "r2", "Name": "John Roe"}
        ])))
        .mount(&server)
        .await;

    let mut login = medrec(dir.path());
    login.args([
        "--api-url",
        &server.uri(),
        "login",
        "--username",
        "drsmith",
        "--password",
        "secret",
    ]);
    let output = run(login).await;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Logged in as drsmith"));

    let mut whoami = medrec(dir.path());
    whoami.args(["--api-url", &server.uri(), "--format", "json", "whoami"]);
    let output = run(whoami).await;
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["authenticated"], true);
    assert_eq!(info["role"], "doctor");

    let mut list = medrec(dir.path());
    list.args(["--api-url", &server.uri(), "--format", "json", "records", "list"]);
    let output = run(list).await;
    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[0]["RecordID"], "r1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_login_prints_backend_message() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let mut login = medrec(dir.path());
    login.args([
        "--api-url",
        &server.uri(),
        "login",
        "--username",
        "drsmith",
        "--password",
        "wrong",
    ]);
    let output = run(login).await;
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_prescription_refetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("DELETE"))
        .and(path("/prescription/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prescription/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "p2"}])))
        .expect(1)
        .mount(&server)
        .await;

    let mut delete = medrec(dir.path());
    delete.args([
        "--api-url",
        &server.uri(),
        "--format",
        "json",
        "prescriptions",
        "delete",
        "p1",
    ]);
    let output = run(delete).await;
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["deleted"], "p1");
    assert_eq!(body["total"], 1);
}
