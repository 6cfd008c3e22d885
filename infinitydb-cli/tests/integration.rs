use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `idb` in an isolated directory with no INFINITYDB_* variables.
fn idb_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("idb");
    cmd.current_dir(work_dir.path());
    cmd.env("NO_COLOR", "1");
    for var in [
        "INFINITYDB_URL",
        "INFINITYDB_DB",
        "INFINITYDB_USER",
        "INFINITYDB_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ============================================================================
// Argument handling
// ============================================================================

#[test]
fn version_flag() {
    cargo_bin_cmd!("idb")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("idb"));
}

#[test]
fn help_flag() {
    cargo_bin_cmd!("idb")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("InfinityDB REST client"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("next"))
        .stdout(predicate::str::contains("commit"));
}

#[test]
fn verbose_quiet_conflict() {
    cargo_bin_cmd!("idb")
        .args(["--verbose", "--quiet", "head"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn missing_url_errors() {
    let tmp = TempDir::new().unwrap();
    idb_cmd(&tmp)
        .arg("head")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server_url is required"));
}

#[test]
fn invalid_item_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    idb_cmd(&tmp)
        .args(["--url", "http://127.0.0.1:9", "--db", "x", "exists", "Docs @@"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid Item"));
}

#[test]
fn config_file_in_working_directory() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("infinitydb.toml"),
        "server_url = \"http://127.0.0.1:9\"\n",
    )
    .unwrap();
    // the URL comes from the file; the database is still missing
    idb_cmd(&tmp)
        .arg("commit")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no database selected"));
}

// ============================================================================
// Against a mock server
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn get_prints_extended_text() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/demo/readonly/Docs"))
        .and(wiremock::matchers::query_param("action", "as-json"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_string(r#"{"_Docs": {"intro": null}}"#),
        )
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let uri = server.uri();
    let mut cmd = idb_cmd(&tmp);
    cmd.args(["--url", uri.as_str(), "--db", "demo/readonly", "get", "Docs"]);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Docs : {"))
        .stdout(predicate::str::contains("\"intro\" : null"));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_missing_is_not_found() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let uri = server.uri();
    let mut cmd = idb_cmd(&tmp);
    cmd.args(["--url", uri.as_str(), "--db", "demo/readonly", "get", "Docs"]);
    run(cmd)
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nothing under 'Docs'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn next_iterates_through_batch() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "next-item"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\""))
        .expect(1)
        .mount(&server)
        .await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "as-items-batch"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_string("Docs \"b\"\nDocs \"c\"\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let uri = server.uri();
    let mut cmd = idb_cmd(&tmp);
    cmd.args([
        "--url",
        uri.as_str(),
        "--db",
        "demo/readonly",
        "next",
        "Docs \"a\"",
        "-n",
        "5",
    ]);
    run(cmd)
        .await
        .assert()
        .success()
        .stdout("Docs \"b\"\nDocs \"c\"\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn exists_sets_exit_code() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::query_param("action", "exists"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let uri = server.uri();
    let mut cmd = idb_cmd(&tmp);
    cmd.args(["--url", uri.as_str(), "--db", "d", "exists", "Docs \"a\""]);
    run(cmd).await.assert().code(1).stdout("false\n");
}
