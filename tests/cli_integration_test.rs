// CLI binary integration tests
//
// These tests execute the actual binary and verify end-to-end behavior,
// including argument parsing, config loading, exit codes and JSON output.
// Backends are mocked with a synchronous mockito server so the spawned
// process can reach them.

use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ai-sentinel");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn parse_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document")
}

fn judge_reply(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "created": chrono::Utc::now().timestamp(),
        "model": "judge",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 320, "completion_tokens": 40, "total_tokens": 360}
    })
    .to_string()
}

#[test]
fn test_cli_no_args_shows_help() {
    cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("ai-sentinel"));
}

#[test]
fn test_cli_help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--check-credentials"))
        .stdout(predicate::str::contains("--text-file"));
}

#[test]
fn test_cli_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_invalid_timeout() {
    cmd()
        .args(["--timeout", "0", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Timeout must be > 0"));
}

#[test]
fn test_cli_timeout_out_of_range() {
    cmd()
        .args(["--provider", "ollama", "--model", "llama3.1", "--timeout", "1e20"])
        .arg("--describe")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_cli_unknown_provider_value() {
    cmd()
        .args(["--provider", "bedrock", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_cli_text_and_text_file_conflict() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    cmd()
        .args(["--text", "hi", "--text-file"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_cli_nonexistent_config_file() {
    cmd()
        .args(["--config-file", "/nonexistent/sentinel.toml", "--text", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn test_cli_missing_provider_is_configuration_error() {
    let output = cmd().args(["-q", "--text", "hi"]).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json = parse_stdout(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], "CONFIGURATION_ERROR");
    assert_eq!(json["metadata"]["provider"], "unknown");
}

#[test]
fn test_cli_describe_hides_credentials() {
    let output = cmd()
        .args([
            "-q",
            "--provider",
            "openai",
            "--base-url",
            "http://llm.internal:8000/v1",
            "--model",
            "judge",
            "--api-key",
            "sk-very-secret",
            "--timeout",
            "12.5",
            "--describe",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("sk-very-secret"));

    let json = parse_stdout(&output);
    assert_eq!(json["status"], "success");
    assert_eq!(json["client"]["provider"], "openai");
    assert_eq!(json["client"]["model"], "judge");
    assert_eq!(json["client"]["timeout_secs"], 12.5);
    assert_eq!(
        json["client"]["extra_config"]["base_url"],
        "http://llm.internal:8000/v1"
    );
}

#[test]
fn test_cli_provider_inferred_from_base_url() {
    let output = cmd()
        .args([
            "-q",
            "--base-url",
            "http://localhost:11434",
            "--model",
            "llama3.1",
            "--describe",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(parse_stdout(&output)["client"]["provider"], "ollama");
}

#[test]
fn test_cli_check_credentials_valid() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/models")
        .match_header("authorization", "Bearer sk-good")
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .create();

    let output = cmd()
        .args(["-q", "--provider", "openai", "--model", "judge", "--api-key", "sk-good"])
        .arg("--base-url")
        .arg(format!("{}/v1", server.url()))
        .arg("--check-credentials")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = parse_stdout(&output);
    assert_eq!(json["credentials_valid"], true);
    mock.assert();
}

#[test]
fn test_cli_check_credentials_rejected() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/v1/models").with_status(401).create();

    let output = cmd()
        .args(["-q", "--provider", "vllm", "--model", "judge", "--api-key", "sk-bad"])
        .arg("--base-url")
        .arg(format!("{}/v1", server.url()))
        .arg("--check-credentials")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(5));
    let json = parse_stdout(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["credentials_valid"], false);
    assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
}

#[test]
fn test_cli_assesses_inline_text() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "judge",
            "temperature": 0.0,
            "response_format": {"type": "json_schema"}
        })))
        .with_status(200)
        .with_body(judge_reply(
            r#"{"is_toxic": true, "confidence": 0.92, "categories": ["threats"], "reason": "explicit threat of violence", "score": "low"}"#,
        ))
        .create();

    let output = cmd()
        .args(["-q", "--provider", "openai", "--model", "judge"])
        .arg("--base-url")
        .arg(format!("{}/v1", server.url()))
        .args(["--text", "I know where you live"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = parse_stdout(&output);
    assert_eq!(json["status"], "success");
    assert_eq!(json["verdict"]["is_toxic"], true);
    assert_eq!(json["verdict"]["score"], "high");
    assert_eq!(json["verdict"]["categories"], json!(["threats"]));
    assert_eq!(json["metadata"]["provider"], "openai");
    assert_eq!(json["metadata"]["usage"]["total_tokens"], 360);
    assert_eq!(json["metadata"]["finish_reason"], "stop");
    mock.assert();
}

#[test]
fn test_cli_config_file_with_text_file_and_output_file() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({"model": "llama3.1", "stream": false})))
        .with_status(200)
        .with_body(
            json!({
                "model": "llama3.1",
                "created_at": chrono::Utc::now().to_rfc3339(),
                "message": {
                    "role": "assistant",
                    "content": "{\"is_toxic\": false, \"confidence\": 0.05, \"categories\": [], \"reason\": \"friendly feedback\"}"
                },
                "done": true,
                "done_reason": "stop"
            })
            .to_string(),
        )
        .create();

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sentinel.toml");
    fs::write(
        &config_path,
        format!(
            "[provider]\ntype = \"ollama\"\nmodel = \"llama3.1\"\nbase_url = \"{}\"\n",
            server.url()
        ),
    )
    .unwrap();
    let text_path = temp_dir.path().join("comment.txt");
    fs::write(&text_path, "Nice work on the release, thanks!").unwrap();
    let output_path = temp_dir.path().join("out/verdict.json");

    cmd()
        .arg("-q")
        .arg("--config-file")
        .arg(&config_path)
        .arg("--text-file")
        .arg(&text_path)
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(json["verdict"]["is_toxic"], false);
    assert_eq!(json["verdict"]["score"], "low");
    assert_eq!(json["metadata"]["provider"], "ollama");
    assert!(json["metadata"].get("usage").is_none());
    mock.assert();
}

#[test]
fn test_cli_malformed_judge_output_exit_code() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(judge_reply("I think this text is fine."))
        .create();

    let output = cmd()
        .args(["-q", "--provider", "openai", "--model", "judge"])
        .arg("--base-url")
        .arg(format!("{}/v1", server.url()))
        .args(["--text", "hello"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    let json = parse_stdout(&output);
    assert_eq!(json["error"]["code"], "MALFORMED_JUDGE_OUTPUT");
    assert_eq!(json["metadata"]["model"], "judge");
}

#[test]
fn test_cli_backend_failure_exit_code() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create();

    let output = cmd()
        .args(["-q", "--provider", "openai", "--model", "judge"])
        .arg("--base-url")
        .arg(format!("{}/v1", server.url()))
        .args(["--text", "hello"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let json = parse_stdout(&output);
    assert_eq!(json["error"]["code"], "GENERATION_FAILED");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("overloaded"));
}

#[test]
fn test_cli_empty_text_is_invalid_input() {
    let output = cmd()
        .args([
            "-q",
            "--provider",
            "ollama",
            "--model",
            "llama3.1",
            "--text",
            "",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(parse_stdout(&output)["error"]["code"], "INVALID_INPUT");
}
