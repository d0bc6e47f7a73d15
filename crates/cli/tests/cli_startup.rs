use std::io::Write;
use std::net::TcpListener;
use std::process::Output;

use tempfile::NamedTempFile;

/// A base URL nothing is listening on.
fn unbound_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Run the binary with the given config path and arguments.
async fn run_kanban(config_path: &std::path::Path, args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_kanban"))
        .env("KANBAN_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .args(args)
        .output()
        .await
        .expect("Failed to run kanban")
}

#[tokio::test]
async fn test_missing_config_fails() {
    let output = run_kanban(std::path::Path::new("/nonexistent/kanban.toml"), &["games"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_invalid_config_fails_validation() {
    let config = write_config(
        r#"
[backend]
url = "ftp://tracker.local"
"#,
    );

    let output = run_kanban(config.path(), &["games"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Configuration validation failed"),
        "stderr: {}",
        stderr
    );
}

#[tokio::test]
async fn test_unreachable_backend_exits_nonzero_without_panic() {
    let config = write_config(&format!(
        r#"
[backend]
url = "{}"
timeout_secs = 2
"#,
        unbound_url()
    ));

    let output = run_kanban(config.path(), &["board", "--search", "login"]).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load board"), "stderr: {}", stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
}

#[tokio::test]
async fn test_config_flag_overrides_env() {
    let config = write_config(
        r#"
[backend]
url = "http://127.0.0.1:1"
timeout_secs = 0
"#,
    );

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_kanban"))
        .env("KANBAN_CONFIG", "/nonexistent/kanban.toml")
        .env("RUST_LOG", "error")
        .arg("--config")
        .arg(config.path())
        .arg("games")
        .output()
        .await
        .unwrap();

    // Reaching validation proves the flag's file was loaded.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Configuration validation failed"),
        "stderr: {}",
        stderr
    );
}
