use super::*;

#[tokio::test]
async fn run_with_timeout_returns_output_on_success() {
    let cmd = Command::new("true");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "true")
        .await
        .unwrap();
    assert!(output.status.success());
}

#[tokio::test]
async fn run_with_timeout_reports_timeout() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let result = run_with_timeout(cmd, Duration::from_millis(50), "sleep").await;
    let err = result.unwrap_err();
    assert!(err.contains("timed out"), "{err}");
}

#[tokio::test]
async fn run_with_timeout_reports_missing_binary() {
    let cmd = Command::new("definitely-not-a-real-binary-xyz");
    let result = run_with_timeout(cmd, Duration::from_secs(5), "missing").await;
    assert!(result.is_err());
}
