use super::*;
use tempfile::tempdir;

#[test]
fn unknown_option_is_rejected() {
    let dir = tempdir().unwrap();
    let result = SbatchScript::new(
        dir.path().join("script.sh"),
        [("NOT_A_REAL_OPTION".to_string(), Some("x".to_string()))],
        None,
    );
    assert!(matches!(result, Err(SchedulerError::InvalidSubmitOption(_))));
}

#[test]
fn known_options_render_as_sbatch_directives() {
    let dir = tempdir().unwrap();
    let script = SbatchScript::new(
        dir.path().join("script.sh"),
        [
            ("JOB_NAME".to_string(), Some("init-3".to_string())),
            ("PARTITION".to_string(), Some("cpu-large".to_string())),
            ("EXCLUSIVE".to_string(), None),
        ],
        Some("/opt/venv"),
    )
    .unwrap();
    let rendered = script.render();
    assert!(rendered.starts_with("#!/bin/bash\n"));
    assert!(rendered.contains("#SBATCH --job-name=init-3"));
    assert!(rendered.contains("#SBATCH --partition=cpu-large"));
    assert!(rendered.contains("#SBATCH --exclusive"));
    assert!(rendered.contains("source /opt/venv/bin/activate"));
}

#[test]
fn boolean_option_ignores_a_supplied_value() {
    let dir = tempdir().unwrap();
    let script = SbatchScript::new(
        dir.path().join("script.sh"),
        [("EXCLUSIVE".to_string(), Some("ignored".to_string()))],
        None,
    )
    .unwrap();
    assert!(script.render().contains("#SBATCH --exclusive\n"));
    assert!(!script.render().contains("ignored"));
}

#[test]
fn add_line_appends_after_directives_and_venv() {
    let dir = tempdir().unwrap();
    let mut script = SbatchScript::new(dir.path().join("script.sh"), [], Some("/venv")).unwrap();
    script.add_line("tg run job -i job.json -o work");
    let rendered = script.render();
    let venv_pos = rendered.find("source /venv").unwrap();
    let cmd_pos = rendered.find("tg run job").unwrap();
    assert!(venv_pos < cmd_pos);
}

#[test]
fn dump_writes_the_rendered_script_to_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.sh");
    let script = SbatchScript::new(path.clone(), [], None).unwrap();
    script.dump().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), script.render());
}

#[tokio::test]
async fn submit_returns_sentinel_on_dry_run_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.sh");
    let script = SbatchScript::new(path.clone(), [], None).unwrap();
    let job_id = script.submit(true).await.unwrap();
    assert_eq!(job_id, NO_JOB_ID);
    assert!(!path.exists());
}

#[test]
fn parse_job_id_reads_last_token() {
    assert_eq!(parse_job_id("Submitted batch job 482\n"), 482);
    assert_eq!(parse_job_id("garbage output"), NO_JOB_ID);
}
