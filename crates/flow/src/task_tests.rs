use super::*;
use crate::context::Context;
use crate::dataset::Dataset;
use tempfile::tempdir;

fn base_spec(name: &str, outputs: IndexMap<String, String>) -> TaskSpec {
    TaskSpec {
        name: name.to_string(),
        command: "run --job %IN --out %OUT".to_string(),
        input_data: "raw".into(),
        image: None,
        secondary_data: IndexMap::new(),
        outputs,
        partition: "cpu".to_string(),
        binds: IndexMap::new(),
        envs: IndexMap::new(),
    }
}

#[test]
fn command_missing_in_placeholder_is_rejected() {
    let dir = tempdir().unwrap();
    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", dir.path(), None)).unwrap();
    let mut spec = base_spec("t1", IndexMap::new());
    spec.command = "run --out %OUT".to_string();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    spec.outputs = outputs;
    let err = Task::new(&mut ctx, dir.path(), spec).unwrap_err();
    assert!(matches!(err, FlowError::PlaceholderMissing { .. }));
}

#[test]
fn command_missing_output_key_is_rejected() {
    let dir = tempdir().unwrap();
    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", dir.path(), None)).unwrap();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    let mut spec = base_spec("t1", outputs);
    spec.command = "run --job %IN".to_string();
    let err = Task::new(&mut ctx, dir.path(), spec).unwrap_err();
    assert!(matches!(err, FlowError::PlaceholderMissing { .. }));
}

#[test]
fn update_jobs_is_deterministic_and_idempotent() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("inputs");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join("a.json"), b"{}").unwrap();
    std::fs::write(input_dir.join("b.json"), b"{}").unwrap();

    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", &input_dir, None)).unwrap();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    let task = Task::new(&mut ctx, dir.path(), base_spec("t1", outputs)).unwrap();

    let created = task.update_jobs().unwrap();
    assert_eq!(created, 2);
    assert!(task.has_jobs().unwrap());

    // idempotent: no new jobs on a second pass over the same inputs.
    let created_again = task.update_jobs().unwrap();
    assert_eq!(created_again, 0);

    let job_a = Job::load(&task.job_input_path(JobId::new(0))).unwrap();
    assert!(job_a.input_file.ends_with("a.json"));
    let job_b = Job::load(&task.job_input_path(JobId::new(1))).unwrap();
    assert!(job_b.input_file.ends_with("b.json"));
}

#[test]
fn mkdir_creates_full_subtree() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("inputs");
    std::fs::create_dir_all(&input_dir).unwrap();

    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", &input_dir, None)).unwrap();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    let task = Task::new(&mut ctx, dir.path(), base_spec("t1", outputs)).unwrap();
    task.mkdir().unwrap();

    assert!(task.jobs_inputs_dir().exists());
    assert!(task.jobs_status_dir().exists());
    assert!(task.works_dir().exists());
    assert!(task.scripts_dir().exists());
    assert!(task.logs_dir().exists());
}

#[tokio::test]
async fn submit_with_no_assigned_jobs_returns_sentinel() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("inputs");
    std::fs::create_dir_all(&input_dir).unwrap();

    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", &input_dir, None)).unwrap();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    let task = Task::new(&mut ctx, dir.path(), base_spec("t1", outputs)).unwrap();
    task.mkdir().unwrap();

    let id = task.submit(None, "tg", false).await.unwrap();
    assert_eq!(id, NO_JOB_ID);
}

#[tokio::test]
async fn submit_dry_run_returns_sentinel_without_writing_script() {
    let dir = tempdir().unwrap();
    let input_dir = dir.path().join("inputs");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join("a.json"), b"{}").unwrap();

    let mut ctx = Context::new();
    ctx.register_dataset(Dataset::new("raw", &input_dir, None)).unwrap();
    let mut outputs = IndexMap::new();
    outputs.insert("OUT".to_string(), "out.json".to_string());
    let task = Task::new(&mut ctx, dir.path(), base_spec("t1", outputs)).unwrap();
    task.mkdir().unwrap();

    let id = task.submit(None, "tg", true).await.unwrap();
    assert_eq!(id, NO_JOB_ID);
}
