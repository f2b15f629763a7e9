use super::*;
use indexmap::IndexMap;
use tempfile::tempdir;
use tg_core::clock::SystemClock;
use tg_flow::{Dataset, Session, SessionOptions, Task, TaskSpec};

fn options() -> SessionOptions {
    SessionOptions {
        virtualenv: None,
        partition_for_trigger: None,
        tg_binary: "tg".to_string(),
    }
}

/// Build a two-task flow (t1 -> t2) with two input files for t1 and run it
/// to the point where `flow.json` and t1's job set both exist.
fn setup(root: &std::path::Path) -> Session {
    let input_dir = root.join("external-raw");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join("a.json"), b"{}").unwrap();
    std::fs::write(input_dir.join("b.json"), b"{}").unwrap();

    let mut session = Session::new(root, options());
    session
        .register_dataset(Dataset::new("raw", &input_dir, None))
        .unwrap();

    let mut t1_outputs = IndexMap::new();
    t1_outputs.insert("OUT".to_string(), "out.json".to_string());
    session
        .add_task(TaskSpec {
            name: "t1".to_string(),
            command: "run %IN %OUT".to_string(),
            input_data: "raw".into(),
            image: None,
            secondary_data: IndexMap::new(),
            outputs: t1_outputs,
            partition: "cpu".to_string(),
            binds: IndexMap::new(),
            envs: IndexMap::new(),
        })
        .unwrap();

    let mut t2_outputs = IndexMap::new();
    t2_outputs.insert("OUT".to_string(), "final.json".to_string());
    session
        .add_task(TaskSpec {
            name: "t2".to_string(),
            command: "run %IN %OUT".to_string(),
            input_data: "t1.out.json".into(),
            image: None,
            secondary_data: IndexMap::new(),
            outputs: t2_outputs,
            partition: "cpu".to_string(),
            binds: IndexMap::new(),
            envs: IndexMap::new(),
        })
        .unwrap();

    session.run(true).unwrap();
    session
}

fn fetch(session: &mut Session, task_name: &str) -> Task {
    session
        .context()
        .task(task_name)
        .cloned()
        .expect("task registered by setup()")
}

fn mark_all_jobs(task: &Task, state: State) {
    let clock = SystemClock;
    for job_id in task.job_ids().unwrap() {
        tg_storage::status_store::set_state(&task.job_status_path(job_id), state, &clock).unwrap();
    }
}

#[tokio::test]
async fn task_init_submits_dry_run_without_error() {
    let dir = tempdir().unwrap();
    let mut session = setup(dir.path());
    let t1_id = fetch(&mut session, "t1").task_id();

    run_task_init(dir.path(), t1_id, options(), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn task_next_classifies_completed_and_advances_successor() {
    let dir = tempdir().unwrap();
    let mut session = setup(dir.path());
    let t1 = fetch(&mut session, "t1");
    mark_all_jobs(&t1, State::Completed);

    let final_state = run_task_next(dir.path(), t1.task_id(), options(), true)
        .await
        .unwrap();
    assert_eq!(final_state, State::Completed);

    // t2's subtree must have been materialized by the cascade.
    assert!(dir.path().join("tasks/t2/jobs/status").exists());
}

#[tokio::test]
async fn task_next_cascades_canceled_on_failure_past_tolerance() {
    let dir = tempdir().unwrap();
    let mut session = setup(dir.path());
    let t1 = fetch(&mut session, "t1");
    mark_all_jobs(&t1, State::Failed);

    let final_state = run_task_next(dir.path(), t1.task_id(), options(), true)
        .await
        .unwrap();
    assert_eq!(final_state, State::Failed);

    let t2 = fetch(&mut session, "t2");
    let t2_status = t2.status().unwrap();
    assert_eq!(t2_status.state, State::Canceled);
}

#[test]
fn classify_all_completed_is_completed() {
    assert_eq!(classify(2, 2, 0), State::Completed);
}

#[test]
fn classify_under_tolerance_is_finalized() {
    assert_eq!(classify(100, 95, 5), State::Finalized);
}

#[test]
fn classify_over_tolerance_is_failed() {
    assert_eq!(classify(10, 8, 2), State::Failed);
}

#[test]
fn classify_empty_job_set_is_completed() {
    assert_eq!(classify(0, 0, 0), State::Completed);
}
