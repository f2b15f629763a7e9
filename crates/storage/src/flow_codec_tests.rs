use super::*;
use tempfile::tempdir;

fn sample_flow() -> FlowFile {
    let mut datasets = IndexMap::new();
    datasets.insert(
        "input_dataset".to_string(),
        DatasetRecord {
            name: "input_dataset".to_string(),
            path: "/flow/inputs".to_string(),
            from_task: None,
        },
    );
    let mut tasks = IndexMap::new();
    tasks.insert(
        "0".to_string(),
        TaskRecord {
            task_id: 0,
            name: "t1".to_string(),
            image: None,
            command: "run --in %IN --out %OUT".to_string(),
            input_data: "input_dataset".to_string(),
            outputs: IndexMap::from([("OUT".to_string(), "output.json".to_string())]),
            partition: "cpu".to_string(),
            secondary_data: IndexMap::new(),
            binds: IndexMap::new(),
            envs: IndexMap::new(),
            next: vec![],
            prev: vec![],
        },
    );
    FlowFile {
        path: "/flow".to_string(),
        extra_params: ExtraParams {
            virtualenv: Some("/opt/venv".to_string()),
            partition_for_trigger: None,
        },
        datasets,
        images: IndexMap::new(),
        tasks,
    }
}

#[test]
fn dump_then_load_round_trips_exactly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flow.json");
    let flow = sample_flow();
    dump(&flow, &path).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(loaded, flow);
}

#[test]
fn hash_is_stable_across_repeated_serialization() {
    let flow = sample_flow();
    assert_eq!(flow.hash().unwrap(), flow.hash().unwrap());
}

#[test]
fn hash_on_disk_matches_in_memory_hash_after_dump() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flow.json");
    let flow = sample_flow();
    dump(&flow, &path).unwrap();
    assert_eq!(hash_on_disk(&path).unwrap(), flow.hash().unwrap());
}

#[test]
fn differing_flows_hash_differently() {
    let mut other = sample_flow();
    other.tasks.get_mut("0").unwrap().command.push_str(" --extra");
    assert_ne!(sample_flow().hash().unwrap(), other.hash().unwrap());
}

#[test]
fn load_of_missing_file_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");
    assert!(load(&path).is_err());
}
