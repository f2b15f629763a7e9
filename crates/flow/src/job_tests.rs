use super::*;
use tempfile::tempdir;

fn sample_job() -> Job {
    let mut secondary_data = IndexMap::new();
    secondary_data.insert(
        "MODEL".to_string(),
        Dataset::new("weights", "/data/weights", None),
    );
    let mut outputs = IndexMap::new();
    outputs.insert(
        "OUT".to_string(),
        OutputSpec {
            filename_template: "result.json".to_string(),
            dataset: Dataset::new("processed", "/data/out", Some("preprocess".to_string())),
        },
    );
    Job {
        job_id: JobId::new(7),
        task_name: "preprocess".to_string(),
        command: "run --job %IN --out %OUT --aux %MODEL".to_string(),
        input_file: PathBuf::from("/data/in/job_7.json"),
        input_dataset: Dataset::new("raw", "/data/in", None),
        image: Some(Image::new("torch", "/images/torch.sif")),
        secondary_data,
        outputs,
        binds: IndexMap::new(),
        envs: IndexMap::new(),
    }
}

#[test]
fn round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job_7.json");
    let job = sample_job();
    job.dump(&path).unwrap();
    let loaded = Job::load(&path).unwrap();
    assert_eq!(loaded.job_id, job.job_id);
    assert_eq!(loaded.task_name, job.task_name);
    assert_eq!(loaded.command, job.command);
    assert_eq!(loaded.input_dataset, job.input_dataset);
    assert_eq!(loaded.image, job.image);
    assert_eq!(loaded.secondary_data.len(), 1);
    assert_eq!(loaded.outputs.len(), 1);
}
