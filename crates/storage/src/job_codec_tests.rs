use super::*;
use indexmap::indexmap;
use tempfile::tempdir;

fn sample() -> JobRecord {
    JobRecord {
        job_id: 3,
        task_name: "preprocess".to_string(),
        command: "run --job %IN --out %OUT".to_string(),
        input_file: "/data/in/job_3.json".to_string(),
        input_dataset: DatasetRecord {
            name: "raw".to_string(),
            path: "/data/in".to_string(),
            from_task: None,
        },
        image: Some(ImageRecord {
            name: "torch".to_string(),
            path: "/images/torch.sif".to_string(),
        }),
        secondary_data: indexmap! {
            "MODEL".to_string() => DatasetRecord {
                name: "weights".to_string(),
                path: "/data/weights".to_string(),
                from_task: None,
            },
        },
        outputs: indexmap! {
            "OUT".to_string() => OutputSpec {
                filename_template: "result.json".to_string(),
                dataset: DatasetRecord {
                    name: "processed".to_string(),
                    path: "/data/out".to_string(),
                    from_task: Some("preprocess".to_string()),
                },
            },
        },
        binds: IndexMap::new(),
        envs: indexmap! { "FOO".to_string() => "bar".to_string() },
    }
}

#[test]
fn round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("job_3.json");
    let job = sample();
    dump(&job, &path).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(job, loaded);
}

#[test]
fn load_missing_file_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does_not_exist.json");
    assert!(load(&path).is_err());
}
