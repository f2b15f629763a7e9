use super::*;
use std::path::PathBuf;

#[test]
fn fixed_defaults_present_without_ambient_env() {
    std::env::remove_var("CUDA_VISIBLE_DEVICES");
    std::env::remove_var("SLURM_CPUS_PER_TASK");
    std::env::remove_var("SLURM_MEM_PER_NODE");
    let env = compose_env(JobId::new(3), &PathBuf::from("/work/job_3"), &IndexMap::new());
    assert_eq!(env.get("JOB_ID").unwrap(), "3");
    assert_eq!(env.get("JOB_WORKAREA").unwrap(), "/work/job_3");
    assert_eq!(env.get("TF_CPP_MIN_LOG_LEVEL").unwrap(), "3");
    assert_eq!(env.get("CUDA_VISIBLE_ORDER").unwrap(), "PCI_BUS_ID");
    assert_eq!(env.get("CUDA_VISIBLE_DEVICES").unwrap(), "-1");
    assert_eq!(env.get("OMP_NUM_THREADS").unwrap(), "4");
    assert_eq!(env.get("SLURM_CPUS_PER_TASK").unwrap(), "4");
    assert_eq!(env.get("SLURM_MEM_PER_NODE").unwrap(), "2048");
}

#[test]
fn overlay_wins_over_fixed_defaults() {
    let mut overlay = IndexMap::new();
    overlay.insert("OMP_NUM_THREADS".to_string(), "16".to_string());
    overlay.insert("MY_FLAG".to_string(), "1".to_string());
    let env = compose_env(JobId::new(0), &PathBuf::from("/w"), &overlay);
    assert_eq!(env.get("OMP_NUM_THREADS").unwrap(), "16");
    assert_eq!(env.get("MY_FLAG").unwrap(), "1");
}
