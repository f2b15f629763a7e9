use super::*;
use tempfile::tempdir;

#[test]
fn acquire_creates_the_lock_sidecar() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("status.json");
    let guard = FileLockGuard::acquire(&target).unwrap();
    assert!(lock_path_for(&target).exists());
    drop(guard);
}

#[test]
fn lock_path_appends_dot_lock() {
    let path = Path::new("/flow/tasks/t/status/status.json");
    assert_eq!(
        lock_path_for(path),
        PathBuf::from("/flow/tasks/t/status/status.json.lock")
    );
}

#[test]
fn reacquiring_after_drop_succeeds() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("status.json");
    {
        let _guard = FileLockGuard::acquire(&target).unwrap();
    }
    // Guard was dropped, so the lock should be free again.
    let _guard2 = FileLockGuard::acquire(&target).unwrap();
}
