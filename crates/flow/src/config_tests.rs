use super::*;
use tempfile::tempdir;

#[test]
fn absent_file_yields_built_in_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn present_file_overrides_only_what_it_sets() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".taskgraph")).unwrap();
    std::fs::write(
        dir.path().join(".taskgraph/config.toml"),
        "[defaults]\nliveness_window_secs = 120\npartition = \"gpu\"\n",
    )
    .unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.liveness_window_secs, 120);
    assert_eq!(config.partition.as_deref(), Some("gpu"));
    assert_eq!(config.virtualenv, None);
}

#[test]
fn constructor_argument_wins_over_config_file() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".taskgraph")).unwrap();
    std::fs::write(
        dir.path().join(".taskgraph/config.toml"),
        "[defaults]\nvirtualenv = \"/opt/venvs/a\"\n",
    )
    .unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(
        config.virtualenv_or(Some("/opt/venvs/explicit".to_string())),
        Some("/opt/venvs/explicit".to_string())
    );
    assert_eq!(config.virtualenv_or(None), Some("/opt/venvs/a".to_string()));
}
