use super::*;

#[test]
fn no_image_just_runs_bash() {
    assert_eq!(
        compose_command(None, &[], "entrypoint.sh"),
        "bash entrypoint.sh"
    );
}

#[test]
fn image_wraps_with_singularity_and_binds() {
    let binds = vec![
        ("/scratch".to_string(), "/scratch".to_string()),
        ("/data".to_string(), "/mnt/data".to_string()),
    ];
    let cmd = compose_command(Some("/images/app.sif"), &binds, "entrypoint.sh");
    assert_eq!(
        cmd,
        "singularity exec --nv --writable-tmpfs --bind /scratch:/scratch --bind /data:/mnt/data /images/app.sif bash entrypoint.sh"
    );
}

#[test]
fn image_with_no_binds_still_wraps() {
    let cmd = compose_command(Some("/images/app.sif"), &[], "entrypoint.sh");
    assert_eq!(
        cmd,
        "singularity exec --nv --writable-tmpfs /images/app.sif bash entrypoint.sh"
    );
}
