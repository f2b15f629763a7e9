// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container invocation composition (§4.G step 6, §6).
//!
//! Hard-coded to Singularity syntax, per the Design Notes: parameterizing
//! the runtime (Apptainer / Docker / podman) is an obvious extension but out
//! of scope here.

/// Compose the outer shell command a job runner executes.
///
/// When `image_path` is set: `singularity exec --nv --writable-tmpfs
/// {--bind src:dst}* <image> bash <entrypoint>`. Otherwise: `bash
/// <entrypoint>`.
pub fn compose_command(
    image_path: Option<&str>,
    binds: &[(String, String)],
    entrypoint: &str,
) -> String {
    match image_path {
        Some(image) => {
            let mut parts = vec![
                "singularity".to_string(),
                "exec".to_string(),
                "--nv".to_string(),
                "--writable-tmpfs".to_string(),
            ];
            for (src, dst) in binds {
                parts.push("--bind".to_string());
                parts.push(format!("{src}:{dst}"));
            }
            parts.push(image.to_string());
            parts.push("bash".to_string());
            parts.push(entrypoint.to_string());
            parts.join(" ")
        }
        None => format!("bash {entrypoint}"),
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
