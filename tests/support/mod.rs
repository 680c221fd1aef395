#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch tree holding registrant directories, module files, and manifests.
pub struct Fixture {
    root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("tests require a temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create (if needed) and return `root/<rel>` as a directory.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.root.path().join(rel);
        fs::create_dir_all(&path).expect("failed to create fixture dir");
        path
    }

    /// Write a module file under `base`, creating parent dirs.
    pub fn module(&self, base: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = base.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create module dir");
        }
        fs::write(&path, contents).expect("failed to write module file");
        path
    }

    pub fn manifest(&self, payloads: &[Value]) -> PathBuf {
        let path = self.root.path().join("manifest.json");
        let body = json!({
            "schema_version": "nsloader_registrations_v1",
            "registrations": payloads,
        });
        fs::write(&path, serde_json::to_vec_pretty(&body).expect("serializable"))
            .expect("failed to write manifest");
        path
    }
}

/// Registration payload mapping each prefix to a directory.
pub fn payload<P: AsRef<Path>>(name: &str, mappings: &[(&str, P)]) -> Value {
    let mut map = Map::new();
    for (prefix, dir) in mappings {
        map.insert(
            prefix.to_string(),
            Value::String(dir.as_ref().display().to_string()),
        );
    }
    json!({ "name": name, "mappings": map })
}

pub fn nsloader() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nsloader"));
    cmd.env_remove("NSLOADER_SEPARATOR")
        .env_remove("NSLOADER_EXTENSION")
        .env_remove("NSLOADER_REGISTRATIONS")
        .env_remove("NSLOADER_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
