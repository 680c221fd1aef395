//! JSON-backed registration sources.
//!
//! A manifest is either a bare array of payloads or an envelope object
//! checked against `schema/registrations.schema.json`. Only the envelope is
//! schema-checked: payloads inside stay untrusted and go through the
//! Validator like any other host-supplied registration.

use crate::host::RegistrationSource;
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_SCHEMA_VERSION: &str = "nsloader_registrations_v1";

const MANIFEST_SCHEMA: &str = include_str!("../schema/registrations.schema.json");

/// Compile the embedded envelope schema.
fn compile_manifest_schema() -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(MANIFEST_SCHEMA).context("parsing embedded manifest schema")?;
    // ValidationError borrows the schema, so flatten it to text before it
    // leaves this function.
    JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling manifest schema: {err}"))
}

/// Extract payloads from manifest text.
pub fn parse_manifest(input: &str) -> Result<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("registration manifest is empty");
    }
    let value: Value =
        serde_json::from_str(trimmed).context("registration manifest is not valid JSON")?;

    match value {
        Value::Array(payloads) => Ok(payloads),
        Value::Object(_) => {
            let schema = compile_manifest_schema()?;
            if let Err(errors) = schema.validate(&value) {
                let details = errors
                    .map(|err| err.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                bail!("registration manifest failed schema validation:\n{details}");
            }
            match value.get("registrations") {
                Some(Value::Array(payloads)) => Ok(payloads.clone()),
                _ => bail!("registration manifest has no registrations array"),
            }
        }
        _ => bail!("unsupported manifest; expected an array of payloads or a manifest object"),
    }
}

/// Single JSON file holding every registrant's payload.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistrationSource for ManifestFile {
    fn supply_registrations(&mut self) -> Result<Vec<Value>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading manifest {}", self.path.display()))?;
        parse_manifest(&data).with_context(|| format!("loading manifest {}", self.path.display()))
    }
}

/// Directory where each `*.json` file is one registrant's payload.
///
/// Files are read in name order so admission order is reproducible.
#[derive(Debug, Clone)]
pub struct PayloadDirectory {
    dir: PathBuf,
}

impl PayloadDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn payload_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("reading payload dir {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl RegistrationSource for PayloadDirectory {
    fn supply_registrations(&mut self) -> Result<Vec<Value>> {
        let mut payloads = Vec::new();
        for file in self.payload_files()? {
            let data = fs::read_to_string(&file)
                .with_context(|| format!("reading payload {}", file.display()))?;
            let payload: Value = serde_json::from_str(&data)
                .with_context(|| format!("payload {} is not valid JSON", file.display()))?;
            payloads.push(payload);
        }
        Ok(payloads)
    }
}

/// Pick a source for `path`: a directory of payloads or a manifest file.
pub fn open_source(path: &Path) -> Result<Box<dyn RegistrationSource>> {
    if path.is_dir() {
        Ok(Box::new(PayloadDirectory::new(path)))
    } else if path.is_file() {
        Ok(Box::new(ManifestFile::new(path)))
    } else {
        bail!("registration source not found: {}", path.display())
    }
}
