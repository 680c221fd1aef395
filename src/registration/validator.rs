//! Shape and content checks for untrusted registration payloads.
//!
//! Validation is all-or-nothing per payload: the first failing check yields a
//! single diagnostic and nothing from that payload is admitted. Diagnostics
//! carry the whole payload for whole-field failures and only `name` plus the
//! offending entry for per-mapping failures.

use crate::config::LoaderConfig;
use crate::registration::diagnostics::{Diagnostic, DiagnosticKind};
use crate::registration::model::{FileOverride, Mapping, ModuleId, Prefix, ValidRegistration};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

pub struct Validator {
    prefix_pattern: Regex,
    identifier_pattern: Regex,
}

impl Validator {
    pub fn new(config: &LoaderConfig) -> anyhow::Result<Self> {
        Ok(Self {
            prefix_pattern: config.prefix_pattern()?,
            identifier_pattern: config.identifier_pattern()?,
        })
    }

    pub fn validate(&self, payload: &Value) -> Result<ValidRegistration, Diagnostic> {
        let whole = |kind, item: &str| Diagnostic::new(kind, item, payload.clone());

        let Some(record) = payload.as_object() else {
            return Err(whole(DiagnosticKind::NotArray, "registration"));
        };

        let name = match record.get("name") {
            None => return Err(whole(DiagnosticKind::MissingField, "name")),
            Some(Value::String(name)) => name.as_str(),
            Some(_) => return Err(whole(DiagnosticKind::BadFieldType, "name")),
        };

        let mappings = match record.get("mappings") {
            None => return Err(whole(DiagnosticKind::MissingField, "mappings")),
            Some(Value::Object(map)) => self.validate_mappings(name, map)?,
            // A list is a mapping whose keys are positions; any entry fails the
            // key check, an empty list maps nothing.
            Some(Value::Array(items)) => match items.first() {
                None => Vec::new(),
                Some(first) => {
                    return Err(Diagnostic::new(
                        DiagnosticKind::BadFieldType,
                        "namespace",
                        json!({ "name": name, "mappings": [first] }),
                    ));
                }
            },
            Some(_) => return Err(whole(DiagnosticKind::BadFieldType, "mappings")),
        };

        let files = match record.get("files") {
            None => Vec::new(),
            Some(Value::Object(map)) => self.validate_files(name, map)?,
            Some(_) => return Err(whole(DiagnosticKind::BadFieldType, "files")),
        };

        Ok(ValidRegistration {
            name: name.to_string(),
            mappings,
            files,
        })
    }

    fn validate_mappings(
        &self,
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Vec<Mapping>, Diagnostic> {
        let mut mappings = Vec::with_capacity(map.len());
        for (prefix, path) in map {
            let slice = || json!({ "name": name, "mappings": { prefix.as_str(): path } });

            if !self.prefix_pattern.is_match(prefix) {
                return Err(Diagnostic::new(
                    DiagnosticKind::PatternMismatch,
                    "namespace",
                    slice(),
                ));
            }
            let Some(path_str) = path.as_str() else {
                return Err(Diagnostic::new(DiagnosticKind::BadFieldType, "path", slice()));
            };
            if !Path::new(path_str).is_dir() {
                return Err(Diagnostic::new(DiagnosticKind::PathNotFound, "path", slice()));
            }
            mappings.push(Mapping {
                prefix: Prefix(prefix.clone()),
                base_dir: PathBuf::from(path_str),
            });
        }
        Ok(mappings)
    }

    fn validate_files(
        &self,
        name: &str,
        map: &Map<String, Value>,
    ) -> Result<Vec<FileOverride>, Diagnostic> {
        let mut files = Vec::with_capacity(map.len());
        for (module, file) in map {
            let slice = || json!({ "name": name, "files": { module.as_str(): file } });

            if !self.identifier_pattern.is_match(module) {
                return Err(Diagnostic::new(
                    DiagnosticKind::PatternMismatch,
                    "module",
                    slice(),
                ));
            }
            let Some(file_str) = file.as_str() else {
                return Err(Diagnostic::new(DiagnosticKind::BadFieldType, "file", slice()));
            };
            if !Path::new(file_str).is_file() {
                return Err(Diagnostic::new(DiagnosticKind::PathNotFound, "file", slice()));
            }
            files.push(FileOverride {
                module: ModuleId(module.clone()),
                file: PathBuf::from(file_str),
            });
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn validator() -> Validator {
        Validator::new(&LoaderConfig::default()).unwrap()
    }

    fn dir_str(dir: &TempDir) -> String {
        dir.path().display().to_string()
    }

    #[test]
    fn accepts_well_formed_payload_in_order() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let payload = json!({
            "name": "acme",
            "mappings": { "Acme.Zed.": dir_str(&a), "Acme.": dir_str(&b) }
        });
        let valid = validator().validate(&payload).unwrap();
        assert_eq!(valid.name, "acme");
        let prefixes: Vec<_> = valid.mappings.iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["Acme.Zed.", "Acme."]);
        assert_eq!(valid.mappings[0].base_dir, a.path());
        assert!(valid.files.is_empty());
    }

    #[test]
    fn scalar_and_list_payloads_are_not_records() {
        for payload in [json!("acme"), json!(3), json!(null), json!([{"name": "x"}])] {
            let diag = validator().validate(&payload).unwrap_err();
            assert_eq!(diag.kind, DiagnosticKind::NotArray);
            assert_eq!(diag.payload, payload);
        }
    }

    #[test]
    fn name_must_exist_and_be_string() {
        let missing = json!({ "mappings": {} });
        let diag = validator().validate(&missing).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::MissingField, "name"));
        assert_eq!(diag.payload, missing);

        let wrong = json!({ "name": 12, "mappings": {} });
        let diag = validator().validate(&wrong).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::BadFieldType, "name"));
    }

    #[test]
    fn scalar_mappings_log_the_full_payload() {
        let payload = json!({ "name": "acme", "mappings": "/srv/acme", "extra": true });
        let diag = validator().validate(&payload).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::BadFieldType);
        assert_eq!(diag.item, "mappings");
        assert_eq!(diag.payload, payload);

        let missing = json!({ "name": "acme" });
        let diag = validator().validate(&missing).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::MissingField, "mappings"));
    }

    #[test]
    fn positional_mappings_fail_the_key_check() {
        let dir = TempDir::new().unwrap();
        let payload = json!({ "name": "acme", "mappings": [dir_str(&dir)] });
        let diag = validator().validate(&payload).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::BadFieldType);
        assert_eq!(diag.item, "namespace");
        assert_eq!(diag.payload["name"], "acme");

        let empty = json!({ "name": "acme", "mappings": [] });
        assert!(validator().validate(&empty).unwrap().mappings.is_empty());
    }

    #[test]
    fn one_bad_mapping_rejects_the_payload_with_a_slice() {
        let dir = TempDir::new().unwrap();
        let payload = json!({
            "name": "acme",
            "mappings": { "Acme.": dir_str(&dir), "acme-bad.": dir_str(&dir), "Later.": 4 }
        });
        let diag = validator().validate(&payload).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::PatternMismatch);
        assert_eq!(diag.item, "namespace");
        assert_eq!(
            diag.payload,
            json!({ "name": "acme", "mappings": { "acme-bad.": dir_str(&dir) } })
        );
    }

    #[test]
    fn path_must_be_an_existing_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let wrong_type = json!({ "name": "acme", "mappings": { "Acme.": ["/srv"] } });
        let diag = validator().validate(&wrong_type).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::BadFieldType, "path"));

        let not_dir = json!({ "name": "acme", "mappings": { "Acme.": file.display().to_string() } });
        let diag = validator().validate(&not_dir).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::PathNotFound, "path"));

        let gone = json!({ "name": "acme", "mappings": { "Acme.": dir.path().join("gone").display().to_string() } });
        let diag = validator().validate(&gone).unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::PathNotFound);
    }

    #[test]
    fn file_overrides_are_checked_after_mappings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Widget.mod");
        fs::write(&file, "widget").unwrap();

        let ok = json!({
            "name": "acme",
            "mappings": { "Acme.": dir_str(&dir) },
            "files": { "Acme.Widget": file.display().to_string() }
        });
        let valid = validator().validate(&ok).unwrap();
        assert_eq!(valid.files.len(), 1);
        assert_eq!(valid.files[0].module.as_str(), "Acme.Widget");

        let leaf_only = json!({ "name": "acme", "mappings": {}, "files": { "Widget": file.display().to_string() } });
        let diag = validator().validate(&leaf_only).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::PatternMismatch, "module"));

        let dir_as_file = json!({ "name": "acme", "mappings": {}, "files": { "Acme.Widget": dir_str(&dir) } });
        let diag = validator().validate(&dir_as_file).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::PathNotFound, "file"));

        let scalar = json!({ "name": "acme", "mappings": {}, "files": "nope" });
        let diag = validator().validate(&scalar).unwrap_err();
        assert_eq!((diag.kind, diag.item.as_str()), (DiagnosticKind::BadFieldType, "files"));
        assert_eq!(diag.payload, scalar);
    }
}
