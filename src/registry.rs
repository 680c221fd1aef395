//! Prefix → base directory mapping built during the registration pass.
//!
//! The registry is only mutated through `admit`, which the registration pass
//! calls after validation and collision detection. Once a `Loader` wraps it
//! in an `Arc` it is read-only for the rest of the process, so concurrent
//! lookups need no locking.

use crate::registration::model::{ModuleId, Prefix, ValidRegistration};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    prefixes: BTreeMap<Prefix, PathBuf>,
    files: BTreeMap<ModuleId, PathBuf>,
}

impl Registry {
    /// Merge every mapping and override of `registration`.
    ///
    /// No conflict checks happen here; `detect_collisions` is the only gate.
    pub fn admit(&mut self, registration: ValidRegistration) {
        for mapping in registration.mappings {
            self.prefixes.insert(mapping.prefix, mapping.base_dir);
        }
        for file in registration.files {
            self.files.insert(file.module, file.file);
        }
    }

    pub fn contains_prefix(&self, prefix: &Prefix) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// True when any prefix already maps to `dir`.
    pub fn contains_base_dir(&self, dir: &Path) -> bool {
        self.prefixes.values().any(|existing| existing == dir)
    }

    /// Base directory for an exact prefix string (trailing separator included).
    pub fn base_dir(&self, prefix: &str) -> Option<&Path> {
        self.prefixes.get(prefix).map(PathBuf::as_path)
    }

    pub fn file_override(&self, module: &ModuleId) -> Option<&Path> {
        self.lookup_override(module.as_str())
    }

    pub(crate) fn lookup_override(&self, module: &str) -> Option<&Path> {
        self.files.get(module).map(PathBuf::as_path)
    }

    /// Registered mappings in prefix order.
    pub fn mappings(&self) -> impl Iterator<Item = (&Prefix, &Path)> {
        self.prefixes.iter().map(|(p, d)| (p, d.as_path()))
    }

    pub fn file_overrides(&self) -> impl Iterator<Item = (&ModuleId, &Path)> {
        self.files.iter().map(|(m, f)| (m, f.as_path()))
    }

    /// Number of admitted prefixes. Overrides are counted separately.
    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    pub fn override_count(&self) -> usize {
        self.files.len()
    }

    /// True when neither prefixes nor overrides have been admitted.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.files.is_empty()
    }
}
