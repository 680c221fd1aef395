use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

/// Registered namespace root, including its trailing separator
/// (e.g., `Vendor.Plugin.`).
///
/// Only the Validator constructs prefixes from untrusted input, so every
/// `Prefix` held by a registry has already matched the prefix pattern.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prefix(pub String);

/// Fully-qualified hierarchical name requested for loading.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

impl Prefix {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ModuleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Lets the registry look up `&str` candidates without allocating.
impl Borrow<str> for Prefix {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `prefix -> base directory` pair from a registration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Mapping {
    pub prefix: Prefix,
    pub base_dir: PathBuf,
}

/// One `module -> exact file` override from a registration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileOverride {
    pub module: ModuleId,
    pub file: PathBuf,
}

/// A payload that passed every Validator check.
///
/// Mappings and overrides keep the registrant's iteration order; admission
/// into the registry follows it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidRegistration {
    pub name: String,
    pub mappings: Vec<Mapping>,
    pub files: Vec<FileOverride>,
}
