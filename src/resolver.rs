//! Longest-prefix resolution of module identifiers to file paths.
//!
//! An identifier `c0.c1.….cn` yields candidate prefixes `c0.`, `c0.c1.`, …
//! up to but excluding the leaf `cn`. Candidates are tested most specific
//! first, so a sub-namespace registered on its own wins over its parent.
//! Identifiers whose components are not all letter-led names are declined
//! before any prefix is tested, so a derived path never leaves its base
//! directory.

use crate::config::LoaderConfig;
use crate::registration::model::Prefix;
use crate::registry::Registry;
use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};

/// What an identifier resolved through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Explicit `module -> file` override.
    Override { path: PathBuf },
    /// Longest registered ancestor prefix.
    Prefix { prefix: Prefix, path: PathBuf },
}

impl Resolution {
    pub fn path(&self) -> &Path {
        match self {
            Resolution::Override { path } | Resolution::Prefix { path, .. } => path.as_path(),
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Resolution::Override { path } | Resolution::Prefix { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolver {
    separator: char,
    extension: String,
    identifier_pattern: Regex,
}

impl Resolver {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        Ok(Self {
            separator: config.separator,
            extension: config.extension.clone(),
            identifier_pattern: config.identifier_pattern()?,
        })
    }

    /// Ancestor prefixes of `identifier`, longest first.
    ///
    /// Each candidate keeps its trailing separator. Identifiers without a
    /// separator have no candidates.
    pub fn candidate_prefixes<'a>(&self, identifier: &'a str) -> Vec<&'a str> {
        let sep_len = self.separator.len_utf8();
        let mut candidates: Vec<&str> = identifier
            .match_indices(self.separator)
            .map(|(idx, _)| &identifier[..idx + sep_len])
            .collect();
        candidates.reverse();
        candidates
    }

    /// Resolve `identifier` against `registry`, or decline with `None`.
    ///
    /// Overrides are consulted before the prefix search and fall through on a
    /// miss. The derived file's existence is not checked here.
    pub fn resolve(&self, registry: &Registry, identifier: &str) -> Option<Resolution> {
        if let Some(path) = registry.lookup_override(identifier) {
            tracing::debug!(identifier, path = %path.display(), "resolved through file override");
            return Some(Resolution::Override {
                path: path.to_path_buf(),
            });
        }

        if !self.identifier_pattern.is_match(identifier) {
            tracing::debug!(identifier, "declined malformed identifier");
            return None;
        }

        for candidate in self.candidate_prefixes(identifier) {
            tracing::trace!(identifier, candidate, "testing prefix");
            let Some(base_dir) = registry.base_dir(candidate) else {
                continue;
            };
            let path = self.derive_path(base_dir.to_path_buf(), &identifier[candidate.len()..]);
            tracing::debug!(identifier, prefix = candidate, path = %path.display(), "resolved");
            return Some(Resolution::Prefix {
                prefix: Prefix(candidate.to_string()),
                path,
            });
        }

        tracing::debug!(identifier, "no registered prefix matched");
        None
    }

    /// `base_dir` joined with the remainder's components, extension on the leaf.
    fn derive_path(&self, mut path: PathBuf, remainder: &str) -> PathBuf {
        let mut components = remainder.split(self.separator).peekable();
        while let Some(component) = components.next() {
            if components.peek().is_some() {
                path.push(component);
            } else {
                path.push(format!("{component}.{}", self.extension));
            }
        }
        path
    }
}
