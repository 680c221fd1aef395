//! Loader configuration: identifier separator and module file extension.
//!
//! Values come from built-in defaults, then `NSLOADER_*` environment
//! variables, then explicit CLI flags. The config is fixed once a `Loader`
//! has been bootstrapped; both the prefix pattern and the derived file paths
//! depend on it.

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::env;

pub const DEFAULT_SEPARATOR: char = '.';
pub const DEFAULT_EXTENSION: &str = "mod";

pub const SEPARATOR_ENV: &str = "NSLOADER_SEPARATOR";
pub const EXTENSION_ENV: &str = "NSLOADER_EXTENSION";
pub const REGISTRATIONS_ENV: &str = "NSLOADER_REGISTRATIONS";
pub const LOG_ENV: &str = "NSLOADER_LOG";

const COMPONENT: &str = "[A-Za-z][A-Za-z0-9_]*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub separator: char,
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Defaults overlaid with `NSLOADER_SEPARATOR` / `NSLOADER_EXTENSION`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// Empty values are treated as unset so shells can clear an override with
    /// `VAR=`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = non_empty(lookup(SEPARATOR_ENV)) {
            config.separator = parse_separator(&raw)?;
        }
        if let Some(raw) = non_empty(lookup(EXTENSION_ENV)) {
            config.extension = parse_extension(&raw)?;
        }
        Ok(config)
    }

    pub fn with_separator(mut self, raw: &str) -> Result<Self> {
        self.separator = parse_separator(raw)?;
        Ok(self)
    }

    pub fn with_extension(mut self, raw: &str) -> Result<Self> {
        self.extension = parse_extension(raw)?;
        Ok(self)
    }

    /// Pattern every registered prefix must match: one or more components,
    /// each followed by the separator.
    pub fn prefix_pattern(&self) -> Result<Regex> {
        let sep = regex::escape(&self.separator.to_string());
        build_anchored(&format!("(?:{COMPONENT}{sep})+"))
    }

    /// Pattern for full module identifiers (at least two components, no
    /// trailing separator).
    pub fn identifier_pattern(&self) -> Result<Regex> {
        let sep = regex::escape(&self.separator.to_string());
        build_anchored(&format!("{COMPONENT}(?:{sep}{COMPONENT})+"))
    }
}

fn build_anchored(body: &str) -> Result<Regex> {
    let pattern = format!("^{body}$");
    Regex::new(&pattern).with_context(|| format!("failed to compile pattern {pattern}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_separator(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    let (Some(sep), None) = (chars.next(), chars.next()) else {
        bail!("separator must be exactly one character, got '{raw}'");
    };
    if sep.is_alphanumeric() || sep == '_' || sep.is_whitespace() {
        bail!("separator '{sep}' would be ambiguous inside identifier components");
    }
    Ok(sep)
}

fn parse_extension(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("extension must not be empty");
    }
    if trimmed.starts_with('.') {
        bail!("extension must be given without a leading dot, got '{trimmed}'");
    }
    if trimmed.contains(['/', '\\']) {
        bail!("extension must not contain path separators, got '{trimmed}'");
    }
    Ok(trimmed.to_string())
}
