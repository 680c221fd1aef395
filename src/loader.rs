//! The loader instance a host bootstraps once and then queries.
//!
//! `Loader::bootstrap` pulls payloads from the host exactly once, runs the
//! registration pass, and freezes the result. Clones share the same
//! immutable registry, so a loader can be registered into a resolver chain
//! and still be used directly for introspection.

use crate::config::LoaderConfig;
use crate::host::{FileIncluder, LoadError, LoadedModule, ModuleResolver, RegistrationSource};
use crate::registration::{DiagnosticLog, PassSummary, RegistrationPass};
use crate::registry::Registry;
use crate::resolver::{Resolution, Resolver};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Loader {
    config: LoaderConfig,
    resolver: Resolver,
    registry: Arc<Registry>,
    diagnostics: Arc<DiagnosticLog>,
    summary: PassSummary,
}

impl Loader {
    /// Pull registrations from `source` and build the registry.
    ///
    /// Only a failing source is an error; malformed or colliding payloads are
    /// logged to `diagnostics()` and skipped.
    pub fn bootstrap(source: &mut dyn RegistrationSource, config: LoaderConfig) -> Result<Self> {
        let payloads = source
            .supply_registrations()
            .context("registration source failed to supply payloads")?;

        let mut pass = RegistrationPass::new(&config)?;
        for payload in &payloads {
            pass.submit(payload);
        }
        let (registry, diagnostics, summary) = pass.finish();

        Ok(Self {
            resolver: Resolver::new(&config)?,
            config,
            registry: Arc::new(registry),
            diagnostics: Arc::new(diagnostics),
            summary,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn summary(&self) -> PassSummary {
        self.summary
    }

    /// File path `identifier` maps to, or `None` when no prefix claims it.
    pub fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        self.resolution(identifier).map(Resolution::into_path)
    }

    /// Like `resolve`, keeping which override or prefix matched.
    pub fn resolution(&self, identifier: &str) -> Option<Resolution> {
        self.resolver.resolve(&self.registry, identifier)
    }

    /// Resolve `identifier` and hand the path to `includer`.
    ///
    /// A derived path that does not exist fails the load; shorter prefixes
    /// are never retried.
    pub fn load(
        &self,
        identifier: &str,
        includer: &mut dyn FileIncluder,
    ) -> Result<Option<LoadedModule>, LoadError> {
        match self.resolve(identifier) {
            Some(path) => includer.include(identifier, &path).map(Some),
            None => Ok(None),
        }
    }
}

impl ModuleResolver for Loader {
    fn resolve_module(&self, identifier: &str) -> Option<PathBuf> {
        self.resolve(identifier)
    }
}
