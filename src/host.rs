//! Seams between the loader and its host.
//!
//! The host supplies raw payloads once (`RegistrationSource`), keeps an
//! ordered chain of resolvers (`ResolverChain`), and owns the primitive that
//! actually pulls a file in (`FileIncluder`). The loader depends on nothing
//! else from the host.

use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Supplies raw, untrusted registration payloads.
///
/// Called exactly once, before any resolution happens.
pub trait RegistrationSource {
    fn supply_registrations(&mut self) -> anyhow::Result<Vec<Value>>;
}

impl RegistrationSource for Vec<Value> {
    fn supply_registrations(&mut self) -> anyhow::Result<Vec<Value>> {
        Ok(std::mem::take(self))
    }
}

/// One link in the host's chain of module resolvers.
///
/// Returning `None` declines and lets the chain continue.
pub trait ModuleResolver: Send + Sync {
    fn resolve_module(&self, identifier: &str) -> Option<PathBuf>;
}

/// Failures while pulling in a resolved module file.
///
/// These are fatal for the load attempt: once a resolver has claimed an
/// identifier no other resolver or shorter prefix is tried.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module '{identifier}' resolved to {}, which does not exist", .path.display())]
    ModuleFileMissing { identifier: String, path: PathBuf },

    #[error("unable to read module file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub identifier: String,
    pub path: PathBuf,
    pub source: String,
}

/// The host's file-inclusion primitive.
pub trait FileIncluder {
    fn include(&mut self, identifier: &str, path: &Path) -> Result<LoadedModule, LoadError>;
}

/// Reads module files from disk and remembers what was included.
#[derive(Debug, Default)]
pub struct FsIncluder {
    included: Vec<PathBuf>,
}

impl FsIncluder {
    pub fn included(&self) -> &[PathBuf] {
        &self.included
    }
}

impl FileIncluder for FsIncluder {
    fn include(&mut self, identifier: &str, path: &Path) -> Result<LoadedModule, LoadError> {
        if !path.is_file() {
            return Err(LoadError::ModuleFileMissing {
                identifier: identifier.to_string(),
                path: path.to_path_buf(),
            });
        }
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.included.push(path.to_path_buf());
        Ok(LoadedModule {
            identifier: identifier.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Ordered resolvers consulted for each unresolved identifier.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ModuleResolver>>,
}

impl ResolverChain {
    pub fn register<R>(&mut self, resolver: R)
    where
        R: ModuleResolver + 'static,
    {
        self.resolvers.push(Box::new(resolver));
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// First resolver to claim `identifier`, without loading anything.
    pub fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve_module(identifier))
    }

    /// Resolve and include `identifier`.
    ///
    /// `Ok(None)` when every resolver declined. An include failure from the
    /// claiming resolver propagates as-is.
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
