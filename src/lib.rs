//! Shared library for the nsloader namespace loader.
//!
//! Independent registrants each map hierarchical namespace prefixes (e.g.
//! `Vendor.Plugin.`) to base directories. The registration pass validates
//! those untrusted payloads, rejects collisions, and freezes the result; the
//! resolver then maps module identifiers to files by longest-prefix match.
//! Public items here form the contract the `nsloader` binary and embedding
//! hosts depend on.

pub mod config;
pub mod host;
pub mod loader;
pub mod manifest;
pub mod registration;
pub mod registry;
pub mod resolver;

pub use config::LoaderConfig;
pub use host::{
    FileIncluder, FsIncluder, LoadError, LoadedModule, ModuleResolver, RegistrationSource,
    ResolverChain,
};
pub use loader::Loader;
pub use manifest::{ManifestFile, PayloadDirectory, open_source, parse_manifest};
pub use registration::{
    Diagnostic, DiagnosticKind, DiagnosticLog, FileOverride, Mapping, ModuleId, PassSummary,
    Prefix, RegistrationPass, ValidRegistration, Validator, detect_collisions,
    process_registrations,
};
pub use registry::Registry;
pub use resolver::{Resolution, Resolver};
