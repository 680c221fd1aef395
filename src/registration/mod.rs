//! Registration pipeline: validate, detect collisions, admit.
//!
//! The pass runs once per process, in the order the host supplied payloads.
//! Rejected payloads land in the diagnostic log; nothing here is fatal.

pub mod collisions;
pub mod diagnostics;
pub mod model;
pub mod validator;

pub use collisions::detect_collisions;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
pub use model::{FileOverride, Mapping, ModuleId, Prefix, ValidRegistration};
pub use validator::Validator;

use crate::config::LoaderConfig;
use crate::registry::Registry;
use anyhow::Result;
use serde_json::Value;

/// Counts reported at the end of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub registrants: usize,
    pub admitted: usize,
    pub malformed: usize,
    pub colliding: usize,
}

pub struct RegistrationPass {
    validator: Validator,
    registry: Registry,
    diagnostics: DiagnosticLog,
    summary: PassSummary,
}

impl RegistrationPass {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        Ok(Self {
            validator: Validator::new(config)?,
            registry: Registry::default(),
            diagnostics: DiagnosticLog::default(),
            summary: PassSummary::default(),
        })
    }

    /// Run one raw payload through the pipeline.
    ///
    /// Returns true when the payload was admitted.
    pub fn submit(&mut self, payload: &Value) -> bool {
        self.summary.registrants += 1;

        let registration = match self.validator.validate(payload) {
            Ok(registration) => registration,
            Err(diagnostic) => {
                self.summary.malformed += 1;
                self.diagnostics.record_bad_registration(diagnostic);
                return false;
            }
        };

        let collisions = detect_collisions(&registration, &self.registry);
        if !collisions.is_empty() {
            self.summary.colliding += 1;
            self.diagnostics.record_collisions(collisions);
            return false;
        }

        tracing::debug!(
            registrant = %registration.name,
            mappings = registration.mappings.len(),
            files = registration.files.len(),
            "admitted registration"
        );
        self.registry.admit(registration);
        self.summary.admitted += 1;
        true
    }

    /// Close the pass and hand over the built registry and its log.
    pub fn finish(self) -> (Registry, DiagnosticLog, PassSummary) {
        tracing::info!(
            registrants = self.summary.registrants,
            admitted = self.summary.admitted,
            malformed = self.summary.malformed,
            colliding = self.summary.colliding,
            prefixes = self.registry.prefix_count(),
            overrides = self.registry.override_count(),
            "registration pass complete"
        );
        (self.registry, self.diagnostics, self.summary)
    }
}

/// Convenience wrapper running a whole batch through a fresh pass.
pub fn process_registrations<'a, I>(
    config: &LoaderConfig,
    payloads: I,
) -> Result<(Registry, DiagnosticLog, PassSummary)>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut pass = RegistrationPass::new(config)?;
    for payload in payloads {
        pass.submit(payload);
    }
    Ok(pass.finish())
}
