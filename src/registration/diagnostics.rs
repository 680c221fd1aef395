//! Structured records for rejected registrations.
//!
//! Two append-only logs are kept per registration pass: payloads the
//! Validator refused and payloads the Collision Detector refused. They exist
//! for observability only; resolution never consults them.

use serde::Serialize;
use serde_json::Value;

/// Why a payload (or one of its mappings) was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Payload is not a structured record.
    NotArray,
    MissingField,
    BadFieldType,
    PatternMismatch,
    PathNotFound,
    /// Prefix already registered.
    Namespace,
    /// Base directory already registered under some prefix.
    Path,
    /// Module identifier already carries a file override.
    Module,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::NotArray => "not_array",
            DiagnosticKind::MissingField => "missing_field",
            DiagnosticKind::BadFieldType => "bad_field_type",
            DiagnosticKind::PatternMismatch => "pattern_mismatch",
            DiagnosticKind::PathNotFound => "path_not_found",
            DiagnosticKind::Namespace => "namespace",
            DiagnosticKind::Path => "path",
            DiagnosticKind::Module => "module",
        }
    }
}

/// One rejection. `payload` is the whole raw payload for `not_array` and
/// whole-field failures, otherwise `name` plus the single offending entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
    pub item: String,
    pub payload: Value,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, item: impl Into<String>, payload: Value) -> Self {
        Self {
            kind,
            item: item.into(),
            payload,
        }
    }

    /// Registrant name carried in the payload, when there is one.
    pub fn registrant(&self) -> Option<&str> {
        self.payload.get("name").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DiagnosticLog {
    bad_registrations: Vec<Diagnostic>,
    collisions: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn record_bad_registration(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            registrant = diagnostic.registrant().unwrap_or("<unnamed>"),
            kind = diagnostic.kind.as_str(),
            item = %diagnostic.item,
            "rejected malformed registration"
        );
        self.bad_registrations.push(diagnostic);
    }

    pub fn record_collisions(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            tracing::warn!(
                registrant = diagnostic.registrant().unwrap_or("<unnamed>"),
                kind = diagnostic.kind.as_str(),
                item = %diagnostic.item,
                "registration collides with an earlier registrant"
            );
            self.collisions.push(diagnostic);
        }
    }

    pub fn bad_registrations(&self) -> &[Diagnostic] {
        &self.bad_registrations
    }

    pub fn collisions(&self) -> &[Diagnostic] {
        &self.collisions
    }

    pub fn is_empty(&self) -> bool {
        self.bad_registrations.is_empty() && self.collisions.is_empty()
    }
}
