//! Conflict checks run before admission.
//!
//! Every mapping of a registration is scanned so the log captures each
//! collision, but one hit is enough to reject the registration wholesale.
//! Base directories must also be distinct within a single registration.

use crate::registration::diagnostics::{Diagnostic, DiagnosticKind};
use crate::registration::model::ValidRegistration;
use crate::registry::Registry;
use serde_json::json;
use std::path::Path;

/// Collisions between `registration` and what `registry` already holds.
///
/// An empty result means the registration may be admitted. A base directory
/// collides whichever prefix currently owns it, including an earlier mapping
/// of the same registration.
pub fn detect_collisions(registration: &ValidRegistration, registry: &Registry) -> Vec<Diagnostic> {
    let name = registration.name.as_str();
    let mut found = Vec::new();
    let mut seen_dirs: Vec<&Path> = Vec::with_capacity(registration.mappings.len());

    for mapping in &registration.mappings {
        let dir = mapping.base_dir.display().to_string();
        let slice = || json!({ "name": name, "mappings": { mapping.prefix.as_str(): dir } });

        if registry.contains_prefix(&mapping.prefix) {
            found.push(Diagnostic::new(
                DiagnosticKind::Namespace,
                mapping.prefix.as_str(),
                slice(),
            ));
        }
        let base_dir = mapping.base_dir.as_path();
        if registry.contains_base_dir(base_dir) || seen_dirs.contains(&base_dir) {
            found.push(Diagnostic::new(DiagnosticKind::Path, dir.as_str(), slice()));
        }
        seen_dirs.push(base_dir);
    }

    for file in &registration.files {
        if registry.file_override(&file.module).is_some() {
            found.push(Diagnostic::new(
                DiagnosticKind::Module,
                file.module.as_str(),
                json!({ "name": name, "files": { file.module.as_str(): file.file.display().to_string() } }),
            ));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::model::{FileOverride, Mapping, ModuleId, Prefix};
    use std::path::PathBuf;

    fn registration(name: &str, pairs: &[(&str, &str)]) -> ValidRegistration {
        ValidRegistration {
            name: name.to_string(),
            mappings: pairs
                .iter()
                .map(|(prefix, dir)| Mapping {
                    prefix: Prefix(prefix.to_string()),
                    base_dir: PathBuf::from(dir),
                })
                .collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn no_collision_against_empty_registry() {
        let registry = Registry::default();
        assert!(detect_collisions(&registration("a", &[("A.", "/x")]), &registry).is_empty());
    }

    #[test]
    fn logs_every_colliding_pair() {
        let mut registry = Registry::default();
        registry.admit(registration("first", &[("A.", "/x"), ("B.", "/y")]));

        let second = registration("second", &[("A.", "/fresh"), ("C.", "/y"), ("A.B.", "/z")]);
        let found = detect_collisions(&second, &registry);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, DiagnosticKind::Namespace);
        assert_eq!(found[0].item, "A.");
        assert_eq!(found[0].payload["mappings"]["A."], "/fresh");
        assert_eq!(found[1].kind, DiagnosticKind::Path);
        assert_eq!(found[1].item, "/y");
        assert_eq!(found[1].payload["name"], "second");
    }

    #[test]
    fn same_prefix_and_dir_logs_both() {
        let mut registry = Registry::default();
        registry.admit(registration("first", &[("A.", "/x")]));
        let found = detect_collisions(&registration("dup", &[("A.", "/x")]), &registry);
        let kinds: Vec<_> = found.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::Namespace, DiagnosticKind::Path]);
    }

    #[test]
    fn directory_repeated_within_one_registration_collides() {
        let registry = Registry::default();
        let greedy = registration("greedy", &[("A.", "/x"), ("B.", "/y"), ("C.", "/x/")]);
        let found = detect_collisions(&greedy, &registry);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiagnosticKind::Path);
        assert_eq!(found[0].item, "/x/");
        assert_eq!(found[0].payload["mappings"]["C."], "/x/");
    }

    #[test]
    fn repeated_file_override_collides() {
        let mut registry = Registry::default();
        let mut first = registration("first", &[]);
        first.files.push(FileOverride {
            module: ModuleId("A.Widget".into()),
            file: PathBuf::from("/x/Widget.mod"),
        });
        registry.admit(first.clone());
        first.name = "second".into();
        let found = detect_collisions(&first, &registry);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiagnosticKind::Module);
        assert_eq!(found[0].item, "A.Widget");
    }
}
