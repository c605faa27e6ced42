//! Hook discovery
//!
//! Finds the free-form `ExtraSettingsAPI_*` stubs on a settings holder and
//! picks the API method each one should forward to.

use esapi_sdk::{MethodRef, TypeRef, HOOK_PREFIX};

use crate::assembly::ModAssembly;
use crate::events::EventKind;

use super::catalog::ApiCatalog;
use super::signature::{match_signatures, SignatureMapping};

/// A prefixed method that is not a fixed event hook
#[derive(Debug, Clone)]
pub struct HookCandidate {
    /// Settings holder the stub was found on
    pub owner: TypeRef,
    pub method: MethodRef,
}

impl HookCandidate {
    /// Name with the reserved prefix stripped
    pub fn bare_name(&self) -> &str {
        self.method
            .name
            .strip_prefix(HOOK_PREFIX)
            .unwrap_or(&self.method.name)
    }
}

/// A stub paired with the API method it forwards to
#[derive(Debug, Clone)]
pub struct HookBinding {
    pub hook: MethodRef,
    pub target: MethodRef,
    pub mapping: SignatureMapping,
}

/// Outcome of discovery for one candidate
#[derive(Debug, Clone)]
pub enum Discovery {
    Bound(HookBinding),
    /// No catalog entry has this name
    NoNameMatch,
    /// Entries with this name exist but none has a compatible signature
    NoSignatureMatch { signatures: Vec<String> },
}

/// Collect the free-form stubs declared on `holder` or its bases
///
/// A base method overridden further down the hierarchy is reported once,
/// through its most derived declaration.
pub fn hook_candidates(assembly: &ModAssembly, holder: &TypeRef) -> Vec<HookCandidate> {
    let mut found: Vec<HookCandidate> = Vec::new();

    for class in assembly.hierarchy(holder) {
        for def in class.methods() {
            let name = &def.sig.name;
            if !name.starts_with(HOOK_PREFIX) || EventKind::from_hook_name(name).is_some() {
                continue;
            }
            if found.iter().any(|c| c.method.overrides(&def.sig)) {
                continue;
            }
            found.push(HookCandidate {
                owner: holder.clone(),
                method: def.sig.clone(),
            });
        }
    }

    tracing::trace!("Found {} bridge candidates on {}", found.len(), holder);
    found
}

/// Pick the catalog entry with the strictly lowest skip cost
pub fn discover(candidate: &HookCandidate, catalog: &ApiCatalog) -> Discovery {
    let mut best: Option<HookBinding> = None;
    let mut signatures = Vec::new();

    for entry in catalog.named(candidate.bare_name()) {
        signatures.push(entry.method().to_string());

        let Some(mapping) = match_signatures(&candidate.method, entry.method()) else {
            continue;
        };
        tracing::trace!(
            "{} matches {} with skip cost {}",
            candidate.method.full_name(),
            entry.method(),
            mapping.skip_cost
        );

        if best.as_ref().map_or(true, |b| mapping.skip_cost < b.mapping.skip_cost) {
            best = Some(HookBinding {
                hook: candidate.method.clone(),
                target: entry.method().clone(),
                mapping,
            });
        }
    }

    match best {
        Some(binding) => Discovery::Bound(binding),
        None if signatures.is_empty() => Discovery::NoNameMatch,
        None => Discovery::NoSignatureMatch { signatures },
    }
}

/// Run discovery for every candidate on `holder`
pub fn discover_hooks(
    assembly: &ModAssembly,
    holder: &TypeRef,
    catalog: &ApiCatalog,
) -> Vec<(HookCandidate, Discovery)> {
    hook_candidates(assembly, holder)
        .into_iter()
        .map(|candidate| {
            let outcome = discover(&candidate, catalog);
            (candidate, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{ClassEntry, MethodBody, Value};
    use crate::bridge::catalog::CatalogEntry;
    use crate::bridge::signature::ArgSource;
    use esapi_sdk::{api_type, event_caller_type, mod_type, ClassDef, MethodSig};

    fn holder() -> TypeRef {
        ClassDef::new("Holder").into_type()
    }

    fn candidate(method: MethodSig) -> HookCandidate {
        HookCandidate {
            owner: holder(),
            method: method.into_ref(),
        }
    }

    #[test]
    fn test_fixed_hooks_are_not_candidates() {
        let h = holder();
        let assembly = ModAssembly::new("m").with_class(
            ClassEntry::new(h.clone())
                .instance_method("ExtraSettingsAPI_SettingsOpen", [], TypeRef::Void, MethodBody::Abstract)
                .instance_method("ExtraSettingsAPI_GetCheckboxState", [TypeRef::String], TypeRef::Bool, MethodBody::Abstract)
                .instance_method("Unrelated", [], TypeRef::Void, MethodBody::Abstract),
        );

        let names: Vec<_> = hook_candidates(&assembly, &h)
            .into_iter()
            .map(|c| c.bare_name().to_string())
            .collect();
        assert_eq!(names, vec!["GetCheckboxState"]);
    }

    #[test]
    fn test_overridden_base_stub_reported_once() {
        let base = ClassDef::new("Base").into_type();
        let derived = ClassDef::new("Derived").extends(base.clone()).into_type();
        let stub = |ty: &TypeRef| {
            ClassEntry::new(ty.clone()).instance_method(
                "ExtraSettingsAPI_IsInWorld",
                [],
                TypeRef::Bool,
                MethodBody::Abstract,
            )
        };
        let assembly = ModAssembly::new("m").with_class(stub(&base)).with_class(stub(&derived));

        let found = hook_candidates(&assembly, &derived);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].method.declaring, derived);
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let catalog = ApiCatalog::standard();
        let c = candidate(MethodSig::instance(holder(), "ExtraSettingsAPI_isinworld", [], TypeRef::Bool));
        assert!(matches!(discover(&c, &catalog), Discovery::Bound(_)));
    }

    #[test]
    fn test_no_name_match() {
        let catalog = ApiCatalog::standard();
        let c = candidate(MethodSig::instance(holder(), "ExtraSettingsAPI_GetChekboxState", [TypeRef::String], TypeRef::Bool));
        assert!(matches!(discover(&c, &catalog), Discovery::NoNameMatch));
    }

    #[test]
    fn test_no_signature_match_lists_candidates() {
        let catalog = ApiCatalog::standard();
        let c = candidate(MethodSig::instance(holder(), "ExtraSettingsAPI_ResetAllSettings", [], TypeRef::Int));

        match discover(&c, &catalog) {
            Discovery::NoSignatureMatch { signatures } => {
                assert_eq!(signatures.len(), 2);
                assert!(signatures.iter().all(|s| s.contains("ResetAllSettings")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tie_prefers_first_catalog_entry() {
        let catalog = ApiCatalog::standard();
        let c = candidate(MethodSig::static_fn(holder(), "ExtraSettingsAPI_ResetAllSettings", [], TypeRef::Void));

        let Discovery::Bound(binding) = discover(&c, &catalog) else {
            panic!("expected a binding");
        };
        assert_eq!(binding.target.params, vec![mod_type()]);
        assert_eq!(binding.mapping.sources, vec![ArgSource::Inject]);

        // A caller handle argument binds equally well to both overloads
        let c = candidate(MethodSig::static_fn(
            holder(),
            "ExtraSettingsAPI_ResetAllSettings",
            [event_caller_type()],
            TypeRef::Void,
        ));
        let Discovery::Bound(binding) = discover(&c, &catalog) else {
            panic!("expected a binding");
        };
        assert_eq!(binding.target.params, vec![mod_type()]);
    }

    #[test]
    fn test_strictly_lowest_cost_wins() {
        let noop = |_: &crate::bridge::NativeEnv<'_>, _: &[Value]| Ok(Value::Unit);
        let catalog = ApiCatalog::empty()
            .with_entry(CatalogEntry::new(
                MethodSig::static_fn(api_type(), "Pick", [mod_type(), TypeRef::String], TypeRef::Void),
                noop,
            ))
            .with_entry(CatalogEntry::new(
                MethodSig::static_fn(api_type(), "Pick", [mod_type(), TypeRef::String, TypeRef::Int], TypeRef::Void),
                noop,
            ));
        let c = candidate(MethodSig::static_fn(
            holder(),
            "ExtraSettingsAPI_Pick",
            [TypeRef::String, TypeRef::Int],
            TypeRef::Void,
        ));

        let Discovery::Bound(binding) = discover(&c, &catalog) else {
            panic!("expected a binding");
        };
        assert_eq!(binding.target.arity(), 3);
        assert_eq!(binding.mapping.skip_cost, 0);
    }
}
