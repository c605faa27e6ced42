//! Call-site rewriting
//!
//! Once stubs are patched, early-bound calls to patched instance methods are
//! promoted to `callvirt` so overrides of a stub are honored at every call
//! site. Static targets keep their `call`.

use std::collections::HashSet;

use esapi_sdk::MethodRef;

use crate::assembly::{Instruction, MethodBody, ModAssembly};

/// Methods patched during one mod's load
#[derive(Debug, Clone, Default)]
pub struct PatchedMethodSet {
    methods: HashSet<MethodRef>,
}

impl PatchedMethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: MethodRef) -> bool {
        self.methods.insert(method)
    }

    pub fn contains(&self, method: &MethodRef) -> bool {
        self.methods.contains(method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Whether a `call` to `method` must be promoted
    fn needs_promotion(&self, method: &MethodRef) -> bool {
        !method.is_static && self.contains(method)
    }
}

/// Location of one promotable call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Method whose body contains the call
    pub caller: MethodRef,
    /// Instruction index within that body
    pub offset: usize,
    pub target: MethodRef,
}

/// Summary of a rewrite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub methods_scanned: usize,
    pub methods_rewritten: usize,
    pub sites_promoted: usize,
}

/// List early-bound calls to patched instance methods
pub fn find_call_sites(assembly: &ModAssembly, patched: &PatchedMethodSet) -> Vec<CallSite> {
    let mut sites = Vec::new();
    for def in assembly.methods() {
        let Some(code) = def.body.instructions() else {
            continue;
        };
        for (offset, instruction) in code.iter().enumerate() {
            if let Instruction::Call(target) = instruction {
                if patched.needs_promotion(target) {
                    sites.push(CallSite {
                        caller: def.sig.clone(),
                        offset,
                        target: target.clone(),
                    });
                }
            }
        }
    }
    sites
}

/// Promote every early-bound call to a patched instance method
///
/// Methods without an instruction body are skipped.
pub fn promote_call_sites(assembly: &mut ModAssembly, patched: &PatchedMethodSet) -> RewriteReport {
    let mut report = RewriteReport::default();
    if patched.is_empty() {
        return report;
    }

    for def in assembly.methods_mut() {
        let MethodBody::Il(code) = &mut def.body else {
            continue;
        };
        report.methods_scanned += 1;

        let mut promoted = 0;
        for instruction in code.iter_mut() {
            let target = match instruction {
                Instruction::Call(target) if patched.needs_promotion(target) => target.clone(),
                _ => continue,
            };
            tracing::trace!("{}: call {} -> callvirt", def.sig.full_name(), target.full_name());
            *instruction = Instruction::CallVirt(target);
            promoted += 1;
        }

        if promoted > 0 {
            report.methods_rewritten += 1;
            report.sites_promoted += promoted;
        }
    }

    tracing::debug!(
        "Scanned {} methods, promoted {} call sites in {}",
        report.methods_scanned,
        report.sites_promoted,
        report.methods_rewritten
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{ClassEntry, Value};
    use esapi_sdk::{ClassDef, MethodSig, TypeRef};

    struct Fixture {
        assembly: ModAssembly,
        instance_stub: MethodRef,
        static_stub: MethodRef,
        untouched: MethodRef,
    }

    fn fixture() -> Fixture {
        let holder = ClassDef::new("Holder").into_type();
        let instance_stub =
            MethodSig::instance(holder.clone(), "ExtraSettingsAPI_IsInWorld", [], TypeRef::Bool).into_ref();
        let static_stub =
            MethodSig::static_fn(holder.clone(), "ExtraSettingsAPI_ResetAllSettings", [], TypeRef::Void).into_ref();
        let untouched = MethodSig::instance(holder.clone(), "Helper", [], TypeRef::Void).into_ref();

        let user_body = vec![
            Instruction::LdArg(0),
            Instruction::Call(instance_stub.clone()),
            Instruction::Call(static_stub.clone()),
            Instruction::LdArg(0),
            Instruction::Call(untouched.clone()),
            Instruction::LdArg(0),
            Instruction::Call(instance_stub.clone()),
            Instruction::Ret,
        ];

        let assembly = ModAssembly::new("m").with_class(
            ClassEntry::new(holder)
                .instance_method("ExtraSettingsAPI_IsInWorld", [], TypeRef::Bool, MethodBody::Abstract)
                .static_method("ExtraSettingsAPI_ResetAllSettings", [], TypeRef::Void, MethodBody::Abstract)
                .instance_method("Helper", [], TypeRef::Void, MethodBody::Il(vec![Instruction::Ret]))
                .instance_method("User", [], TypeRef::Void, MethodBody::Il(user_body))
                .static_method("Native", [], TypeRef::Void, MethodBody::native(|_, _| Ok(Value::Unit))),
        );

        Fixture {
            assembly,
            instance_stub,
            static_stub,
            untouched,
        }
    }

    #[test]
    fn test_promotes_instance_targets_only() {
        let mut fx = fixture();
        let mut patched = PatchedMethodSet::new();
        patched.insert(fx.instance_stub.clone());
        patched.insert(fx.static_stub.clone());

        assert_eq!(find_call_sites(&fx.assembly, &patched).len(), 2);

        let report = promote_call_sites(&mut fx.assembly, &patched);
        assert_eq!(report.sites_promoted, 2);
        assert_eq!(report.methods_rewritten, 1);
        // Helper and User have bodies; the stubs and the native do not
        assert_eq!(report.methods_scanned, 2);

        let user = fx
            .assembly
            .methods()
            .find(|d| d.sig.name == "User")
            .unwrap()
            .body
            .instructions()
            .unwrap()
            .to_vec();
        assert_eq!(user[1], Instruction::CallVirt(fx.instance_stub.clone()));
        assert_eq!(user[2], Instruction::Call(fx.static_stub.clone()));
        assert_eq!(user[4], Instruction::Call(fx.untouched.clone()));
        assert_eq!(user[6], Instruction::CallVirt(fx.instance_stub));

        assert!(find_call_sites(&fx.assembly, &patched).is_empty());
    }

    #[test]
    fn test_empty_set_is_a_no_op() {
        let mut fx = fixture();
        let report = promote_call_sites(&mut fx.assembly, &PatchedMethodSet::new());
        assert_eq!(report, RewriteReport::default());
    }
}
