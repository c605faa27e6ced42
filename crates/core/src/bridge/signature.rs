//! Signature matching
//!
//! Maps the arguments of a hook stub onto the parameters of an API method.
//! Walks both argument lists left to right in a single greedy pass:
//!
//! - a caller argument that casts to the next target parameter is consumed;
//! - otherwise, a target parameter that wants a handle is filled by injecting
//!   the calling mod's own handle;
//! - otherwise the caller argument is dropped.
//!
//! The skip cost counts dropped or unconsumed declared caller arguments.
//! The implicit receiver of an instance stub is free to drop.

use esapi_sdk::{mod_type, MethodSig};

use super::cast::can_cast_to;

/// Where the value for one target parameter comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSource {
    /// Caller argument at this index (receiver is index 0 for instance stubs)
    Arg(usize),
    /// Contextual mod handle injected by the adapter
    Inject,
}

/// Result of a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMapping {
    /// One source per target argument, in target order
    pub sources: Vec<ArgSource>,
    /// Lower is better
    pub skip_cost: usize,
}

impl SignatureMapping {
    /// Number of injected slots
    pub fn injected(&self) -> usize {
        self.sources.iter().filter(|s| **s == ArgSource::Inject).count()
    }
}

/// Match a hook stub (`caller`) against an API method (`target`)
///
/// Returns `None` if the return types are incompatible or some target
/// parameter cannot be filled.
pub fn match_signatures(caller: &MethodSig, target: &MethodSig) -> Option<SignatureMapping> {
    if !can_cast_to(&target.ret, &caller.ret, false) {
        tracing::trace!("{} -> {}: return type mismatch", caller.name, target.full_name());
        return None;
    }

    let caller_args = caller.arguments();
    let target_args = target.arguments();
    let has_receiver = !caller.is_static;
    let cost_of = |index: usize| usize::from(!(has_receiver && index == 0));

    let mut sources = Vec::with_capacity(target_args.len());
    let mut skip_cost = 0;
    let mut i = 0;

    while sources.len() < target_args.len() {
        let slot = &target_args[sources.len()];

        if i < caller_args.len() && can_cast_to(&caller_args[i], slot, true) {
            if !can_cast_to(&caller_args[i], slot, false) {
                tracing::debug!(
                    "{}: argument {} ({}) bound to {} by handle substitution",
                    caller.full_name(),
                    i,
                    caller_args[i],
                    slot
                );
            }
            sources.push(ArgSource::Arg(i));
            i += 1;
        } else if can_cast_to(slot, &mod_type(), true) {
            sources.push(ArgSource::Inject);
        } else if i < caller_args.len() {
            skip_cost += cost_of(i);
            i += 1;
        } else {
            tracing::trace!(
                "{} -> {}: ran out of arguments for {}",
                caller.name,
                target.full_name(),
                slot
            );
            return None;
        }
    }

    skip_cost += (i..caller_args.len()).map(cost_of).sum::<usize>();

    Some(SignatureMapping { sources, skip_cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esapi_sdk::{api_type, event_caller_type, ClassDef, TypeRef};

    fn holder() -> TypeRef {
        ClassDef::new("Holder").into_type()
    }

    fn api(name: &str, params: Vec<TypeRef>, ret: TypeRef) -> MethodSig {
        MethodSig::static_fn(api_type(), name, params, ret)
    }

    #[test]
    fn test_receiver_only_stub_injects_mod() {
        let caller = MethodSig::instance(holder(), "ExtraSettingsAPI_Open", [], TypeRef::Void);
        let target = api("Open", vec![mod_type()], TypeRef::Void);

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(mapping.sources, vec![ArgSource::Inject]);
        assert_eq!(mapping.skip_cost, 0);
    }

    #[test]
    fn test_declared_parameters_consumed_in_order() {
        let caller = MethodSig::instance(
            holder(),
            "ExtraSettingsAPI_GetCheckboxState",
            [TypeRef::String],
            TypeRef::Bool,
        );
        let target = api("GetCheckboxState", vec![mod_type(), TypeRef::String], TypeRef::Bool);

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(mapping.sources, vec![ArgSource::Inject, ArgSource::Arg(1)]);
        assert_eq!(mapping.skip_cost, 0);
    }

    #[test]
    fn test_skip_cost_counts_unconsumed_declared_arguments() {
        let caller = MethodSig::static_fn(
            holder(),
            "ExtraSettingsAPI_GetCheckboxState",
            [TypeRef::String, TypeRef::Int, TypeRef::Float],
            TypeRef::Bool,
        );
        let target = api("GetCheckboxState", vec![mod_type(), TypeRef::String], TypeRef::Bool);

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(mapping.sources, vec![ArgSource::Inject, ArgSource::Arg(0)]);
        assert_eq!(mapping.skip_cost, 2);
    }

    #[test]
    fn test_dropped_argument_costs() {
        let caller = MethodSig::static_fn(
            holder(),
            "ExtraSettingsAPI_SetInputValue",
            [TypeRef::Int, TypeRef::String, TypeRef::String],
            TypeRef::Void,
        );
        let target = api(
            "SetInputValue",
            vec![mod_type(), TypeRef::String, TypeRef::String],
            TypeRef::Void,
        );

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(
            mapping.sources,
            vec![ArgSource::Inject, ArgSource::Arg(1), ArgSource::Arg(2)]
        );
        assert_eq!(mapping.skip_cost, 1);
    }

    #[test]
    fn test_incompatible_return_fails() {
        let caller = MethodSig::instance(holder(), "ExtraSettingsAPI_GetSliderValue", [TypeRef::String], TypeRef::Int);
        let target = api("GetSliderValue", vec![mod_type(), TypeRef::String], TypeRef::Float);
        assert!(match_signatures(&caller, &target).is_none());

        let void_caller = MethodSig::instance(holder(), "ExtraSettingsAPI_IsInWorld", [], TypeRef::Void);
        let bool_target = api("IsInWorld", vec![], TypeRef::Bool);
        assert!(match_signatures(&void_caller, &bool_target).is_none());
    }

    #[test]
    fn test_return_may_widen_to_object() {
        let caller = MethodSig::instance(holder(), "ExtraSettingsAPI_GetInputValue", [TypeRef::String], TypeRef::Object);
        let target = api("GetInputValue", vec![mod_type(), TypeRef::String], TypeRef::String);
        assert!(match_signatures(&caller, &target).is_some());
    }

    #[test]
    fn test_missing_non_handle_parameter_fails() {
        let caller = MethodSig::instance(holder(), "ExtraSettingsAPI_SetCheckboxState", [TypeRef::String], TypeRef::Void);
        let target = api(
            "SetCheckboxState",
            vec![mod_type(), TypeRef::String, TypeRef::Bool],
            TypeRef::Void,
        );
        assert!(match_signatures(&caller, &target).is_none());
    }

    #[test]
    fn test_caller_handle_consumed_by_substitution() {
        let caller = MethodSig::static_fn(
            holder(),
            "ExtraSettingsAPI_ResetAllSettings",
            [event_caller_type()],
            TypeRef::Void,
        );
        let target = api("ResetAllSettings", vec![mod_type()], TypeRef::Void);

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(mapping.sources, vec![ArgSource::Arg(0)]);
        assert_eq!(mapping.skip_cost, 0);
    }

    #[test]
    fn test_more_target_slots_than_caller_arguments() {
        // Target wants two handles and a string; caller only supplies the string
        let caller = MethodSig::static_fn(holder(), "ExtraSettingsAPI_Pair", [TypeRef::String, TypeRef::Int], TypeRef::Void);
        let target = api(
            "Pair",
            vec![mod_type(), event_caller_type(), TypeRef::String],
            TypeRef::Void,
        );

        let mapping = match_signatures(&caller, &target).unwrap();
        assert_eq!(
            mapping.sources,
            vec![ArgSource::Inject, ArgSource::Inject, ArgSource::Arg(0)]
        );
        assert_eq!(mapping.injected(), 2);
        // The trailing int is never consumed
        assert_eq!(mapping.skip_cost, 1);
    }
}
