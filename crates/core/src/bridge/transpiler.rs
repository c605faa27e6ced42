//! Body synthesis
//!
//! Turns a [`HookBinding`] into the instruction body of an adapter: load each
//! target argument (from the stub's own arguments, or from context), call the
//! API method, return its result.

use esapi_sdk::{MethodSig, TypeRef};

use crate::assembly::{Instruction, MethodBody, ModAssembly};

use super::cast::{can_cast_to, is_caller_handle, is_mod_handle};
use super::catalog::ApiCatalog;
use super::discovery::HookBinding;
use super::signature::ArgSource;

/// Errors raised while generating an adapter body
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("Mapping has {found} sources but {target} takes {expected} arguments")]
    MappingLength {
        target: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument {index} does not exist on {hook}")]
    ArgumentOutOfRange { hook: String, index: usize },

    #[error("Argument {index} of type {from} cannot be converted to {to}")]
    IncompatibleArgument { index: usize, from: String, to: String },

    #[error("Hook method is not declared in the assembly: {0}")]
    HookNotFound(String),
}

/// Generate the adapter body for `binding`
///
/// `mod_type` is the main class of the mod owning the stub. Its type token
/// resolves the mod handle when a slot is filled by injection.
pub fn synthesize_body(
    binding: &HookBinding,
    mod_type: &TypeRef,
    catalog: &ApiCatalog,
) -> Result<Vec<Instruction>, SynthesisError> {
    let hook = &binding.hook;
    let target = &binding.target;
    let sources = &binding.mapping.sources;
    let hook_args = hook.arguments();
    let target_args = target.arguments();

    if sources.len() != target_args.len() {
        return Err(SynthesisError::MappingLength {
            target: target.full_name(),
            expected: target_args.len(),
            found: sources.len(),
        });
    }

    let mut code = Vec::with_capacity(target_args.len() * 2 + 2);

    for (slot, source) in target_args.iter().zip(sources) {
        match *source {
            ArgSource::Inject => {
                code.push(Instruction::LdToken(mod_type.clone()));
                code.push(Instruction::Call(catalog.get_mod().clone()));
                if !is_mod_handle(slot) && is_caller_handle(slot) {
                    code.push(Instruction::Call(catalog.get_caller_from_mod().clone()));
                }
            }
            ArgSource::Arg(index) => {
                let out_of_range = || SynthesisError::ArgumentOutOfRange {
                    hook: hook.full_name(),
                    index,
                };
                let ty = hook_args.get(index).ok_or_else(out_of_range)?;
                let operand = u16::try_from(index).map_err(|_| out_of_range())?;
                code.push(Instruction::LdArg(operand));

                if can_cast_to(ty, slot, false) {
                    continue;
                }
                if is_caller_handle(ty) && is_mod_handle(slot) {
                    code.push(Instruction::CallVirt(catalog.caller_parent().clone()));
                } else if is_mod_handle(ty) && is_caller_handle(slot) {
                    code.push(Instruction::Call(catalog.get_caller_from_mod().clone()));
                } else {
                    return Err(SynthesisError::IncompatibleArgument {
                        index,
                        from: ty.to_string(),
                        to: slot.to_string(),
                    });
                }
            }
        }
    }

    code.push(Instruction::Call(target.clone()));
    code.push(Instruction::Ret);
    Ok(code)
}

/// Replace the stub's body with its adapter
pub fn patch_hook(
    assembly: &mut ModAssembly,
    binding: &HookBinding,
    mod_type: &TypeRef,
    catalog: &ApiCatalog,
) -> Result<(), SynthesisError> {
    let code = synthesize_body(binding, mod_type, catalog)?;
    let hook: &MethodSig = &binding.hook;
    if !assembly.set_body(hook, MethodBody::Il(code)) {
        return Err(SynthesisError::HookNotFound(hook.full_name()));
    }
    tracing::debug!("Patched {} -> {}", hook.full_name(), binding.target.full_name());
    Ok(())
}
