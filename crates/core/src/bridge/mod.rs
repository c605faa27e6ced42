//! API bridges
//!
//! Free-form `ExtraSettingsAPI_*` stubs declared by a mod are bound to the
//! API catalog at load time:
//!
//! 1. [`discovery`] finds each stub and the catalog entry it best matches,
//!    using [`signature::match_signatures`] and the [`cast`] rules.
//! 2. [`transpiler`] replaces the stub's body with an adapter that loads the
//!    target's arguments and calls it.
//! 3. [`rewriter`] promotes early-bound calls to patched instance stubs.
//!
//! The [`interp`] module executes the resulting bodies.
//!
//! Every failure is per stub: it is logged and the stub is left unpatched.

pub mod cast;
pub mod catalog;
pub mod discovery;
pub mod interp;
pub mod rewriter;
pub mod signature;
pub mod transpiler;

use esapi_sdk::TypeRef;
use tracing::{debug, error, info, warn};

use crate::assembly::ModAssembly;
use crate::config::BridgeConfig;

pub use cast::can_cast_to;
pub use catalog::{ApiCatalog, CatalogEntry};
pub use discovery::{discover, discover_hooks, hook_candidates, Discovery, HookBinding, HookCandidate};
pub use interp::{ExecError, Interpreter, NativeEnv, MAX_CALL_DEPTH};
pub use rewriter::{find_call_sites, promote_call_sites, CallSite, PatchedMethodSet, RewriteReport};
pub use signature::{match_signatures, ArgSource, SignatureMapping};
pub use transpiler::{patch_hook, synthesize_body, SynthesisError};

/// Outcome of installing one mod's bridges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeReport {
    pub candidates: usize,
    pub patched: usize,
    /// No name or no signature match
    pub unmatched: usize,
    /// Body synthesis failed
    pub failed: usize,
    pub rewrite: RewriteReport,
}

/// Discover, patch and promote every stub on `holder`
///
/// `mod_type` is the mod's main class, used to resolve the mod handle for
/// injected arguments.
pub fn install_bridges(
    mod_name: &str,
    mod_type: &TypeRef,
    holder: &TypeRef,
    assembly: &mut ModAssembly,
    catalog: &ApiCatalog,
    config: &BridgeConfig,
) -> BridgeReport {
    let mut report = BridgeReport::default();
    if !config.enabled {
        debug!("[{}] API bridges disabled", mod_name);
        return report;
    }

    let mut patched = PatchedMethodSet::new();

    for (candidate, outcome) in discover_hooks(assembly, holder, catalog) {
        report.candidates += 1;
        let hook = candidate.method.full_name();

        match outcome {
            Discovery::Bound(binding) => match patch_hook(assembly, &binding, mod_type, catalog) {
                Ok(()) => {
                    patched.insert(binding.hook);
                    report.patched += 1;
                }
                Err(e) => {
                    error!("[{}] Failed to patch {}: {}", mod_name, hook, e);
                    report.failed += 1;
                }
            },
            Discovery::NoNameMatch => {
                report.unmatched += 1;
                if config.warn_unmatched {
                    warn!(
                        "[{}] Could not find any methods matching the name of {}. Check the spelling or remove the prefix",
                        mod_name, hook
                    );
                }
            }
            Discovery::NoSignatureMatch { signatures } => {
                report.unmatched += 1;
                if config.warn_unmatched {
                    warn!(
                        "[{}] Could not find suitable implementation for {}{}. The following methods were found with the same name:\n{}",
                        mod_name,
                        hook,
                        candidate.method.param_list(),
                        signatures.join("\n")
                    );
                }
            }
        }
    }

    if config.promote_call_sites && !patched.is_empty() {
        report.rewrite = promote_call_sites(assembly, &patched);
    }

    if report.candidates > 0 {
        info!(
            "[{}] Bridged {}/{} API methods ({} call sites promoted)",
            mod_name, report.patched, report.candidates, report.rewrite.sites_promoted
        );
    }
    report
}
