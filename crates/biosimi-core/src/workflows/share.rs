use super::Composition;
use super::assembly::{assemble, resolve_groups};
use crate::engine::config::CompositionRequest;
use crate::engine::error::EngineError;
use crate::engine::matcher::group_species_by_name;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

const SHELL_PREFIX: &str = "shared_subsystems";

/// Merges the request's subsystems into one model in which every species
/// named in the shared-resource list exists once.
///
/// The first compartment of the result is sized to the request's target size,
/// or to the sum of the source sizes when none is given. Species that are not
/// shared are copied unchanged.
#[instrument(skip_all, name = "share_workflow")]
pub fn run(
    request: &CompositionRequest,
    reporter: &ProgressReporter,
) -> Result<Composition, EngineError> {
    let mut assembly = assemble(request, SHELL_PREFIX, request.target_size, reporter)?;

    let collapsed = reporter.phase("Sharing", || {
        let groups = group_species_by_name(assembly.model(), |s| {
            request.is_shared(s.display_name())
        });
        resolve_groups(&mut assembly, &groups, request.policy, "_shared", reporter)
    })?;

    info!(
        "Shared {} resource group(s) across {} subsystems ({} policy)",
        collapsed,
        request.subsystems.len(),
        request.policy
    );
    Ok(Composition {
        document: assembly.document,
        warnings: assembly.diagnostics.into_warnings(),
    })
}
