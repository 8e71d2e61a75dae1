use super::Composition;
use super::assembly::{Assembly, deduplicate_reactions, resolve_groups};
use super::combine::combine_into;
use crate::engine::config::{CompositionRequest, Connection};
use crate::engine::diagnostics::StructuralWarning;
use crate::engine::error::EngineError;
use crate::engine::matcher::group_species_by_name;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::renamer::rename_to_unique;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const SHELL_PREFIX: &str = "connected_subsystems";
const CONNECTED_SUFFIX: &str = "_connected";

/// Rejects empty names, self connections, a name connected to two different
/// targets, and cycles.
fn validate_connections(connections: &[Connection]) -> Result<(), EngineError> {
    let mut targets: HashMap<&str, &str> = HashMap::new();
    for connection in connections {
        let (name, connected) = (connection.name.trim(), connection.connected.trim());
        if name.is_empty() || connected.is_empty() {
            return Err(EngineError::InvalidArgument(
                "connection species names must not be empty".into(),
            ));
        }
        if name == connected {
            return Err(EngineError::InvalidArgument(format!(
                "species '{}' cannot be connected to itself",
                name
            )));
        }
        match targets.insert(connected, name) {
            Some(previous) if previous != name => {
                return Err(EngineError::InvalidArgument(format!(
                    "species '{}' is connected to both '{}' and '{}'",
                    connected, previous, name
                )));
            }
            _ => {}
        }
    }

    for &start in targets.keys() {
        let mut current = start;
        for _ in 0..targets.len() {
            match targets.get(current) {
                Some(&next) if next == start => {
                    return Err(EngineError::InvalidArgument(format!(
                        "connections form a cycle through '{}'",
                        start
                    )));
                }
                Some(&next) => current = next,
                None => break,
            }
        }
    }
    Ok(())
}

/// Renames every species displayed as a connected name to its target name
/// and suffixes its identifier. Returns the number of species renamed.
fn apply_connections(
    assembly: &mut Assembly,
    connections: &[Connection],
) -> Result<usize, EngineError> {
    let mut renamed = 0;
    for connection in connections {
        let keys = assembly.model().species_named(connection.connected.trim());
        if keys.is_empty() {
            debug!("No species named '{}' to connect", connection.connected);
        }
        for key in keys {
            let model = assembly.document.model_mut();
            let Some(species) = model.species_mut(key) else {
                continue;
            };
            species.name = Some(connection.name.trim().to_string());
            let old_id = species.id.clone();
            if !old_id.ends_with(CONNECTED_SUFFIX) {
                let new_id =
                    rename_to_unique(model, &old_id, &format!("{}{}", old_id, CONNECTED_SUFFIX))?;
                debug!(
                    "Connected '{}' to '{}' as '{}'",
                    connection.connected, connection.name, new_id
                );
            }
            renamed += 1;
        }
    }
    Ok(renamed)
}

/// Combines the request's subsystems, then merges the species of every
/// connection `(name <- connected)` into one species displayed as `name`.
///
/// Renaming and collapsing repeat until nothing changes, so chained
/// connections settle in one call and running the operator again on its own
/// output changes nothing but the model identifier.
#[instrument(skip_all, name = "connect_workflow")]
pub fn run(
    request: &CompositionRequest,
    reporter: &ProgressReporter,
) -> Result<Composition, EngineError> {
    validate_connections(&request.connections)?;
    let mut assembly = combine_into(request, SHELL_PREFIX, reporter)?;

    let max_passes = request.connections.len() + 1;
    let settled = reporter.phase("Connecting", || -> Result<bool, EngineError> {
        for pass in 1..=max_passes {
            let renamed = apply_connections(&mut assembly, &request.connections)?;
            let groups = group_species_by_name(assembly.model(), |s| {
                request
                    .connections
                    .iter()
                    .any(|c| c.name.trim() == s.display_name())
            });
            let collapsed =
                resolve_groups(&mut assembly, &groups, request.policy, "_combined", reporter)?;
            let removed =
                deduplicate_reactions(assembly.document.model_mut(), &mut assembly.diagnostics)?;
            debug!(
                "Connection pass {}: {} renamed, {} groups collapsed, {} reactions removed",
                pass, renamed, collapsed, removed
            );
            reporter.report(Progress::Message(format!("Connection pass {} complete", pass)));
            if renamed == 0 && collapsed == 0 && removed == 0 {
                return Ok(true);
            }
        }
        Ok(false)
    })?;

    if !settled {
        assembly
            .diagnostics
            .push(StructuralWarning::ConnectionNotSettled { passes: max_passes });
    }
    info!(
        "Connected {} subsystems through {} connection(s)",
        request.subsystems.len(),
        request.connections.len()
    );
    Ok(Composition {
        document: assembly.document,
        warnings: assembly.diagnostics.into_warnings(),
    })
}
