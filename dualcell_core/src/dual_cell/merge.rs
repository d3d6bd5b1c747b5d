//! Union of two partitioned networks
use indexmap::IndexMap;
use log::{debug, info};

use crate::dual_cell::{ConstructionError, DualCellError};
use crate::metabolic_model::model::Model;

/// Combine two networks with disjoint identifiers into one
///
/// The merged model keeps the objective, solver and id of `left`; compartments are
/// unioned. Any shared reaction, metabolite, gene, group or constraint id is a
/// [`ConstructionError::Collision`], nothing is merged in that case.
pub fn merge(left: Model, right: Model) -> Result<Model, DualCellError> {
    check_disjoint(&left.metabolites, &right.metabolites, "metabolite")?;
    check_disjoint(&left.reactions, &right.reactions, "reaction")?;
    check_disjoint(&left.genes, &right.genes, "gene")?;
    check_disjoint(&left.groups, &right.groups, "group")?;
    check_disjoint(&left.constraints, &right.constraints, "constraint")?;
    // balance rows and constraints share one namespace
    check_disjoint(&left.metabolites, &right.constraints, "constraint")?;
    check_disjoint(&left.constraints, &right.metabolites, "metabolite")?;

    let mut merged = left;
    if !right.objective.is_empty() {
        debug!(
            "Dropping objective of the right network ({} terms)",
            right.objective.len()
        );
    }
    merged.metabolites.extend(right.metabolites);
    merged.reactions.extend(right.reactions);
    merged.genes.extend(right.genes);
    merged.groups.extend(right.groups);
    merged.constraints.extend(right.constraints);
    if let Some(compartments) = right.compartments {
        let existing = merged.compartments.get_or_insert_with(IndexMap::new);
        for (code, name) in compartments {
            existing.entry(code).or_insert(name);
        }
    }
    info!(
        "Merged network has {} reactions and {} metabolites",
        merged.reactions.len(),
        merged.metabolites.len()
    );
    Ok(merged)
}

fn check_disjoint<L, R>(
    left: &IndexMap<String, L>,
    right: &IndexMap<String, R>,
    kind: &'static str,
) -> Result<(), ConstructionError> {
    match right.keys().find(|id| left.contains_key(*id)) {
        Some(id) => Err(ConstructionError::Collision {
            kind,
            id: id.clone(),
        }),
        None => Ok(()),
    }
}
