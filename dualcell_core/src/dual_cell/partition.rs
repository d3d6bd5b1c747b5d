//! Prefixed copies of a network, one per cell type
use indexmap::IndexMap;
use log::debug;

use crate::dual_cell::{ConstructionError, DualCellError};
use crate::metabolic_model::group::Group;
use crate::metabolic_model::model::Model;

/// Copy of `model` with every metabolite, reaction, gene, group and constraint id prefixed
///
/// References are rewritten along with the ids (stoichiometry keys, GPR rules, group
/// members, objective and constraint terms), so the copy is a valid network on its own.
/// Compartment suffixes stay where they are: `MAL_c` becomes `M_MAL_c`.
///
/// # Examples
/// ```rust
/// use dualcell_core::dual_cell::partition;
/// use dualcell_core::metabolic_model::metabolite::Metabolite;
/// use dualcell_core::metabolic_model::model::Model;
/// let mut model = Model::new_empty();
/// model.add_metabolite(Metabolite::new("MAL_c", Some("c"))).unwrap();
/// let mesophyll = partition(&model, "M_").unwrap();
/// assert!(mesophyll.metabolite("M_MAL_c").is_ok());
/// assert!(model.metabolite("MAL_c").is_ok());
/// ```
pub fn partition(model: &Model, prefix: &str) -> Result<Model, DualCellError> {
    if prefix.is_empty() {
        return Err(ConstructionError::EmptyPrefix.into());
    }
    let rename = |id: &str| format!("{prefix}{id}");
    let mut copy = Model::new_empty();
    copy.id = model.id.clone();
    copy.compartments = model.compartments.clone();
    copy.version = model.version.clone();
    copy.solver = model.solver;
    copy.objective_sense = model.objective_sense;

    for metabolite in model.metabolites.values() {
        let mut renamed = metabolite.clone();
        renamed.id = rename(&metabolite.id);
        insert_unique(&mut copy.metabolites, renamed.id.clone(), renamed, "metabolite")?;
    }
    for gene in model.genes.values() {
        let mut renamed = gene.clone();
        renamed.id = rename(&gene.id);
        insert_unique(&mut copy.genes, renamed.id.clone(), renamed, "gene")?;
    }
    for reaction in model.reactions.values() {
        let mut renamed = reaction.clone();
        renamed.id = rename(&reaction.id);
        renamed.metabolites = reaction
            .metabolites
            .iter()
            .map(|(met, coef)| (rename(met), *coef))
            .collect();
        renamed.gpr = reaction.gpr.as_ref().map(|gpr| gpr.rename_genes(&rename));
        insert_unique(&mut copy.reactions, renamed.id.clone(), renamed, "reaction")?;
    }
    for group in model.groups.values() {
        let renamed = Group {
            id: rename(&group.id),
            name: group.name.clone(),
            kind: group.kind.clone(),
            members: group
                .members
                .iter()
                .map(|member| member.with_id(rename(member.id())))
                .collect(),
        };
        insert_unique(&mut copy.groups, renamed.id.clone(), renamed, "group")?;
    }
    for constraint in model.constraints.values() {
        let renamed = constraint.rename(rename);
        insert_unique(
            &mut copy.constraints,
            renamed.get_id().to_string(),
            renamed,
            "constraint",
        )?;
    }
    copy.objective = model
        .objective
        .iter()
        .map(|(id, coef)| (rename(id), *coef))
        .collect();

    debug!(
        "Partitioned {} reactions and {} metabolites under prefix {}",
        copy.reactions.len(),
        copy.metabolites.len(),
        prefix
    );
    Ok(copy)
}

/// Registries are keyed by id, two entities sharing an id can only come from an
/// inconsistent source network
fn insert_unique<T>(
    registry: &mut IndexMap<String, T>,
    id: String,
    value: T,
    kind: &'static str,
) -> Result<(), ConstructionError> {
    if registry.contains_key(&id) {
        return Err(ConstructionError::Collision { kind, id });
    }
    registry.insert(id, value);
    Ok(())
}
