//! This module provides the Model struct for representing an entire metabolic model
use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::configuration::Configuration;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::group::Group;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::metabolic_model::solution::Solution;
use crate::optimize::constraint::{Constraint, ConstraintTerm};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::{SolverError, SolverKind};

/// Represents a Genome Scale Metabolic Model
///
/// Every collection is an `IndexMap` keyed by the entity id, so lookups are by id and
/// iteration follows insertion order. Cloning a model is a deep copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Map of reaction ids to Reaction Objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Gene Objects
    pub genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolite Objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of group ids to Group Objects
    pub groups: IndexMap<String, Group>,
    /// Additional linear constraints over reaction fluxes, keyed by constraint id
    pub(crate) constraints: IndexMap<String, Constraint>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Whether the objective is maximized or minimized
    pub objective_sense: ObjectiveSense,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
    /// Solver used by [`Model::optimize`]
    pub solver: SolverKind,
}

impl Default for Model {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            genes: IndexMap::new(),
            metabolites: IndexMap::new(),
            groups: IndexMap::new(),
            constraints: IndexMap::new(),
            objective: IndexMap::new(),
            objective_sense: ObjectiveSense::Maximize,
            id: None,
            compartments: None,
            version: None,
            solver: Configuration::current().solver,
        }
    }

    // region Adding entities
    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> Result<(), ModelError> {
        // Steady state rows are keyed by metabolite id, next to the constraints
        if self.metabolites.contains_key(&metabolite.id)
            || self.constraints.contains_key(&metabolite.id)
        {
            return Err(ModelError::DuplicateId {
                kind: "metabolite",
                id: metabolite.id,
            });
        }
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        Ok(())
    }

    /// Add a reaction to the model
    ///
    /// Every metabolite in the reaction must already be part of the model.
    ///
    /// # Examples
    /// ```rust
    /// use dualcell_core::metabolic_model::metabolite::Metabolite;
    /// use dualcell_core::metabolic_model::model::Model;
    /// use dualcell_core::metabolic_model::reaction::ReactionBuilder;
    /// use indexmap::IndexMap;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("MAL_c", Some("c"))).unwrap();
    /// let new_reaction = ReactionBuilder::default()
    ///     .id("MAL_sink".to_string())
    ///     .metabolites(IndexMap::from([("MAL_c".to_string(), -1.)]))
    ///     .build()
    ///     .unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// assert!(model.reaction("MAL_sink").is_ok());
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ModelError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateId {
                kind: "reaction",
                id: reaction.id,
            });
        }
        if reaction.lower_bound > reaction.upper_bound {
            return Err(ModelError::InvalidBounds {
                id: reaction.id,
                lower_bound: reaction.lower_bound,
                upper_bound: reaction.upper_bound,
            });
        }
        if let Some(missing) = reaction
            .metabolites
            .keys()
            .find(|m| !self.metabolites.contains_key(*m))
        {
            return Err(ModelError::MetaboliteNotFound(missing.clone()));
        }
        if let Some(gpr) = &reaction.gpr {
            for gene in gpr.gene_ids() {
                if !self.genes.contains_key(gene) {
                    self.genes.insert(gene.to_string(), Gene::new(gene));
                }
            }
        }
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Add a gene to the model
    pub fn add_gene(&mut self, gene: Gene) -> Result<(), ModelError> {
        if self.genes.contains_key(&gene.id) {
            return Err(ModelError::DuplicateId {
                kind: "gene",
                id: gene.id,
            });
        }
        self.genes.insert(gene.id.clone(), gene);
        Ok(())
    }

    /// Add a group to the model
    pub fn add_group(&mut self, group: Group) -> Result<(), ModelError> {
        if self.groups.contains_key(&group.id) {
            return Err(ModelError::DuplicateId {
                kind: "group",
                id: group.id,
            });
        }
        self.groups.insert(group.id.clone(), group);
        Ok(())
    }

    /// Remove a reaction, returns it if it was present
    pub fn remove_reaction(&mut self, id: &str) -> Result<Reaction, ModelError> {
        self.reactions
            .shift_remove(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }
    // endregion Adding entities

    // region Lookup
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    pub fn reaction_mut(&mut self, id: &str) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    pub fn metabolite(&self, id: &str) -> Result<&Metabolite, ModelError> {
        self.metabolites
            .get(id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(id.to_string()))
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Constraints registered on the model, in registration order
    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }
    // endregion Lookup

    // region Bounds, constraints and objective
    /// Set the flux bounds of a reaction, returns the previous bounds
    pub fn set_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(f64, f64), ModelError> {
        if lower_bound > upper_bound || lower_bound.is_nan() || upper_bound.is_nan() {
            return Err(ModelError::InvalidBounds {
                id: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        let reaction = self.reaction_mut(id)?;
        let previous = (reaction.lower_bound, reaction.upper_bound);
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(previous)
    }

    /// Register a linear constraint over reaction fluxes
    ///
    /// Returns `Ok(true)` if the constraint was added, `Ok(false)` if an identical
    /// constraint was already registered. Constraint ids share the row namespace of the
    /// metabolite balances, so the id of a metabolite is rejected.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<bool, ModelError> {
        if self.metabolites.contains_key(constraint.get_id()) {
            return Err(ModelError::DuplicateId {
                kind: "constraint",
                id: constraint.get_id().to_string(),
            });
        }
        if let Some(existing) = self.constraints.get(constraint.get_id()) {
            if *existing == constraint {
                return Ok(false);
            }
            return Err(ModelError::ConstraintAlreadyExists(
                constraint.get_id().to_string(),
            ));
        }
        let (lower_bound, upper_bound) = constraint.bounds();
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidConstraintBounds(
                constraint.get_id().to_string(),
            ));
        }
        if let Some(missing) = constraint
            .get_variables()
            .find(|r| !self.reactions.contains_key(*r))
        {
            return Err(ModelError::ReactionNotFound(missing.to_string()));
        }
        debug!("Registering constraint {}: {}", constraint.get_id(), constraint);
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(true)
    }

    /// Remove a constraint, returning its position and the constraint itself
    pub fn remove_constraint(&mut self, id: &str) -> Option<(usize, Constraint)> {
        self.constraints
            .shift_remove_full(id)
            .map(|(index, _, constraint)| (index, constraint))
    }

    /// Put a previously removed constraint back at its original position
    pub(crate) fn restore_constraint(&mut self, index: usize, constraint: Constraint) {
        let index = index.min(self.constraints.len());
        self.constraints
            .shift_insert(index, constraint.get_id().to_string(), constraint);
    }

    /// Replace the objective, returns the previous objective and sense
    pub fn set_objective(
        &mut self,
        objective: IndexMap<String, f64>,
        sense: ObjectiveSense,
    ) -> Result<(IndexMap<String, f64>, ObjectiveSense), ModelError> {
        if let Some(missing) = objective.keys().find(|r| !self.reactions.contains_key(*r)) {
            return Err(ModelError::ReactionNotFound(missing.clone()));
        }
        let previous_sense = std::mem::replace(&mut self.objective_sense, sense);
        let previous = std::mem::replace(&mut self.objective, objective);
        Ok((previous, previous_sense))
    }
    // endregion Bounds, constraints and objective

    /// Check the internal consistency of the model
    ///
    /// Keys match ids, bounds are ordered, and every referenced metabolite, gene, and
    /// reaction exists.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (key, reaction) in &self.reactions {
            if key != &reaction.id {
                return Err(ModelError::KeyMismatch(key.clone()));
            }
            if reaction.lower_bound > reaction.upper_bound {
                return Err(ModelError::InvalidBounds {
                    id: reaction.id.clone(),
                    lower_bound: reaction.lower_bound,
                    upper_bound: reaction.upper_bound,
                });
            }
            if let Some(missing) = reaction
                .metabolites
                .keys()
                .find(|m| !self.metabolites.contains_key(*m))
            {
                return Err(ModelError::MetaboliteNotFound(missing.clone()));
            }
            if let Some(gpr) = &reaction.gpr {
                if let Some(missing) = gpr.gene_ids().into_iter().find(|g| !self.genes.contains_key(*g))
                {
                    return Err(ModelError::GeneNotFound(missing.to_string()));
                }
            }
        }
        if let Some((key, _)) = self.metabolites.iter().find(|(k, m)| *k != &m.id) {
            return Err(ModelError::KeyMismatch(key.clone()));
        }
        if let Some((key, _)) = self.genes.iter().find(|(k, g)| *k != &g.id) {
            return Err(ModelError::KeyMismatch(key.clone()));
        }
        for (key, constraint) in &self.constraints {
            if self.metabolites.contains_key(key) {
                return Err(ModelError::DuplicateId {
                    kind: "constraint",
                    id: key.clone(),
                });
            }
            if let Some(missing) = constraint
                .get_variables()
                .find(|r| !self.reactions.contains_key(*r))
            {
                return Err(ModelError::ReactionNotFound(missing.to_string()));
            }
        }
        if let Some(missing) = self
            .objective
            .keys()
            .find(|r| !self.reactions.contains_key(*r))
        {
            return Err(ModelError::ReactionNotFound(missing.clone()));
        }
        Ok(())
    }

    // region Optimization
    /// Translate the model into a linear optimization problem
    ///
    /// Each reaction becomes a forward and a reverse non-negative variable, each metabolite
    /// a steady state equality (keyed by the metabolite id), and each registered constraint
    /// is expanded over the forward and reverse variables.
    pub fn build_problem(&self) -> Result<Problem, ModelError> {
        let mut problem = Problem::new(self.objective_sense);
        let mut balances: IndexMap<&str, Vec<ConstraintTerm>> = self
            .metabolites
            .keys()
            .map(|m| (m.as_str(), Vec::new()))
            .collect();
        for reaction in self.reactions.values() {
            let forward = reaction.get_forward_id();
            let reverse = reaction.get_reverse_id();
            problem.add_new_variable(
                &forward,
                Some(&reaction.id),
                reaction.get_forward_lower_bound(),
                reaction.get_forward_upper_bound(),
            )?;
            problem.add_new_variable(
                &reverse,
                Some(&reaction.id),
                reaction.get_reverse_lower_bound(),
                reaction.get_reverse_upper_bound(),
            )?;
            for (met, coef) in &reaction.metabolites {
                let terms = balances
                    .get_mut(met.as_str())
                    .ok_or_else(|| ModelError::MetaboliteNotFound(met.clone()))?;
                terms.push(ConstraintTerm::new(&forward, *coef));
                terms.push(ConstraintTerm::new(&reverse, -coef));
            }
        }
        for (met, terms) in balances {
            if terms.is_empty() {
                continue;
            }
            problem.add_constraint(Constraint::Equality {
                id: met.to_string(),
                terms,
                equals: 0.,
            })?;
        }
        for constraint in self.constraints.values() {
            let mut terms = Vec::with_capacity(constraint.get_terms().len() * 2);
            for term in constraint.get_terms() {
                let reaction = self.reaction(&term.variable)?;
                terms.push(ConstraintTerm::new(&reaction.get_forward_id(), term.coefficient));
                terms.push(ConstraintTerm::new(&reaction.get_reverse_id(), -term.coefficient));
            }
            let (lower_bound, upper_bound) = constraint.bounds();
            problem.add_constraint(Constraint::Inequality {
                id: constraint.get_id().to_string(),
                terms,
                lower_bound,
                upper_bound,
            })?;
        }
        for (id, coef) in &self.objective {
            let reaction = self.reaction(id)?;
            problem.add_new_linear_objective_term(&reaction.get_forward_id(), *coef)?;
            problem.add_new_linear_objective_term(&reaction.get_reverse_id(), -coef)?;
        }
        Ok(problem)
    }

    /// Optimize the objective of the model with its solver
    ///
    /// Infeasible or unbounded problems are not errors, they are reported in the
    /// [`Solution`] status.
    pub fn optimize(&self) -> Result<Solution, ModelError> {
        let problem = self.build_problem()?;
        let mut solver = self.solver.new_solver()?;
        debug!(
            "Optimizing model {} ({} variables, {} constraints)",
            self.id.as_deref().unwrap_or("<unnamed>"),
            problem.num_variables(),
            problem.num_constraints()
        );
        let problem_solution = problem.solve_with(solver.as_mut())?;
        let solution = Solution::from_problem_solution(self, problem_solution);
        if !solution.is_optimal() {
            warn!("Optimization finished with status {:?}", solution.status);
        }
        Ok(solution)
    }
    // endregion Optimization
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not part of the model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} is not part of the model")]
    MetaboliteNotFound(String),
    #[error("Gene {0} is not part of the model")]
    GeneNotFound(String),
    #[error("A {kind} with id {id} already exists in the model")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Entity stored under key {0} has a different id")]
    KeyMismatch(String),
    #[error("Invalid bounds for {id}: lower bound {lower_bound} > upper bound {upper_bound}")]
    InvalidBounds {
        id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("A different constraint with id {0} is already registered")]
    ConstraintAlreadyExists(String),
    #[error("Constraint {0} has lower bound > upper bound")]
    InvalidConstraintBounds(String),
    #[error("Unable to build the optimization problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("Unable to create solver: {0}")]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::gene::Gpr;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::OptimizationStatus;

    fn reaction(id: &str, metabolites: &[(&str, f64)], lower_bound: f64, upper_bound: f64) -> Reaction {
        ReactionBuilder::default()
            .id(id.to_string())
            .metabolites(
                metabolites
                    .iter()
                    .map(|(m, c)| (m.to_string(), *c))
                    .collect(),
            )
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .unwrap()
    }

    /// uptake --> A --> B --> (drain), with a bypass A <-> B
    fn linear_model() -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(Metabolite::new("A_c", Some("c"))).unwrap();
        model.add_metabolite(Metabolite::new("B_c", Some("c"))).unwrap();
        model
            .add_reaction(reaction("uptake", &[("A_c", 1.)], 0., 10.))
            .unwrap();
        model
            .add_reaction(reaction("convert", &[("A_c", -1.), ("B_c", 1.)], 0., 1000.))
            .unwrap();
        model
            .add_reaction(reaction("bypass", &[("A_c", -1.), ("B_c", 1.)], -1000., 1000.))
            .unwrap();
        model
            .add_reaction(reaction("drain", &[("B_c", -1.)], 0., 1000.))
            .unwrap();
        model.objective.insert("drain".to_string(), 1.);
        model
    }

    #[test]
    fn add_reaction_checks() {
        let mut model = linear_model();
        assert!(matches!(
            model.add_reaction(reaction("drain", &[], 0., 1.)),
            Err(ModelError::DuplicateId { kind: "reaction", .. })
        ));
        assert_eq!(
            model.add_reaction(reaction("ghost", &[("X_c", 1.)], 0., 1.)),
            Err(ModelError::MetaboliteNotFound("X_c".to_string()))
        );
        assert!(matches!(
            model.add_reaction(reaction("bad", &[], 1., 0.)),
            Err(ModelError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn gpr_genes_registered() {
        let mut model = linear_model();
        let mut rxn = reaction("enzymatic", &[("A_c", -1.)], 0., 1.);
        rxn.gpr = Some(Gpr::new_gene_node("AT5G01"));
        model.add_reaction(rxn).unwrap();
        assert!(model.genes.contains_key("AT5G01"));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn set_bounds_returns_previous() {
        let mut model = linear_model();
        assert_eq!(model.set_bounds("uptake", 0., 5.), Ok((0., 10.)));
        assert!(matches!(
            model.set_bounds("uptake", 5., 0.),
            Err(ModelError::InvalidBounds { .. })
        ));
        assert_eq!(
            model.set_bounds("nope", 0., 5.),
            Err(ModelError::ReactionNotFound("nope".to_string()))
        );
    }

    #[test]
    fn constraint_registration_is_idempotent() {
        let mut model = linear_model();
        let cons = Constraint::new_inequality("split", &["convert", "bypass"], &[1., -1.], 0., 0.);
        assert_eq!(model.add_constraint(cons.clone()), Ok(true));
        assert_eq!(model.add_constraint(cons), Ok(false));
        assert_eq!(model.constraints().len(), 1);
        let conflicting = Constraint::new_inequality("split", &["convert"], &[1.], 0., 1.);
        assert_eq!(
            model.add_constraint(conflicting),
            Err(ModelError::ConstraintAlreadyExists("split".to_string()))
        );
        let unknown = Constraint::new_equality("unknown", &["ghost"], &[1.], 0.);
        assert_eq!(
            model.add_constraint(unknown),
            Err(ModelError::ReactionNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn constraint_ids_do_not_shadow_metabolites() {
        let mut model = linear_model();
        assert_eq!(
            model.add_constraint(Constraint::new_inequality("A_c", &["uptake"], &[1.], 0., 5.)),
            Err(ModelError::DuplicateId {
                kind: "constraint",
                id: "A_c".to_string()
            })
        );
        assert!(model.constraints().is_empty());

        model
            .add_constraint(Constraint::new_inequality("C_c", &["uptake"], &[1.], 0., 5.))
            .unwrap();
        assert!(matches!(
            model.add_metabolite(Metabolite::new("C_c", Some("c"))),
            Err(ModelError::DuplicateId { kind: "metabolite", .. })
        ));
        let solution = model.optimize().unwrap();
        assert!((solution.objective_value.unwrap() - 5.).abs() < 1e-5);

        model.constraints.insert(
            "B_c".to_string(),
            Constraint::new_inequality("B_c", &["drain"], &[1.], 0., 1.),
        );
        assert!(matches!(
            model.validate(),
            Err(ModelError::DuplicateId { kind: "constraint", .. })
        ));
    }

    #[test]
    fn remove_and_restore_constraint_keeps_order() {
        let mut model = linear_model();
        for id in ["a", "b", "c"] {
            model
                .add_constraint(Constraint::new_inequality(id, &["drain"], &[1.], 0., 100.))
                .unwrap();
        }
        let snapshot = model.clone();
        let (index, removed) = model.remove_constraint("b").unwrap();
        assert_eq!(index, 1);
        model.restore_constraint(index, removed);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn problem_layout() {
        let model = linear_model();
        let problem = model.build_problem().unwrap();
        assert_eq!(problem.num_variables(), 8);
        // One steady state row per metabolite
        assert_eq!(problem.num_constraints(), 2);
        assert_eq!(problem.objective().terms().len(), 2);
    }

    #[test]
    fn optimize_linear_model() {
        let model = linear_model();
        let solution = model.optimize().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 10.).abs() < 1e-5);
        assert!((solution.flux("drain").unwrap() - 10.).abs() < 1e-5);
    }

    #[test]
    fn optimize_with_constraint() {
        let mut model = linear_model();
        model
            .add_constraint(Constraint::new_inequality("cap", &["drain"], &[1.], 0., 4.))
            .unwrap();
        let solution = model.optimize().unwrap();
        assert!((solution.objective_value.unwrap() - 4.).abs() < 1e-5);
    }

    #[test]
    fn validate_detects_dangling_references() {
        let mut model = linear_model();
        assert!(model.validate().is_ok());
        model.metabolites.shift_remove("B_c");
        assert_eq!(
            model.validate(),
            Err(ModelError::MetaboliteNotFound("B_c".to_string()))
        );
    }

    #[test]
    fn clone_is_independent() {
        let model = linear_model();
        let mut copy = model.clone();
        copy.set_bounds("uptake", 0., 1.).unwrap();
        assert_eq!(model.reaction("uptake").unwrap().upper_bound, 10.);
    }
}
