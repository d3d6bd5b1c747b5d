//! Scoped, reversible modifications of a [`Model`]
//!
//! A [`ModelScope`] borrows the model mutably and records every change it makes in a
//! journal. Unless [`ModelScope::commit`] is called, the journal is replayed in reverse
//! when the scope ends, whether by [`ModelScope::rollback`], an early return through `?`,
//! or a panic unwinding through it.
use indexmap::IndexMap;
use log::trace;

use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::Reaction;
use crate::metabolic_model::solution::Solution;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;

#[derive(Debug)]
enum Change {
    ConstraintAdded(String),
    ConstraintRemoved {
        index: usize,
        constraint: Constraint,
    },
    BoundsChanged {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    ObjectiveChanged {
        objective: IndexMap<String, f64>,
        sense: ObjectiveSense,
    },
    ReactionAdded(String),
    GenesAdded(Vec<String>),
}

/// Transaction over a model, see the module documentation
#[derive(Debug)]
pub struct ModelScope<'m> {
    model: &'m mut Model,
    journal: Vec<Change>,
}

impl Model {
    /// Start a scope whose changes are undone unless committed
    ///
    /// # Examples
    /// ```rust
    /// use dualcell_core::metabolic_model::metabolite::Metabolite;
    /// use dualcell_core::metabolic_model::model::Model;
    /// use dualcell_core::metabolic_model::reaction::ReactionBuilder;
    /// use dualcell_core::optimize::constraint::Constraint;
    /// use indexmap::IndexMap;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("A_c", Some("c"))).unwrap();
    /// model.add_reaction(ReactionBuilder::default()
    ///     .id("A_tx".to_string())
    ///     .metabolites(IndexMap::from([("A_c".to_string(), 1.)]))
    ///     .build()
    ///     .unwrap()).unwrap();
    /// {
    ///     let mut scope = model.begin_scope();
    ///     scope.add_constraint(Constraint::new_inequality("cap", &["A_tx"], &[1.], 0., 5.)).unwrap();
    ///     assert_eq!(scope.model().constraints().len(), 1);
    /// }
    /// assert!(model.constraints().is_empty());
    /// ```
    pub fn begin_scope(&mut self) -> ModelScope<'_> {
        ModelScope {
            model: self,
            journal: Vec::new(),
        }
    }
}

impl<'m> ModelScope<'m> {
    /// Read access to the model, including the changes made so far
    pub fn model(&self) -> &Model {
        &*self.model
    }

    /// Number of changes that would be undone by a rollback
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }

    /// Register a constraint, identical re-registration is a no-op
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        let id = constraint.get_id().to_string();
        if self.model.add_constraint(constraint)? {
            self.journal.push(Change::ConstraintAdded(id));
        }
        Ok(())
    }

    pub fn remove_constraint(&mut self, id: &str) -> Option<Constraint> {
        let (index, constraint) = self.model.remove_constraint(id)?;
        self.journal.push(Change::ConstraintRemoved {
            index,
            constraint: constraint.clone(),
        });
        Some(constraint)
    }

    pub fn set_bounds(
        &mut self,
        reaction: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let (previous_lower, previous_upper) =
            self.model.set_bounds(reaction, lower_bound, upper_bound)?;
        self.journal.push(Change::BoundsChanged {
            reaction: reaction.to_string(),
            lower_bound: previous_lower,
            upper_bound: previous_upper,
        });
        Ok(())
    }

    pub fn set_objective(
        &mut self,
        objective: IndexMap<String, f64>,
        sense: ObjectiveSense,
    ) -> Result<(), ModelError> {
        let (objective, sense) = self.model.set_objective(objective, sense)?;
        self.journal.push(Change::ObjectiveChanged { objective, sense });
        Ok(())
    }

    /// Add a reaction, genes of its GPR that the model lacks are added with it
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ModelError> {
        let id = reaction.id.clone();
        let mut new_genes: Vec<String> = Vec::new();
        if let Some(gpr) = &reaction.gpr {
            for gene in gpr.gene_ids() {
                if !self.model.genes.contains_key(gene) && !new_genes.iter().any(|g| g == gene) {
                    new_genes.push(gene.to_string());
                }
            }
        }
        self.model.add_reaction(reaction)?;
        if !new_genes.is_empty() {
            self.journal.push(Change::GenesAdded(new_genes));
        }
        self.journal.push(Change::ReactionAdded(id));
        Ok(())
    }

    /// Optimize the model in its current, modified, state
    pub fn optimize(&self) -> Result<Solution, ModelError> {
        self.model.optimize()
    }

    /// Keep every change made in this scope
    pub fn commit(mut self) {
        self.journal.clear();
    }

    /// Undo every change made in this scope
    pub fn rollback(mut self) {
        self.undo();
    }

    fn undo(&mut self) {
        while let Some(change) = self.journal.pop() {
            trace!("Undoing {:?}", change);
            match change {
                Change::ConstraintAdded(id) => {
                    self.model.constraints.shift_remove(&id);
                }
                Change::ConstraintRemoved { index, constraint } => {
                    self.model.restore_constraint(index, constraint);
                }
                Change::BoundsChanged {
                    reaction,
                    lower_bound,
                    upper_bound,
                } => {
                    if let Some(reaction) = self.model.reactions.get_mut(&reaction) {
                        reaction.lower_bound = lower_bound;
                        reaction.upper_bound = upper_bound;
                    }
                }
                Change::ObjectiveChanged { objective, sense } => {
                    self.model.objective = objective;
                    self.model.objective_sense = sense;
                }
                Change::ReactionAdded(id) => {
                    self.model.reactions.shift_remove(&id);
                }
                Change::GenesAdded(genes) => {
                    for gene in genes {
                        self.model.genes.shift_remove(&gene);
                    }
                }
            }
        }
    }
}

impl Drop for ModelScope<'_> {
    fn drop(&mut self) {
        self.undo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::gene::{Gene, Gpr, GprOperatorType};
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn small_model() -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(Metabolite::new("A_c", Some("c"))).unwrap();
        for (id, coef) in [("A_in", 1.), ("A_out", -1.)] {
            model
                .add_reaction(
                    ReactionBuilder::default()
                        .id(id.to_string())
                        .metabolites(IndexMap::from([("A_c".to_string(), coef)]))
                        .lower_bound(0.)
                        .upper_bound(100.)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        model.objective.insert("A_out".to_string(), 1.);
        model
            .add_constraint(Constraint::new_inequality(
                "first",
                &["A_in"],
                &[1.],
                0.,
                90.,
            ))
            .unwrap();
        model
            .add_constraint(Constraint::new_inequality(
                "second",
                &["A_out"],
                &[1.],
                0.,
                80.,
            ))
            .unwrap();
        model
    }

    #[test]
    fn drop_restores_everything() {
        let mut model = small_model();
        let snapshot = model.clone();
        {
            let mut scope = model.begin_scope();
            scope
                .add_constraint(Constraint::new_inequality("extra", &["A_in"], &[1.], 0., 1.))
                .unwrap();
            scope.remove_constraint("first").unwrap();
            scope.set_bounds("A_in", 0., 3.).unwrap();
            scope.set_bounds("A_in", 0., 2.).unwrap();
            scope
                .set_objective(
                    IndexMap::from([("A_in".to_string(), 1.)]),
                    ObjectiveSense::Minimize,
                )
                .unwrap();
            assert_eq!(scope.pending_changes(), 5);
            assert_ne!(scope.model(), &snapshot);
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn drop_removes_genes_of_added_reaction() {
        let mut model = small_model();
        model.add_gene(Gene::new("G0")).unwrap();
        let snapshot = model.clone();
        {
            let mut scope = model.begin_scope();
            let gpr = Gpr::new_binary_operation(
                Gpr::new_gene_node("G0"),
                GprOperatorType::Or,
                Gpr::new_gene_node("G1"),
            )
            .unwrap();
            let reaction = ReactionBuilder::default()
                .id("A_enz".to_string())
                .metabolites(IndexMap::from([("A_c".to_string(), -1.)]))
                .gpr(Some(gpr))
                .build()
                .unwrap();
            scope.add_reaction(reaction).unwrap();
            assert_eq!(
                scope.model().genes.keys().collect::<Vec<_>>(),
                vec!["G0", "G1"]
            );
            assert_eq!(scope.pending_changes(), 2);
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn commit_keeps_changes() {
        let mut model = small_model();
        let mut scope = model.begin_scope();
        scope.set_bounds("A_in", 0., 3.).unwrap();
        scope.commit();
        assert_eq!(model.reaction("A_in").unwrap().upper_bound, 3.);
    }

    #[test]
    fn rollback_after_failed_step() {
        let mut model = small_model();
        let snapshot = model.clone();
        let result: Result<(), ModelError> = (|| {
            let mut scope = model.begin_scope();
            scope.set_bounds("A_in", 0., 3.)?;
            scope.set_bounds("missing", 0., 3.)?;
            scope.commit();
            Ok(())
        })();
        assert!(result.is_err());
        assert_eq!(model, snapshot);
    }

    #[test]
    fn identical_constraint_is_not_journaled() {
        let mut model = small_model();
        let snapshot = model.clone();
        let mut scope = model.begin_scope();
        let existing = scope.model().constraint("first").unwrap().clone();
        scope.add_constraint(existing).unwrap();
        assert_eq!(scope.pending_changes(), 0);
        scope.rollback();
        assert_eq!(model, snapshot);
    }

    #[test]
    fn scoped_optimization() {
        let mut model = small_model();
        {
            let mut scope = model.begin_scope();
            scope
                .add_constraint(Constraint::new_inequality("cap", &["A_in"], &[1.], 0., 7.))
                .unwrap();
            let solution = scope.optimize().unwrap();
            assert!((solution.objective_value.unwrap() - 7.).abs() < 1e-5);
        }
        let solution = model.optimize().unwrap();
        assert!((solution.objective_value.unwrap() - 80.).abs() < 1e-5);
    }
}
