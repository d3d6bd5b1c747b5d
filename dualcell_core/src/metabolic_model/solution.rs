//! Model level view of an optimization result
use indexmap::IndexMap;

use crate::metabolic_model::model::Model;
use crate::optimize::constraint::Constraint;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Result of optimizing a [`Model`]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Status reported by the solver
    pub status: OptimizationStatus,
    /// Objective value, None if the solver found no usable point
    pub objective_value: Option<f64>,
    /// Net flux (forward - reverse) keyed by reaction id, empty if no usable point
    pub fluxes: IndexMap<String, f64>,
    /// Dual values keyed by constraint id (metabolite ids for steady state rows)
    pub shadow_prices: IndexMap<String, f64>,
}

impl Solution {
    pub(crate) fn from_problem_solution(model: &Model, solution: ProblemSolution) -> Self {
        let fluxes = match &solution.variable_values {
            Some(values) => model
                .reactions
                .values()
                .map(|r| {
                    let forward = values.get(&r.get_forward_id()).copied().unwrap_or(0.);
                    let reverse = values.get(&r.get_reverse_id()).copied().unwrap_or(0.);
                    (r.id.clone(), forward - reverse)
                })
                .collect(),
            None => IndexMap::new(),
        };
        Solution {
            status: solution.status,
            objective_value: solution.objective_value,
            fluxes,
            shadow_prices: solution.dual_values.unwrap_or_default(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }

    /// Flux through a reaction, None if the reaction is unknown or there is no solution
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.get(reaction_id).copied()
    }

    /// How far the fluxes of a constraint over reactions fall outside its bounds, 0 inside
    pub fn violation(&self, constraint: &Constraint) -> f64 {
        let value = constraint.evaluate(|id| self.flux(id));
        let (lower_bound, upper_bound) = constraint.bounds();
        (lower_bound - value).max(value - upper_bound).max(0.)
    }
}
