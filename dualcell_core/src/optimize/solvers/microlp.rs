//! Implements a solver interface for microlp (a dense simplex solver)
use indexmap::IndexMap;
use log::debug;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

#[derive(Clone, Debug)]
struct LinearRow {
    terms: Vec<(usize, f64)>,
    lower_bound: f64,
    upper_bound: f64,
}

/// Simplex solver backed by the microlp crate
#[derive(Clone, Debug, Default)]
pub struct MicrolpSolver {
    variables: IndexMap<String, (f64, f64)>,
    constraints: Vec<LinearRow>,
    objective: IndexMap<usize, f64>,
    minimize: bool,
}

impl MicrolpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_terms(
        &self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
    ) -> Result<Vec<(usize, f64)>, SolverError> {
        if variables.len() != coefficients.len() {
            return Err(SolverError::MalformedConstraint(id.to_string()));
        }
        variables
            .into_iter()
            .zip(coefficients)
            .map(|(v, c)| {
                self.variables
                    .get_index_of(v)
                    .map(|i| (i, c))
                    .ok_or_else(|| SolverError::UnknownVariable(v.to_string()))
            })
            .collect()
    }
}

impl Solver for MicrolpSolver {
    fn add_continuous_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        if self.variables.contains_key(id) {
            return Err(SolverError::DuplicateVariable(id.to_string()));
        }
        self.variables
            .insert(id.to_string(), (lower_bound, upper_bound));
        Ok(())
    }

    fn add_equality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        equals: f64,
    ) -> Result<(), SolverError> {
        let terms = self.collect_terms(id, variables, coefficients)?;
        self.constraints.push(LinearRow {
            terms,
            lower_bound: equals,
            upper_bound: equals,
        });
        Ok(())
    }

    fn add_inequality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        let terms = self.collect_terms(id, variables, coefficients)?;
        self.constraints.push(LinearRow {
            terms,
            lower_bound,
            upper_bound,
        });
        Ok(())
    }

    fn add_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), SolverError> {
        let index = self
            .variables
            .get_index_of(variable_id)
            .ok_or_else(|| SolverError::UnknownVariable(variable_id.to_string()))?;
        *self.objective.entry(index).or_insert(0.) += coefficient;
        Ok(())
    }

    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError> {
        self.minimize = objective_sense == ObjectiveSense::Minimize;
        Ok(())
    }

    fn clear_objective(&mut self) -> Result<(), SolverError> {
        self.objective.clear();
        Ok(())
    }

    fn solve(&mut self) -> Result<ProblemSolution, SolverError> {
        let direction = if self.minimize {
            microlp::OptimizationDirection::Minimize
        } else {
            microlp::OptimizationDirection::Maximize
        };
        let mut problem = microlp::Problem::new(direction);
        let vars: Vec<microlp::Variable> = self
            .variables
            .values()
            .enumerate()
            .map(|(i, (lower, upper))| {
                let coefficient = self.objective.get(&i).copied().unwrap_or(0.);
                problem.add_var(coefficient, (*lower, *upper))
            })
            .collect();
        for row in &self.constraints {
            let expr: Vec<(microlp::Variable, f64)> =
                row.terms.iter().map(|(i, c)| (vars[*i], *c)).collect();
            if row.lower_bound == row.upper_bound {
                problem.add_constraint(expr.as_slice(), microlp::ComparisonOp::Eq, row.upper_bound);
                continue;
            }
            if row.lower_bound.is_finite() {
                problem.add_constraint(expr.as_slice(), microlp::ComparisonOp::Ge, row.lower_bound);
            }
            if row.upper_bound.is_finite() {
                problem.add_constraint(expr.as_slice(), microlp::ComparisonOp::Le, row.upper_bound);
            }
        }
        debug!(
            "Solving with microlp: {} variables, {} constraints",
            vars.len(),
            self.constraints.len()
        );
        match problem.solve() {
            Ok(solution) => {
                let variable_values = self
                    .variables
                    .keys()
                    .zip(vars.iter())
                    .map(|(id, v)| (id.clone(), solution[*v]))
                    .collect();
                Ok(ProblemSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(solution.objective()),
                    variable_values: Some(variable_values),
                    dual_values: None,
                })
            }
            Err(microlp::Error::Infeasible) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Infeasible,
            )),
            Err(microlp::Error::Unbounded) => Ok(ProblemSolution::without_values(
                OptimizationStatus::Unbounded,
            )),
            #[allow(unreachable_patterns)]
            Err(_) => Ok(ProblemSolution::without_values(
                OptimizationStatus::NumericalError,
            )),
        }
    }
}
