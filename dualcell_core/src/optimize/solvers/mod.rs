//! Solver interfaces
//!
//! A [`Solver`] is stateful: a [`Problem`](crate::optimize::problem::Problem) feeds it
//! variables, constraints and objective terms and then calls [`Solver::solve`].

pub mod clarabel;

cfg_if::cfg_if! {
    if #[cfg(feature = "minilp")] {
        pub mod microlp;
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::ProblemSolution;

/// Interface every optimization backend implements
pub trait Solver {
    /// Add a continuous variable with bounds, infinite bounds are allowed
    fn add_continuous_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError>;

    /// Add the constraint `sum(coefficients * variables) = equals`
    fn add_equality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        equals: f64,
    ) -> Result<(), SolverError>;

    /// Add the constraint `lower_bound <= sum(coefficients * variables) <= upper_bound`
    fn add_inequality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError>;

    fn add_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), SolverError>;

    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError>;

    fn clear_objective(&mut self) -> Result<(), SolverError>;

    /// Solve the loaded problem
    ///
    /// Infeasible or unbounded problems are reported through the returned status, an `Err`
    /// means the solver could not run at all.
    fn solve(&mut self) -> Result<ProblemSolution, SolverError>;
}

/// Available solver backends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Interior point conic solver (always available)
    Clarabel,
    /// Simplex solver, requires the minilp feature to be enabled
    Minilp,
}

impl SolverKind {
    /// Create a fresh solver of this kind
    pub fn new_solver(&self) -> Result<Box<dyn Solver>, SolverError> {
        match self {
            SolverKind::Clarabel => Ok(Box::new(clarabel::ClarabelSolver::new())),
            SolverKind::Minilp => new_minilp_solver(),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "minilp")] {
        fn new_minilp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(microlp::MicrolpSolver::new()))
        }
    } else {
        fn new_minilp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::Unavailable("minilp".to_string()))
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Solver backend {0} is not enabled, check the crate features")]
    Unavailable(String),
    #[error("Variable {0} was added twice")]
    DuplicateVariable(String),
    #[error("Variable {0} is not part of the problem")]
    UnknownVariable(String),
    #[error("Constraint {0} has mismatched variables and coefficients")]
    MalformedConstraint(String),
    #[error("Invalid solver settings: {0}")]
    Settings(String),
}
