//! Provides struct representing an optimization problem
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::{Variable, VariableBuilder};
use crate::optimize::ProblemSolution;
use indexmap::IndexMap;
use thiserror::Error;

/// A linear optimization problem over continuous variables
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
    // endregion Accessors

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<(), ProblemError> {
        self.validate_variable(&variable)?;
        variable.index = self.variables.len();
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let new_var = VariableBuilder::default()
            .id(id)
            .name(name.map(str::to_string))
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()?;
        self.add_variable(new_var)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_equality(
            id,
            variables,
            coefficients,
            equals,
        ))
    }

    /// Create a new inequality constraint and add it to the problem
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_inequality(
            id,
            variables,
            coefficients,
            lower_bound,
            upper_bound,
        ))
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        if !self.variables.contains_key(variable_id) {
            return Err(ProblemError::NonExistentVariablesInObjective);
        }
        self.objective
            .add_term(ObjectiveTerm::new(variable_id, coefficient));
        Ok(())
    }

    /// Remove all terms from the objective
    pub fn remove_all_objective_terms(&mut self) {
        self.objective.remove_all_terms();
    }
    // endregion Adding Objective Terms

    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        if lower_bound > upper_bound {
            return Err(ProblemError::InvalidVariableBounds);
        }
        match self.variables.get_mut(id) {
            Some(var) => {
                var.lower_bound = lower_bound;
                var.upper_bound = upper_bound;
            }
            None => return Err(ProblemError::NonExistentVariable),
        };
        Ok(())
    }

    /// Remove a variable from the problem, will also remove it as a term from all constraints
    /// and any terms in the objective that include this variable
    pub fn delete_variable(&mut self, variable_id: &str) -> Result<(), ProblemError> {
        if self.variables.shift_remove(variable_id).is_none() {
            return Err(ProblemError::NonExistentVariable);
        }
        self.objective.remove_terms_with_variable(variable_id);
        for cons in self.constraints.values_mut() {
            match cons {
                Constraint::Equality { terms, .. } | Constraint::Inequality { terms, .. } => {
                    terms.retain(|t| t.variable != variable_id)
                }
            }
        }
        self.fix_variable_indices();
        Ok(())
    }

    /// Remove a constraint (by id) from the problem
    pub fn remove_constraint(&mut self, constraint_id: &str) -> Option<Constraint> {
        self.constraints.shift_remove(constraint_id)
    }

    /// Load the problem into `solver` and solve it
    pub fn solve_with(&self, solver: &mut dyn Solver) -> Result<ProblemSolution, ProblemError> {
        for var in self.variables.values() {
            solver.add_continuous_variable(&var.id, var.lower_bound, var.upper_bound)?;
        }
        for cons in self.constraints.values() {
            let variables: Vec<&str> = cons.get_variables().collect();
            let coefficients: Vec<f64> = cons.get_terms().iter().map(|t| t.coefficient).collect();
            match cons {
                Constraint::Equality { id, equals, .. } => {
                    solver.add_equality_constraint(id, variables, coefficients, *equals)?
                }
                Constraint::Inequality {
                    id,
                    lower_bound,
                    upper_bound,
                    ..
                } => solver.add_inequality_constraint(
                    id,
                    variables,
                    coefficients,
                    *lower_bound,
                    *upper_bound,
                )?,
            }
        }
        solver.clear_objective()?;
        for term in self.objective.terms() {
            solver.add_linear_objective_term(&term.variable, term.coefficient)?;
        }
        solver.set_objective_sense(self.objective.sense())?;
        Ok(solver.solve()?)
    }

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists);
        };
        if variable.lower_bound > variable.upper_bound {
            return Err(ProblemError::InvalidVariableBounds);
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        if self.constraints.contains_key(constraint.get_id()) {
            return Err(ProblemError::ConstraintAlreadyExists);
        }
        let (lower_bound, upper_bound) = constraint.bounds();
        if lower_bound > upper_bound {
            return Err(ProblemError::InvalidConstraintBounds);
        }
        if constraint
            .get_variables()
            .any(|v| !self.variables.contains_key(v))
        {
            return Err(ProblemError::NonExistentVariablesInConstraint);
        }
        Ok(())
    }
    // endregion Validation Functions

    fn fix_variable_indices(&mut self) {
        self.variables
            .values_mut()
            .enumerate()
            .for_each(|(ind, var)| var.index = ind);
    }
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add a variable with the same id as an existing variable")]
    VariableIdAlreadyExists,
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to add a variable with lower_bound>upper_bound")]
    InvalidVariableBounds,
    /// Error when a variable can't be built
    #[error("Unable to build variable: {0}")]
    InvalidVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add a constraint with the same id as an existing constraint")]
    ConstraintAlreadyExists,
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add an inequality constraint with lower_bound > upper_bound")]
    InvalidConstraintBounds,
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Tried to add a constraint with variables not in the model")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the model
    #[error("Tried adding an objective term with variables not in the model")]
    NonExistentVariablesInObjective,
    /// Error when trying to perform an update or drop on a variable that doesn't exist
    #[error("Tried to access a variable that doesn't exist")]
    NonExistentVariable,
    /// The solver rejected the problem
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverError),
}

impl From<crate::optimize::variable::VariableBuilderError> for ProblemError {
    fn from(value: crate::optimize::variable::VariableBuilderError) -> Self {
        ProblemError::InvalidVariable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::clarabel::ClarabelSolver;
    use crate::optimize::OptimizationStatus;

    #[test]
    fn new_problem() {
        let max_problem = Problem::new_maximization();
        assert_eq!(max_problem.objective.sense(), ObjectiveSense::Maximize);

        let min_problem = Problem::new_minimization();
        assert_eq!(min_problem.objective.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn update_objective_sense() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.update_objective_sense(ObjectiveSense::Minimize);
        assert_eq!(problem.objective.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn add_variables() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", None, 64., 100.).unwrap();
        problem.add_new_variable("y", Some("why"), 0., 1.).unwrap();
        let x = problem.variables.get("x").expect("Variable not added to model");
        assert_eq!(x.index(), 0);
        assert!((x.lower_bound - 64.0).abs() < 1e-25);
        assert!((x.upper_bound - 100.0).abs() < 1e-25);
        assert_eq!(problem.variables.get("y").unwrap().index(), 1);

        assert!(matches!(
            problem.add_new_variable("x", None, 0., 1.),
            Err(ProblemError::VariableIdAlreadyExists)
        ));
    }

    #[test]
    fn add_bad_variable() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        let res = problem.add_new_variable("x", None, 100., 64.);
        assert!(matches!(res, Err(ProblemError::InvalidVariableBounds)));
    }

    #[test]
    fn add_constraint() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", None, 64., 100.).unwrap();
        problem.add_new_variable("y", None, 64., 100.).unwrap();

        problem
            .add_new_equality_constraint("test_constraint", &["x", "y"], &[2., 3.], 200.)
            .unwrap();
        match problem.constraints.get("test_constraint").unwrap() {
            Constraint::Equality { equals, .. } => assert!((equals - 200.).abs() < 1e-25),
            Constraint::Inequality { .. } => panic!("Incorrect constraint type added"),
        }

        // Same id is rejected
        assert!(matches!(
            problem.add_new_inequality_constraint("test_constraint", &["x"], &[1.], 0., 1.),
            Err(ProblemError::ConstraintAlreadyExists)
        ));
        // Unknown variables are rejected
        assert!(matches!(
            problem.add_new_inequality_constraint("other", &["z"], &[1.], 0., 1.),
            Err(ProblemError::NonExistentVariablesInConstraint)
        ));
    }

    #[test]
    fn add_bad_constraint() {
        let mut problem = Problem::new(ObjectiveSense::Maximize);
        problem.add_new_variable("x", None, 64., 100.).unwrap();
        problem.add_new_variable("y", None, 64., 100.).unwrap();
        let res = problem.add_new_inequality_constraint(
            "bad_constraint",
            &["x", "y"],
            &[2., 3.],
            200.,
            100.,
        );
        assert!(matches!(res, Err(ProblemError::InvalidConstraintBounds)));
    }

    #[test]
    fn delete_variable_removes_terms() {
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., 1.).unwrap();
        problem.add_new_variable("y", None, 0., 1.).unwrap();
        problem
            .add_new_inequality_constraint("c", &["x", "y"], &[1., 1.], 0., 1.)
            .unwrap();
        problem.add_new_linear_objective_term("x", 1.).unwrap();
        problem.delete_variable("x").unwrap();
        assert_eq!(problem.variables.get("y").unwrap().index(), 0);
        assert_eq!(
            problem.constraints.get("c").unwrap().get_variables().count(),
            1
        );
        assert!(problem.objective.terms().is_empty());
    }

    #[test]
    fn solve_small_lp() {
        // max x + y, x + 2y <= 4, 3x + y <= 6
        let mut problem = Problem::new_maximization();
        problem.add_new_variable("x", None, 0., f64::INFINITY).unwrap();
        problem.add_new_variable("y", None, 0., f64::INFINITY).unwrap();
        problem
            .add_new_inequality_constraint("c1", &["x", "y"], &[1., 2.], f64::NEG_INFINITY, 4.)
            .unwrap();
        problem
            .add_new_inequality_constraint("c2", &["x", "y"], &[3., 1.], f64::NEG_INFINITY, 6.)
            .unwrap();
        problem.add_new_linear_objective_term("x", 1.).unwrap();
        problem.add_new_linear_objective_term("y", 1.).unwrap();

        let solution = problem.solve_with(&mut ClarabelSolver::new()).unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 2.8).abs() < 1e-5);
        let values = solution.variable_values.unwrap();
        assert!((values["x"] - 1.6).abs() < 1e-5);
        assert!((values["y"] - 1.2).abs() < 1e-5);
    }
}
