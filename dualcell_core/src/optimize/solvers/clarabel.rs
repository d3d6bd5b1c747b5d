//! Implements a solver interface for Clarabel
//!
//! Clarabel solves `min 1/2 x'Px + q'x` subject to `Ax + s = b`, `s` in a product of cones.
//! Equalities go into a zero cone, every finite side of an inequality or variable bound
//! becomes one row of a non-negative cone.
use clarabel::algebra::CscMatrix;
use clarabel::solver::*;
use indexmap::IndexMap;
use log::{debug, trace};
use nalgebra_sparse::coo::CooMatrix;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Row of the constraint matrix, with the constraint it came from and its sign
struct Row {
    owner: Option<usize>,
    sign: f64,
    terms: Vec<(usize, f64)>,
    rhs: f64,
}

#[derive(Clone, Debug)]
struct LinearRow {
    id: String,
    terms: Vec<(usize, f64)>,
    lower_bound: f64,
    upper_bound: f64,
}

/// Interior point solver backed by the clarabel crate
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    variables: IndexMap<String, (f64, f64)>,
    constraints: Vec<LinearRow>,
    objective: IndexMap<usize, f64>,
    sense: ObjectiveSense,
    max_iter: u32,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClarabelSolver {
    pub fn new() -> Self {
        ClarabelSolver {
            variables: IndexMap::new(),
            constraints: Vec::new(),
            objective: IndexMap::new(),
            sense: ObjectiveSense::Maximize,
            max_iter: 200,
        }
    }

    /// Limit the number of interior point iterations
    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn variable_index(&self, id: &str) -> Result<usize, SolverError> {
        self.variables
            .get_index_of(id)
            .ok_or_else(|| SolverError::UnknownVariable(id.to_string()))
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
            .map(|(v, c)| Ok((self.variable_index(v)?, c)))
            .collect()
    }

    /// Split every bound into zero cone rows (fixed values) and non-negative cone rows
    fn assemble_rows(&self) -> (Vec<Row>, Vec<Row>) {
        let mut zero_rows = Vec::new();
        let mut nonneg_rows = Vec::new();
        let mut push_bounds =
            |owner: Option<usize>, terms: Vec<(usize, f64)>, lower: f64, upper: f64| {
                if lower == upper {
                    zero_rows.push(Row {
                        owner,
                        sign: 1.,
                        terms,
                        rhs: upper,
                    });
                    return;
                }
                if lower.is_finite() {
                    nonneg_rows.push(Row {
                        owner,
                        sign: -1.,
                        terms: terms.iter().map(|(i, c)| (*i, -c)).collect(),
                        rhs: -lower,
                    });
                }
                if upper.is_finite() {
                    nonneg_rows.push(Row {
                        owner,
                        sign: 1.,
                        terms,
                        rhs: upper,
                    });
                }
            };
        for (index, (_, (lower, upper))) in self.variables.iter().enumerate() {
            push_bounds(None, vec![(index, 1.)], *lower, *upper);
        }
        for (index, cons) in self.constraints.iter().enumerate() {
            push_bounds(
                Some(index),
                cons.terms.clone(),
                cons.lower_bound,
                cons.upper_bound,
            );
        }
        (zero_rows, nonneg_rows)
    }
}

impl Solver for ClarabelSolver {
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
            id: id.to_string(),
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
            id: id.to_string(),
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
        let index = self.variable_index(variable_id)?;
        *self.objective.entry(index).or_insert(0.) += coefficient;
        Ok(())
    }

    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError> {
        self.sense = objective_sense;
        Ok(())
    }

    fn clear_objective(&mut self) -> Result<(), SolverError> {
        self.objective.clear();
        Ok(())
    }

    fn solve(&mut self) -> Result<ProblemSolution, SolverError> {
        let n = self.variables.len();
        if n == 0 {
            return Ok(ProblemSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(0.),
                variable_values: Some(IndexMap::new()),
                dual_values: Some(IndexMap::new()),
            });
        }
        let (zero_rows, nonneg_rows) = self.assemble_rows();
        let num_zero = zero_rows.len();
        let rows: Vec<Row> = zero_rows.into_iter().chain(nonneg_rows).collect();
        let m = rows.len();

        let mut coo = CooMatrix::new(m, n);
        let mut b = Vec::with_capacity(m);
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in &row.terms {
                coo.push(r, *c, *v);
            }
            b.push(row.rhs);
        }
        let (col_offsets, row_indices, values) =
            nalgebra_sparse::csc::CscMatrix::from(&coo).disassemble();
        let a = CscMatrix::new(m, n, col_offsets, row_indices, values);
        let p = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());

        // Clarabel minimizes, a maximization is solved as min -c'x
        let direction = match self.sense {
            ObjectiveSense::Maximize => -1.,
            ObjectiveSense::Minimize => 1.,
        };
        let mut q = vec![0.; n];
        for (index, coefficient) in &self.objective {
            q[*index] = direction * coefficient;
        }

        let mut cones = Vec::new();
        if num_zero > 0 {
            cones.push(ZeroConeT(num_zero));
        }
        if m > num_zero {
            cones.push(NonnegativeConeT(m - num_zero));
        }
        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .max_iter(self.max_iter)
            .build()
            .map_err(|e| SolverError::Settings(e.to_string()))?;

        debug!(
            "Solving with Clarabel: {} variables, {} equality rows, {} inequality rows",
            n,
            num_zero,
            m - num_zero
        );
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();
        trace!("Clarabel finished with status {:?}", solver.solution.status);

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        if !status.has_values() {
            return Ok(ProblemSolution::without_values(status));
        }

        let x = &solver.solution.x;
        let variable_values: IndexMap<String, f64> = self
            .variables
            .keys()
            .zip(x.iter())
            .map(|(id, v)| (id.clone(), *v))
            .collect();
        let objective_value: f64 = self.objective.iter().map(|(i, c)| c * x[*i]).sum();
        let mut dual_values: IndexMap<String, f64> = self
            .constraints
            .iter()
            .map(|c| (c.id.clone(), 0.))
            .collect();
        for (row, z) in rows.iter().zip(solver.solution.z.iter()) {
            if let Some(owner) = row.owner {
                dual_values[owner] += row.sign * z;
            }
        }
        Ok(ProblemSolution {
            status,
            objective_value: Some(objective_value),
            variable_values: Some(variable_values),
            dual_values: Some(dual_values),
        })
    }
}
