//! Process-wide defaults shared by every model (default bounds, tolerance, solver)
use std::sync::{LazyLock, RwLock};

use crate::optimize::solvers::SolverKind;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug)]
pub struct Configuration {
    /// Lower bound given to reversible reactions when none is specified
    pub lower_bound: f64,
    /// Upper bound given to reactions when none is specified
    pub upper_bound: f64,
    /// Absolute tolerance used when checking solutions against constraints
    pub tolerance: f64,
    /// Solver used by newly created models
    pub solver: SolverKind,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            solver: SolverKind::Clarabel,
        }
    }
}

impl Configuration {
    /// Copy of the current global configuration
    ///
    /// A poisoned lock is read through.
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
