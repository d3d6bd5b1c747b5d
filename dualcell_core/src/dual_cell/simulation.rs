//! Light and nitrogen limited optimization of a configured dual-cell model
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::dual_cell::DualCellError;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::solution::Solution;
use crate::optimize::constraint::Constraint;

pub const LIGHT_BUDGET_ID: &str = "light_budget";
pub const LIGHT_ORDER_ID: &str = "light_order";
pub const NITROGEN_BUDGET_ID: &str = "nitrogen_budget";

/// Resource budgets of one simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Total photon uptake of both cells
    pub light: f64,
    /// Total nitrate uptake of both cells
    pub nitrogen: f64,
}

/// Exchange reactions the scenario budgets apply to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReactions {
    /// Photon uptake of the cell that must receive at least half of the light
    pub source_photon: String,
    pub target_photon: String,
    pub source_nitrate: String,
    pub target_nitrate: String,
}

impl ScenarioReactions {
    /// `Photon_tx` and `Nitrate_tx` of both partitions
    pub fn for_prefixes(source: &str, target: &str) -> Self {
        ScenarioReactions {
            source_photon: format!("{source}Photon_tx"),
            target_photon: format!("{target}Photon_tx"),
            source_nitrate: format!("{source}Nitrate_tx"),
            target_nitrate: format!("{target}Nitrate_tx"),
        }
    }

    fn constraints(&self, scenario: &Scenario) -> [Constraint; 3] {
        [
            Constraint::new_inequality(
                LIGHT_BUDGET_ID,
                &[self.target_photon.as_str(), self.source_photon.as_str()],
                &[1., 1.],
                0.,
                scenario.light,
            ),
            Constraint::new_inequality(
                LIGHT_ORDER_ID,
                &[self.source_photon.as_str(), self.target_photon.as_str()],
                &[1., -1.],
                0.,
                scenario.light,
            ),
            Constraint::new_inequality(
                NITROGEN_BUDGET_ID,
                &[self.target_nitrate.as_str(), self.source_nitrate.as_str()],
                &[1., 1.],
                0.,
                scenario.nitrogen,
            ),
        ]
    }
}

impl Default for ScenarioReactions {
    fn default() -> Self {
        ScenarioReactions::for_prefixes("M_", "B_")
    }
}

/// Optimize `model` under the budgets of `scenario`
///
/// The budget constraints only exist for the duration of the call: the model is the same
/// after the call as before, whether the optimization succeeded, was infeasible, or failed.
pub fn simulate(
    model: &mut Model,
    reactions: &ScenarioReactions,
    scenario: Scenario,
) -> Result<Solution, DualCellError> {
    let budgets = reactions.constraints(&scenario);
    let mut scope = model.begin_scope();
    for constraint in &budgets {
        scope.add_constraint(constraint.clone())?;
    }
    debug!(
        "Simulating light {} and nitrogen {}",
        scenario.light, scenario.nitrogen
    );
    let solution = scope.optimize()?;
    scope.rollback();
    if !solution.is_optimal() {
        warn!(
            "Scenario light {} nitrogen {} finished with status {:?}",
            scenario.light, scenario.nitrogen, solution.status
        );
        return Ok(solution);
    }
    let tolerance = Configuration::current().tolerance;
    for budget in &budgets {
        let violation = solution.violation(budget);
        if violation > tolerance {
            warn!(
                "Solution exceeds {} by {:e} (tolerance {:e})",
                budget.get_id(),
                violation,
                tolerance
            );
        }
    }
    Ok(solution)
}

/// Run [`simulate`] for each scenario, e.g. a light response curve
pub fn simulate_many(
    model: &mut Model,
    reactions: &ScenarioReactions,
    scenarios: &[Scenario],
) -> Result<Vec<Solution>, DualCellError> {
    scenarios
        .iter()
        .map(|scenario| simulate(model, reactions, *scenario))
        .collect()
}
