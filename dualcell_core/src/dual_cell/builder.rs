//! End to end assembly of a dual-cell model
use indexmap::IndexMap;
use log::info;

use crate::dual_cell::configurator::{Configurator, ConfiguratorConfig};
use crate::dual_cell::simulation::{simulate, Scenario, ScenarioReactions};
use crate::dual_cell::transport::{SynthesisConfig, SynthesisReport, TransporterSynthesis};
use crate::dual_cell::{merge, partition, DualCellError};
use crate::io::reaction_string::add_reaction_from_str;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::solution::Solution;
use crate::optimize::objective::ObjectiveSense;

/// A configured dual-cell model and what the coupling synthesis did
#[derive(Debug, Clone)]
pub struct DualCell {
    pub model: Model,
    pub report: SynthesisReport,
}

impl DualCell {
    /// See [`simulate`]
    pub fn simulate(
        &mut self,
        reactions: &ScenarioReactions,
        scenario: Scenario,
    ) -> Result<Solution, DualCellError> {
        simulate(&mut self.model, reactions, scenario)
    }
}

/// Steps applied to a base network to obtain a [`DualCell`]
///
/// 1. add the extra reactions and set the objective of the base network
/// 2. apply the base configuration (shared import/export conditions)
/// 3. partition the base under the source and target prefixes and merge the copies
/// 4. synthesize the coupling transporters
/// 5. apply the dual-cell configuration
///
/// The base network passed to [`DualCellBuilder::build`] is never modified.
pub struct DualCellBuilder {
    base_reactions: Vec<String>,
    objective: Option<String>,
    base_configurator: Configurator,
    synthesis: TransporterSynthesis,
    configurator: Configurator,
}

impl DualCellBuilder {
    pub fn new(synthesis: SynthesisConfig) -> Self {
        DualCellBuilder {
            base_reactions: Vec::new(),
            objective: None,
            base_configurator: Configurator::new(ConfiguratorConfig::default()),
            synthesis: TransporterSynthesis::new(synthesis),
            configurator: Configurator::new(ConfiguratorConfig::default()),
        }
    }

    /// Reaction specification added to the base network before partitioning
    pub fn with_base_reaction(mut self, specification: &str) -> Self {
        self.base_reactions.push(specification.to_string());
        self
    }

    /// Reaction of the base network to maximize, the merged model maximizes its source copy
    pub fn with_objective(mut self, reaction: &str) -> Self {
        self.objective = Some(reaction.to_string());
        self
    }

    pub fn with_base_configuration(mut self, config: ConfiguratorConfig) -> Self {
        self.base_configurator = Configurator::new(config);
        self
    }

    pub fn with_configuration(mut self, config: ConfiguratorConfig) -> Self {
        self.configurator = Configurator::new(config);
        self
    }

    pub fn build(&self, base: &Model) -> Result<DualCell, DualCellError> {
        let mut base = base.clone();
        for specification in &self.base_reactions {
            add_reaction_from_str(&mut base, specification)?;
        }
        if let Some(objective) = &self.objective {
            base.set_objective(
                IndexMap::from([(objective.clone(), 1.)]),
                ObjectiveSense::Maximize,
            )?;
        }
        self.base_configurator.apply(&mut base)?;

        let config = self.synthesis.config();
        let source = partition(&base, &config.source_prefix)?;
        let target = partition(&base, &config.target_prefix)?;
        let mut model = merge(source, target)?;
        let report = self.synthesis.run(&mut model)?;
        self.configurator.apply(&mut model)?;
        model.validate()?;
        info!(
            "Dual-cell model ready: {} reactions, {} metabolites, {} constraints",
            model.reactions.len(),
            model.metabolites.len(),
            model.constraints().len()
        );
        Ok(DualCell { model, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual_cell::configurator::MaintenanceCost;
    use crate::dual_cell::ConstructionError;
    use crate::metabolic_model::metabolite::Metabolite;

    fn base() -> Model {
        let mut model = Model::new_empty();
        for m in ["hnu_c", "ATP_c", "MAL_c", "NO3_c"] {
            model.add_metabolite(Metabolite::new(m, Some("c"))).unwrap();
        }
        for spec in [
            "Photon_tx | --> hnu_c",
            "Nitrate_tx | --> NO3_c",
            "Cyclic | hnu_c --> ATP_c",
            "ATPase_tx | ATP_c -->",
            "FIX_c | hnu_c --> MAL_c",
        ] {
            add_reaction_from_str(&mut model, spec).unwrap();
        }
        model
    }

    fn builder() -> DualCellBuilder {
        DualCellBuilder::new(
            SynthesisConfig::default()
                .with_exclusion(["hnu", "ATP"].iter().map(|f| f.to_string()).collect()),
        )
        .with_base_reaction("Growth, growth | MAL_c + NO3_c -->")
        .with_objective("Growth")
        .with_configuration(ConfiguratorConfig {
            bounds: IndexMap::from([("B_Nitrate_tx".to_string(), (0., 0.))]),
            maintenance: vec![
                MaintenanceCost::for_partition("M_"),
                MaintenanceCost::for_partition("B_"),
            ],
            energy_ratios: Vec::new(),
        })
    }

    #[test]
    fn pipeline() {
        let base = base();
        let snapshot = base.clone();
        let mut dual = builder().build(&base).unwrap();
        assert_eq!(base, snapshot);
        assert_eq!(
            dual.report.created,
            vec!["MB_MAL_c".to_string(), "MB_NO3_c".to_string()]
        );
        assert_eq!(dual.model.reactions.len(), 2 * 6 + 2);
        assert_eq!(
            dual.model.objective,
            IndexMap::from([("M_Growth".to_string(), 1.)])
        );
        assert_eq!(dual.model.constraints().len(), 2);
        let solution = dual
            .simulate(
                &ScenarioReactions::default(),
                Scenario {
                    light: 100.,
                    nitrogen: 10.,
                },
            )
            .unwrap();
        assert!(solution.is_optimal());
        assert!((solution.objective_value.unwrap() - 10.).abs() < 1e-4);
        assert_eq!(dual.model.constraints().len(), 2);
    }

    #[test]
    fn unknown_objective() {
        let result = builder().with_objective("Missing").build(&base());
        assert!(matches!(
            result,
            Err(DualCellError::Reference { kind: "reaction", .. })
        ));
    }

    #[test]
    fn identical_prefixes_collide() {
        let builder = DualCellBuilder::new(SynthesisConfig::default().with_prefixes("X_", "X_", "XX_"));
        assert!(matches!(
            builder.build(&base()),
            Err(DualCellError::Construction(ConstructionError::Collision { .. }))
        ));
    }
}
