//! Builds the dual-cell model of the toy leaf network from its data files and runs scenarios
use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use dualcell_core::dual_cell::simulation::{LIGHT_BUDGET_ID, LIGHT_ORDER_ID, NITROGEN_BUDGET_ID};
use dualcell_core::dual_cell::{
    simulate_many, ConfiguratorConfig, DualCell, DualCellBuilder, Scenario, ScenarioReactions,
    SynthesisConfig, TransporterSynthesis,
};
use dualcell_core::io::biomass::{read_biomass_specification, BIOMASS_REACTION_ID};
use dualcell_core::io::exclusion::read_exclusion_list;
use dualcell_core::metabolic_model::model::Model;
use dualcell_core::optimize::OptimizationStatus;

fn data(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(file)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build() -> DualCell {
    init_logging();
    let base = Model::read_json(data("toy_leaf.json")).unwrap();
    let exclusion = read_exclusion_list(data("metabolites.txt")).unwrap();
    let biomass = read_biomass_specification(data("biomass.csv")).unwrap();
    let config = ConfiguratorConfig::read_json(data("c4_toy.json")).unwrap();
    DualCellBuilder::new(SynthesisConfig::default().with_exclusion(exclusion))
        .with_base_reaction(&biomass)
        .with_objective(BIOMASS_REACTION_ID)
        .with_configuration(config)
        .build(&base)
        .unwrap()
}

#[test]
fn base_network_reads() {
    let base = Model::read_json(data("toy_leaf.json")).unwrap();
    assert_eq!(base.reactions.len(), 14);
    assert_eq!(base.metabolites.len(), 10);
    assert_eq!(base.genes.len(), 2);
    assert_eq!(base.groups.len(), 1);
    base.validate().unwrap();
}

#[test]
fn couplings_only_for_shared_cytosolic_metabolites() {
    let dual = build();
    assert_eq!(dual.report.created, vec!["MB_MAL_c", "MB_NO3_c"]);
    assert_eq!(dual.report.ineligible, vec!["MAL_p", "PYR_mc"]);
    // the family decides, whatever the compartment
    assert_eq!(
        dual.report.excluded,
        vec!["hnu_c", "CO2_c", "ATP_c", "NADPH_c", "NADPH_p", "NADPH_m"]
    );
    assert!(dual.report.failed.is_empty());

    let mal = dual.model.reaction("MB_MAL_c").unwrap();
    assert_eq!(mal.metabolites.get("M_MAL_c"), Some(&-1.));
    assert_eq!(mal.metabolites.get("B_MAL_c"), Some(&1.));
    assert!(mal.lower_bound < 0. && mal.upper_bound > 0.);

    // 2 copies of 14 reactions and the biomass reaction, plus 2 couplings
    assert_eq!(dual.model.reactions.len(), 32);
    assert_eq!(dual.model.metabolites.len(), 20);
    assert_eq!(dual.model.objective.get("M_New_biomass_tx"), Some(&1.));
    assert!(dual.model.genes.contains_key("M_GRMZM2G083841"));
    assert!(dual.model.groups.contains_key("B_light_reactions"));
}

#[test]
fn synthesis_is_idempotent_on_the_built_model() {
    let mut dual = build();
    let before = dual.model.clone();
    let exclusion = read_exclusion_list(data("metabolites.txt")).unwrap();
    let report = TransporterSynthesis::new(SynthesisConfig::default().with_exclusion(exclusion))
        .run(&mut dual.model)
        .unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.existing, vec!["MAL_c", "NO3_c"]);
    assert_eq!(dual.model, before);
}

#[test]
fn configuration_is_applied() {
    let dual = build();
    let co2 = dual.model.reaction("B_CO2_tx").unwrap();
    assert_eq!((co2.lower_bound, co2.upper_bound), (0., 0.));
    for id in [
        "M_maintenance",
        "B_maintenance",
        "M_ATP_NADPH_ratio",
        "B_ATP_NADPH_ratio",
    ] {
        assert!(dual.model.constraint(id).is_some(), "missing {id}");
    }
}

#[test]
fn nitrogen_limited_growth() {
    let mut dual = build();
    let reactions = ScenarioReactions::default();
    let solution = dual
        .simulate(
            &reactions,
            Scenario {
                light: 500.,
                nitrogen: 50.,
            },
        )
        .unwrap();
    assert_eq!(solution.status, OptimizationStatus::Optimal);
    assert_abs_diff_eq!(solution.objective_value.unwrap(), 50., epsilon = 1e-4);

    let flux = |id: &str| solution.flux(id).unwrap();
    for p in ["M_", "B_"] {
        assert_abs_diff_eq!(
            flux(&format!("{p}ATPase_tx")),
            0.0049 * flux(&format!("{p}Photon_tx")) + 2.7852,
            epsilon = 1e-4
        );
        let carriers: f64 = ["NADPHoxc_tx", "NADPHoxp_tx", "NADPHoxm_tx"]
            .iter()
            .map(|c| flux(&format!("{p}{c}")))
            .sum();
        assert_abs_diff_eq!(flux(&format!("{p}ATPase_tx")), 3. * carriers, epsilon = 1e-4);
    }
    assert!(flux("M_Photon_tx") + flux("B_Photon_tx") <= 500. + 1e-4);
    assert!(flux("M_Photon_tx") >= flux("B_Photon_tx") - 1e-4);
    assert!(flux("M_Nitrate_tx") + flux("B_Nitrate_tx") <= 50. + 1e-4);
    assert_abs_diff_eq!(flux("B_CO2_tx"), 0., epsilon = 1e-4);
}

#[test]
fn too_little_light_for_maintenance() {
    let mut dual = build();
    let solution = dual
        .simulate(
            &ScenarioReactions::default(),
            Scenario {
                light: 5.,
                nitrogen: 50.,
            },
        )
        .unwrap();
    assert!(!solution.is_optimal());
}

#[test]
fn scenarios_leave_the_model_unchanged() {
    let mut dual = build();
    let before = dual.model.clone();
    let scenarios: Vec<Scenario> = [5., 50., 100., 500.]
        .into_iter()
        .map(|light| Scenario {
            light,
            nitrogen: 50.,
        })
        .collect();
    let solutions =
        simulate_many(&mut dual.model, &ScenarioReactions::default(), &scenarios).unwrap();
    assert_eq!(solutions.len(), 4);
    assert!(!solutions[0].is_optimal());
    assert!(solutions[1..].iter().all(|s| s.is_optimal()));
    // growth never decreases with more light
    for pair in solutions[1..].windows(2) {
        assert!(pair[1].objective_value.unwrap() >= pair[0].objective_value.unwrap() - 1e-4);
    }

    assert_eq!(dual.model, before);
    for id in [LIGHT_BUDGET_ID, LIGHT_ORDER_ID, NITROGEN_BUDGET_ID] {
        assert!(dual.model.constraint(id).is_none());
    }
}

#[test]
fn dual_model_round_trips_through_json() {
    let dual = build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c4_toy.json");
    dual.model.write_json(&path).unwrap();
    let read = Model::read_json(&path).unwrap();
    assert_eq!(
        read.reactions.keys().collect::<Vec<_>>(),
        dual.model.reactions.keys().collect::<Vec<_>>()
    );
    assert_eq!(read.objective, dual.model.objective);
    let mal = read.reaction("MB_MAL_c").unwrap();
    assert_eq!(mal.metabolites.len(), 2);
}
