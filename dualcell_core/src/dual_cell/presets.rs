//! Scenario tables for the C4 NADP-ME leaf built on PlantCoreMetabolism
use indexmap::IndexMap;

use crate::dual_cell::configurator::{ConfiguratorConfig, EnergyRatio, MaintenanceCost};

/// Pyruvate/malate antiporter added to the base network before partitioning
pub const PYRUVATE_MALATE_TRANSPORTER: &str =
    "PYR_MAL_pc, Pyruvate/Malate transporter | PYRUVATE_p + MAL_c <-> PYRUVATE_c + MAL_p";

fn table(entries: &[(&str, f64, f64)]) -> IndexMap<String, (f64, f64)> {
    entries
        .iter()
        .map(|(id, lower, upper)| (id.to_string(), (*lower, *upper)))
        .collect()
}

/// Autotrophic import/export conditions of the base network
pub fn autotrophic_base() -> ConfiguratorConfig {
    ConfiguratorConfig {
        bounds: table(&[
            ("CO2_tx", -1000., 1000.),
            ("H2O_tx", -1000., 1000.),
            ("NH4_tx", 0., 0.),
            ("Pi_tx", 0., 1000.),
            ("SO4_tx", 0., 1000.),
            ("O2_tx", -1000., 1000.),
            // Exported but not imported
            ("Sucrose_tx", -1000., 0.),
            ("GLC_tx", -1000., 0.),
            ("ATPase_tx", 0., 1000.),
            // The plastidic ATP/ADP translocator only runs at night
            ("ATP_ADP_Pi_pc", 0., 0.),
        ]),
        ..Default::default()
    }
}

/// Bounds and relations forcing the NADP-ME subtype of C4 photosynthesis
///
/// Expects mesophyll reactions under `M_` and bundle sheath reactions under `B_`.
pub fn c4_nadp_me() -> ConfiguratorConfig {
    ConfiguratorConfig {
        bounds: table(&[
            // Suberized bundle sheath walls take up no CO2
            ("B_CO2_tx", 0., 0.),
            // No Rubisco in the mesophyll
            ("M_RIBULOSE_BISPHOSPHATE_CARBOXYLASE_RXN_p", 0., 0.),
            ("M_RXN_961_p", 0., 0.),
            // Only plastidic NADP-ME decarboxylates in the bundle sheath
            ("B_PEPCARBOXYKIN_RXN_c", 0., 0.),
            ("B_1_PERIOD_1_PERIOD_1_PERIOD_39_RXN_m", 0., 0.),
            ("B_MALIC_NADP_RXN_c", 0., 0.),
            ("B_CARBAMATE_KINASE_RXN_p", 0., 1000.),
            ("M_CARBAMATE_KINASE_RXN_p", 0., 1000.),
            ("B_ISOCITDEH_RXN_m", 0., 1000.),
            ("M_ISOCITDEH_RXN_m", 0., 1000.),
            ("B_ISOCITDEH_RXN_c", 0., 1000.),
            ("M_ISOCITDEH_RXN_c", 0., 1000.),
            ("B_ISOCITRATE_DEHYDROGENASE_NAD_RXN_m", 0., 1000.),
            ("M_ISOCITRATE_DEHYDROGENASE_NAD_RXN_m", 0., 1000.),
            // Malate enters the bundle sheath plastid
            ("B_OAA_MAL_pc", 0., 1000.),
            ("B_PYRUVATE_pc", 0., 0.),
            ("M_PYRUVATEORTHOPHOSPHATE_DIKINASE_RXN_c", 0., 0.),
        ]),
        maintenance: vec![
            MaintenanceCost::for_partition("B_"),
            MaintenanceCost::for_partition("M_"),
        ],
        energy_ratios: vec![
            EnergyRatio::for_partition("B_"),
            EnergyRatio::for_partition("M_"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reaction_string::ReactionSpec;

    #[test]
    fn bounds_are_ordered() {
        for config in [autotrophic_base(), c4_nadp_me()] {
            assert!(config.bounds.values().all(|(lower, upper)| lower <= upper));
        }
    }

    #[test]
    fn c4_tables_are_partitioned() {
        let config = c4_nadp_me();
        assert!(config
            .bounds
            .keys()
            .all(|id| id.starts_with("M_") || id.starts_with("B_")));
        assert_eq!(config.maintenance.len(), 2);
        assert_eq!(config.energy_ratios[1].energy, "M_ATPase_tx");
        assert!(autotrophic_base().maintenance.is_empty());
    }

    #[test]
    fn transporter_parses() {
        let spec = ReactionSpec::parse(PYRUVATE_MALATE_TRANSPORTER).unwrap();
        assert_eq!(spec.id, "PYR_MAL_pc");
        assert_eq!(spec.equation.metabolites.len(), 4);
    }
}
