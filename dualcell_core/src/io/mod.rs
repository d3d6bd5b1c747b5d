//! Module for reading and writing Models and the auxiliary tables of the dual-cell pipeline
pub mod biomass;
pub mod exclusion;
pub mod gpr_parse;
pub mod json;
pub mod reaction_string;
