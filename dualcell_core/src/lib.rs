//! Construction and simulation of two cell type metabolic models.
//!
//! A base network is duplicated under two prefixes, the copies are merged, shared cytosolic
//! metabolites are linked by coupling transporters, and physiological bounds and relations are
//! layered on top before flux balance analysis. See [`dual_cell`] for the pipeline and
//! [`metabolic_model`] for the underlying network registry.

pub mod configuration;
pub mod dual_cell;
pub mod io;
pub mod metabolic_model;
pub mod optimize;
mod utils;
