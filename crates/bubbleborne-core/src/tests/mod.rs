//! Crate-level scenario tests.
//!
//! - `determinism.rs`: identical inputs give identical runs
//! - `integration.rs`: end-to-end scenarios through [`crate::Simulation`]
//! - `properties.rs`: property tests over the motion and size rules
//! - `helpers.rs`: level factories and inspection utilities

mod determinism;
mod helpers;
mod properties;

// Re-export for convenience
pub use helpers::*;
