//! Genetic algorithm optimizer for solar site design.
//!
//! The [`optimization`] module holds the algorithm: individuals, populations,
//! fitness sharing, gene codecs and the generation loop. [`site`] holds the
//! small set of domain objects the optimizer reads from and writes back to.
//! Browser builds expose a JSON interface through `wasm`.

pub mod error;
pub mod optimization;
pub mod site;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{Error, Result};
pub use optimization::{
    GaParameters, ObjectiveFunction, OptimizationResult, Optimizer, SolarPanelTiltAngleOptimizer,
};
pub use site::{Foundation, RectangularBound, SitePoint, SolarPanel};
