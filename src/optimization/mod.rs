//! Genetic algorithm optimization for solar site design.
//!
//! A [`DesignSpace`] describes what each gene means and where the result is
//! written; an [`ObjectiveFunction`] scores decoded parameter sets; the
//! [`Optimizer`] breeds a [`Population`] of [`Individual`]s between them.
//!
//! # Example
//!
//! ```
//! use solar_tilt_ga::optimization::{FnObjective, GaParameters, SolarPanelTiltAngleOptimizer};
//! use solar_tilt_ga::site::SolarPanel;
//!
//! let mut panels = vec![SolarPanel::new(10.0), SolarPanel::new(-20.0)];
//!
//! // Prefer tilts close to 30 degrees.
//! let objective = FnObjective::new(|angles: &[f64]| {
//!     Ok(-angles.iter().map(|a| (a - 30.0).powi(2)).sum::<f64>())
//! });
//!
//! let params = GaParameters::default()
//!     .with_population_size(16)
//!     .with_maximum_generations(10)
//!     .with_seed(42);
//!
//! let mut optimizer =
//!     SolarPanelTiltAngleOptimizer::tilt_angles(&mut panels, objective, params).unwrap();
//! let result = optimizer.evolve().unwrap();
//!
//! println!("{}", result);
//! for panel in optimizer.panels() {
//!     println!("  tilt: {:.1}°", panel.tilt_angle);
//! }
//! ```

pub mod algorithm;
pub mod codec;
pub mod crossover;
pub mod design;
pub mod individual;
pub mod layout;
pub mod mutation;
pub mod objective;
pub mod population;
pub mod selection;
pub mod tilt;
pub mod types;

// Re-export commonly used items
pub use algorithm::Optimizer;
pub use codec::{GeneCodec, GeneDescriptor, LinearCodec, TiltAngleCodec, decode_genes};
pub use crossover::{perform_crossover, single_point_crossover, uniform_crossover};
pub use design::{ChromosomeShape, DesignSpace, LayoutDesign, TiltAngleDesign};
pub use individual::Individual;
pub use layout::LayoutOptimizer;
pub use mutation::{mutate_individual, perturb_gene};
pub use objective::{
    CancellationFlag, FnObjective, MaybeSync, ObjectiveFunction, ObjectiveType, RandomObjective,
};
pub use population::Population;
pub use selection::{
    niche_count, roulette_wheel_select, select_mating_pair, select_parent, sharing_weights,
    tournament_select,
};
pub use tilt::SolarPanelTiltAngleOptimizer;
pub use types::{
    CrossoverMethod, EvaluationFailurePolicy, GaParameters, MutationMethod, OptimizationResult,
    OptimizerState, PopulationStats, ProgressUpdate, SearchMethod, SelectionMethod, StopReason,
};
