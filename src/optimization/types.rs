//! Type definitions for the genetic algorithm.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::individual::Individual;

/// Parent selection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMethod {
    /// Fitness proportional with fitness sharing
    #[default]
    RouletteWheel,
    /// Binary tournament
    Tournament,
}

/// How the initial population is spread and whether mutation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMethod {
    /// Random initial population, mutation every generation.
    #[default]
    GlobalSearchUniformSelection,
    /// Population perturbed around the current design, no mutation.
    LocalSearchRandomOptimization,
}

/// Recombination operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossoverMethod {
    /// Each gene from either parent with equal odds
    #[default]
    Uniform,
    /// Head of one parent, tail of the other
    SinglePoint,
}

/// Mutation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationMethod {
    /// Replace the gene with a fresh uniform draw
    #[default]
    Uniform,
    /// Add Gaussian noise scaled by the local search radius
    Gaussian,
}

/// What to do when the objective function returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationFailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Score the individual with negative infinity and keep going.
    WorstFitness,
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaParameters {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Generation budget; evolution only runs when greater than 1
    pub maximum_generations: usize,
    /// Fraction of the population kept as parents (0-1)
    pub selection_rate: f64,
    /// Probability that a child mixes both parents (0-1)
    pub crossover_rate: f64,
    /// Per-gene mutation probability (0-1)
    pub mutation_rate: f64,
    /// Gene spread below which the population counts as converged
    pub convergence_threshold: f64,
    /// Fraction of the best individuals inspected for convergence
    pub beta: f64,
    /// Fitness sharing radius in normalized gene space
    pub sharing_radius: f64,
    /// Number of gene levels, 0 = continuous
    pub discretization_steps: usize,
    /// Perturbation radius for local search and Gaussian mutation
    pub local_search_radius: f64,
    pub selection_method: SelectionMethod,
    pub search_method: SearchMethod,
    pub crossover_method: CrossoverMethod,
    pub mutation_method: MutationMethod,
    pub failure_policy: EvaluationFailurePolicy,
    /// Optional cap on objective evaluations
    pub maximum_evaluations: Option<usize>,
    /// Optional wall-clock limit for `evolve`
    pub time_limit_ms: Option<u64>,
    /// RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for GaParameters {
    fn default() -> Self {
        Self {
            population_size: 20,
            maximum_generations: 5,
            selection_rate: 0.5,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            convergence_threshold: 0.01,
            beta: 0.5,
            sharing_radius: 0.1,
            discretization_steps: 0,
            local_search_radius: 0.1,
            selection_method: SelectionMethod::RouletteWheel,
            search_method: SearchMethod::GlobalSearchUniformSelection,
            crossover_method: CrossoverMethod::Uniform,
            mutation_method: MutationMethod::Uniform,
            failure_policy: EvaluationFailurePolicy::Abort,
            maximum_evaluations: None,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl GaParameters {
    /// Parse parameters from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_maximum_generations(mut self, maximum_generations: usize) -> Self {
        self.maximum_generations = maximum_generations;
        self
    }

    pub fn with_search_method(mut self, search_method: SearchMethod) -> Self {
        self.search_method = search_method;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every rate and radius is usable.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::invalid("population size must be at least 1"));
        }

        let rates = [
            ("selection rate", self.selection_rate),
            ("crossover rate", self.crossover_rate),
            ("mutation rate", self.mutation_rate),
            ("beta", self.beta),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::invalid(format!("{name} must be within [0, 1], got {rate}")));
            }
        }

        let radii = [
            ("convergence threshold", self.convergence_threshold),
            ("sharing radius", self.sharing_radius),
            ("local search radius", self.local_search_radius),
        ];
        for (name, value) in radii {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::invalid(format!("{name} must be positive, got {value}")));
            }
        }

        Ok(())
    }
}

/// Population statistics over evaluated individuals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationStats {
    pub best_fitness: f64,
    pub worst_fitness: f64,
    pub average_fitness: f64,
    pub standard_deviation: f64,
    pub evaluated: usize,
}

/// Why the generation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    GenerationsExhausted,
    EvaluationsExhausted,
    Converged,
    Cancelled,
    TimeLimit,
    /// `maximum_generations` was not above 1, so nothing ran.
    NotRun,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::GenerationsExhausted => "generation budget exhausted",
            StopReason::EvaluationsExhausted => "evaluation budget exhausted",
            StopReason::Converged => "converged",
            StopReason::Cancelled => "cancelled",
            StopReason::TimeLimit => "time limit reached",
            StopReason::NotRun => "not run",
        };
        f.write_str(text)
    }
}

/// Lifecycle of an optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    NotStarted,
    Evolving,
    Terminated(StopReason),
    Applied,
}

/// Progress update emitted after every generation.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub generation: usize,
    pub evaluations: usize,
    pub fittest: Option<Individual>,
    pub stats: Option<PopulationStats>,
    pub converged: bool,
    pub rolled_back: bool,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub gene_names: Vec<String>,
    /// Domain values before optimization
    pub initial_genes: Vec<f64>,
    /// Domain values written back, empty if nothing was applied
    pub final_genes: Vec<f64>,
    pub final_fitness: Option<f64>,
    pub generations: usize,
    pub evaluations: usize,
    pub converged: bool,
    pub stop_reason: StopReason,
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Generations: {}", self.generations)?;
        writeln!(f, "  Evaluations: {}", self.evaluations)?;
        writeln!(f, "  Stopped: {}", self.stop_reason)?;
        match self.final_fitness {
            Some(fitness) => writeln!(f, "  Final fitness: {:.6}", fitness)?,
            None => writeln!(f, "  Final fitness: n/a")?,
        }
        writeln!(f, "  Genes:")?;
        for (i, name) in self.gene_names.iter().enumerate() {
            let initial = self.initial_genes.get(i).copied().unwrap_or(f64::NAN);
            match self.final_genes.get(i) {
                Some(value) => writeln!(f, "    {}: {:.4} -> {:.4}", name, initial, value)?,
                None => writeln!(f, "    {}: {:.4}", name, initial)?,
            }
        }
        Ok(())
    }
}
