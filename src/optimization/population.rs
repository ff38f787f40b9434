//! Population management for the genetic algorithm.

use std::cmp::Ordering;

use rand::Rng;

use crate::error::{Error, Result};

use super::crossover::perform_crossover;
use super::individual::Individual;
use super::mutation::mutate_individual;
use super::selection::{niche_count, select_mating_pair, sharing_weights};
use super::types::{CrossoverMethod, MutationMethod, PopulationStats, SelectionMethod};

const DEFAULT_BETA: f64 = 0.5;
const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.01;

/// Fixed-size set of individuals plus the snapshot used to roll back an
/// infeasible generation.
///
/// `individuals`, `saved_generation` and `violations` always have the same
/// length.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
    saved_generation: Vec<Individual>,
    violations: Vec<bool>,
    pub selection_method: SelectionMethod,
    pub crossover_method: CrossoverMethod,
    /// Fraction of the best individuals inspected for convergence
    pub beta: f64,
    pub convergence_threshold: f64,
    discretization_steps: usize,
}

impl Population {
    /// Random population of `population_size` individuals.
    pub fn new<R: Rng>(
        population_size: usize,
        chromosome_length: usize,
        discretization_steps: usize,
        rng: &mut R,
    ) -> Self {
        let individuals = (0..population_size)
            .map(|_| Individual::random(chromosome_length, discretization_steps, rng))
            .collect();
        let mut population = Self::from_individuals(individuals);
        population.discretization_steps = discretization_steps;
        population
    }

    /// Population built from existing individuals.
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        let n = individuals.len();
        Self {
            saved_generation: individuals.clone(),
            individuals,
            violations: vec![false; n],
            selection_method: SelectionMethod::default(),
            crossover_method: CrossoverMethod::default(),
            beta: DEFAULT_BETA,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            discretization_steps: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individual(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    pub fn individual_mut(&mut self, index: usize) -> Option<&mut Individual> {
        self.individuals.get_mut(index)
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn saved_generation(&self) -> &[Individual] {
        &self.saved_generation
    }

    pub fn discretization_steps(&self) -> usize {
        self.discretization_steps
    }

    pub fn violations(&self) -> &[bool] {
        &self.violations
    }

    pub fn set_violation(&mut self, index: usize, violated: bool) -> Result<()> {
        let length = self.violations.len();
        let flag = self
            .violations
            .get_mut(index)
            .ok_or(Error::IndividualIndexOutOfBounds { index, length })?;
        *flag = violated;
        Ok(())
    }

    pub(crate) fn violations_mut(&mut self) -> &mut [bool] {
        &mut self.violations
    }

    pub fn clear_violations(&mut self) {
        self.violations.iter_mut().for_each(|v| *v = false);
    }

    /// Stable ascending sort by fitness.
    pub fn sort(&mut self) -> Result<()> {
        self.sort_with(|a, b| a.compare(b))
    }

    /// Stable descending sort by fitness, fittest first.
    pub fn sort_fittest_first(&mut self) -> Result<()> {
        self.sort_with(|a, b| b.compare(a))
    }

    fn sort_with<F>(&mut self, mut compare: F) -> Result<()>
    where
        F: FnMut(&Individual, &Individual) -> Result<Ordering>,
    {
        if self.individuals.iter().any(|ind| !ind.is_evaluated()) {
            return Err(Error::UnevaluatedFitness);
        }
        let mut failure = None;
        self.individuals.sort_by(|a, b| {
            compare(a, b).unwrap_or_else(|err| {
                failure.get_or_insert(err);
                Ordering::Equal
            })
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Fitness-sharing niche count of `selected` against the whole population.
    pub fn niche_count(&self, selected: &Individual, sigma: f64) -> f64 {
        niche_count(selected, &self.individuals, sigma)
    }

    /// Snapshot the current individuals.
    pub fn save_genes(&mut self) {
        self.saved_generation.clone_from(&self.individuals);
    }

    /// Revert to the last snapshot.
    pub fn restore_genes(&mut self) {
        self.individuals.clone_from(&self.saved_generation);
        self.clear_violations();
    }

    /// Selection and crossover.
    ///
    /// Sorts fittest first, keeps the top `selection_rate` share unchanged and
    /// refills the rest with children of parents drawn from those survivors.
    /// Every individual must be evaluated.
    pub fn run_sga<R: Rng>(
        &mut self,
        selection_rate: f64,
        crossover_rate: f64,
        sharing_radius: f64,
        rng: &mut R,
    ) -> Result<()> {
        let n = self.individuals.len();
        if n == 0 {
            return Ok(());
        }

        self.sort_fittest_first()?;

        let survivors = ((n as f64 * selection_rate).round() as usize).clamp(1, n);
        let parents = self.individuals[..survivors].to_vec();
        let weights = match self.selection_method {
            SelectionMethod::RouletteWheel => sharing_weights(&parents, &self.individuals, sharing_radius),
            SelectionMethod::Tournament => Vec::new(),
        };

        for slot in survivors..n {
            let (a, b) = select_mating_pair(self.selection_method, &parents, &weights, rng);
            self.individuals[slot] = perform_crossover(
                self.crossover_method,
                &parents[a],
                &parents[b],
                crossover_rate,
                rng,
            );
        }

        Ok(())
    }

    /// Mutate everyone except the elite at index 0. Returns the number of
    /// individuals that changed.
    pub fn mutate<R: Rng>(
        &mut self,
        mutation_rate: f64,
        method: MutationMethod,
        sigma: f64,
        rng: &mut R,
    ) -> usize {
        let steps = self.discretization_steps;
        let mut changed = 0;
        for ind in self.individuals.iter_mut().skip(1) {
            if mutate_individual(ind, mutation_rate, method, sigma, steps, rng) {
                changed += 1;
            }
        }
        changed
    }

    /// True when the genes of the leading `beta` share of the population all
    /// sit within `convergence_threshold` of their mean.
    ///
    /// Assumes the fittest-first order left by `run_sga`.
    pub fn is_sga_converged(&self) -> bool {
        let n = self.individuals.len();
        if n == 0 {
            return false;
        }
        let top = ((n as f64 * self.beta).round() as usize).clamp(2.min(n), n);
        let leaders = &self.individuals[..top];
        let chromosome_length = leaders[0].len();

        (0..chromosome_length).all(|j| {
            let mean = leaders.iter().map(|ind| ind.genes()[j]).sum::<f64>() / top as f64;
            leaders
                .iter()
                .all(|ind| (ind.genes()[j] - mean).abs() < self.convergence_threshold)
        })
    }

    /// Best evaluated individual; ties go to the earliest.
    pub fn fittest(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter(|ind| ind.is_evaluated())
            .fold(None, |best: Option<&Individual>, ind| match best {
                Some(b) if b.fitness() >= ind.fitness() => Some(b),
                _ => Some(ind),
            })
    }

    /// Statistics over evaluated individuals with finite fitness.
    pub fn statistics(&self) -> Option<PopulationStats> {
        let fitnesses: Vec<f64> = self
            .individuals
            .iter()
            .filter_map(Individual::fitness)
            .filter(|f| f.is_finite())
            .collect();

        if fitnesses.is_empty() {
            return None;
        }

        let count = fitnesses.len() as f64;
        let average = fitnesses.iter().sum::<f64>() / count;
        let variance = fitnesses.iter().map(|f| (f - average).powi(2)).sum::<f64>() / count;

        Some(PopulationStats {
            best_fitness: fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_fitness: fitnesses.iter().copied().fold(f64::INFINITY, f64::min),
            average_fitness: average,
            standard_deviation: variance.sqrt(),
            evaluated: fitnesses.len(),
        })
    }
}
