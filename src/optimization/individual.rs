//! Candidate solution: a normalized chromosome and its fitness.

use std::cmp::Ordering;

use rand::Rng;

use crate::error::{Error, Result};

/// Individual in the GA population.
///
/// Genes live in [0, 1] and are decoded into domain units by the gene codecs.
/// Fitness is `None` until the objective function has scored the chromosome;
/// higher fitness is better.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Vec<f64>,
    fitness: Option<f64>,
}

impl Individual {
    /// Unevaluated individual with `length` zero genes.
    pub fn new(length: usize) -> Self {
        Self {
            chromosome: vec![0.0; length],
            fitness: None,
        }
    }

    pub fn from_genes(chromosome: Vec<f64>) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Evaluated individual. A NaN `fitness` leaves it unevaluated.
    pub fn with_fitness(chromosome: Vec<f64>, fitness: f64) -> Self {
        Self {
            chromosome,
            fitness: (!fitness.is_nan()).then_some(fitness),
        }
    }

    /// Random individual. With `discretization_steps > 0` every gene is one
    /// of the levels `k / steps` for `k` in `0..steps`.
    pub fn random<R: Rng>(length: usize, discretization_steps: usize, rng: &mut R) -> Self {
        let chromosome = (0..length)
            .map(|_| random_gene(discretization_steps, rng))
            .collect();
        Self::from_genes(chromosome)
    }

    pub fn len(&self) -> usize {
        self.chromosome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosome.is_empty()
    }

    pub fn genes(&self) -> &[f64] {
        &self.chromosome
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Record a score. NaN is not a score and clears the fitness instead.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = (!fitness.is_nan()).then_some(fitness);
    }

    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    pub fn gene(&self, index: usize) -> Result<f64> {
        self.chromosome
            .get(index)
            .copied()
            .ok_or_else(|| Error::out_of_bounds(index, self.chromosome.len()))
    }

    pub fn set_gene(&mut self, index: usize, value: f64) -> Result<()> {
        let length = self.chromosome.len();
        let gene = self
            .chromosome
            .get_mut(index)
            .ok_or_else(|| Error::out_of_bounds(index, length))?;
        *gene = value;
        Ok(())
    }

    pub(crate) fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.chromosome
    }

    /// Copy genes position by position; extra genes on either side are left alone.
    pub fn copy_genes(&mut self, original: &Individual) {
        let n = self.chromosome.len().min(original.chromosome.len());
        self.chromosome[..n].copy_from_slice(&original.chromosome[..n]);
    }

    /// Order by fitness. Fails if either side is unevaluated.
    ///
    /// Equal scores compare `Equal`, including `0.0` against `-0.0`.
    pub fn compare(&self, other: &Individual) -> Result<Ordering> {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => a.partial_cmp(&b).ok_or(Error::UnevaluatedFitness),
            _ => Err(Error::UnevaluatedFitness),
        }
    }

    /// Euclidean distance in gene space.
    pub fn distance(&self, other: &Individual) -> f64 {
        if self.chromosome.len() == 1 && other.chromosome.len() == 1 {
            return (self.chromosome[0] - other.chromosome[0]).abs();
        }
        self.chromosome
            .iter()
            .zip(other.chromosome.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

pub(crate) fn random_gene<R: Rng>(discretization_steps: usize, rng: &mut R) -> f64 {
    if discretization_steps > 0 {
        rng.gen_range(0..discretization_steps) as f64 / discretization_steps as f64
    } else {
        rng.r#gen::<f64>()
    }
}

/// Snap a gene to the nearest level when the population is discretized.
pub(crate) fn quantize(gene: f64, discretization_steps: usize) -> f64 {
    if discretization_steps == 0 {
        return gene;
    }
    let steps = discretization_steps as f64;
    let level = (gene * steps).round().clamp(0.0, steps - 1.0);
    level / steps
}
