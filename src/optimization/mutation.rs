//! Mutation operators.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::individual::{Individual, quantize, random_gene};
use super::types::MutationMethod;

/// Mutate each gene with probability `mutation_rate`.
///
/// Uniform mutation redraws the gene; Gaussian mutation adds noise with
/// standard deviation `sigma` and clamps to [0, 1]. Discretized genes are
/// snapped back to their levels. Returns true if any gene changed, in which
/// case the fitness is cleared.
pub fn mutate_individual<R: Rng>(
    individual: &mut Individual,
    mutation_rate: f64,
    method: MutationMethod,
    sigma: f64,
    discretization_steps: usize,
    rng: &mut R,
) -> bool {
    let mut mutated = false;

    for gene in individual.genes_mut() {
        if !rng.gen_bool(mutation_rate) {
            continue;
        }
        *gene = match method {
            MutationMethod::Uniform => random_gene(discretization_steps, rng),
            MutationMethod::Gaussian => {
                let noise: f64 = StandardNormal.sample(&mut *rng);
                quantize((*gene + sigma * noise).clamp(0.0, 1.0), discretization_steps)
            }
        };
        mutated = true;
    }

    if mutated {
        individual.clear_fitness();
    }
    mutated
}

/// Perturb `seed` within `radius`, redrawing until the value lands in [0, 1].
pub fn perturb_gene<R: Rng>(seed: f64, radius: f64, rng: &mut R) -> f64 {
    loop {
        let candidate = seed + radius * (2.0 * rng.r#gen::<f64>() - 1.0);
        if (0.0..=1.0).contains(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn zero_rate_leaves_individual_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ind = Individual::with_fitness(vec![0.2, 0.4, 0.6], 3.0);
        let changed = mutate_individual(&mut ind, 0.0, MutationMethod::Uniform, 0.1, 0, &mut rng);

        assert!(!changed);
        assert_eq!(ind.genes(), &[0.2, 0.4, 0.6]);
        assert_eq!(ind.fitness(), Some(3.0));
    }

    #[test]
    fn full_rate_clears_fitness_and_keeps_range() {
        let mut rng = StdRng::seed_from_u64(2);
        for method in [MutationMethod::Uniform, MutationMethod::Gaussian] {
            let mut ind = Individual::with_fitness(vec![0.0, 0.5, 1.0], 3.0);
            let changed = mutate_individual(&mut ind, 1.0, method, 0.3, 0, &mut rng);

            assert!(changed);
            assert!(!ind.is_evaluated());
            assert!(ind.genes().iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn discretized_mutation_stays_on_levels() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ind = Individual::from_genes(vec![0.25; 20]);
        mutate_individual(&mut ind, 1.0, MutationMethod::Gaussian, 0.2, 4, &mut rng);
        for &g in ind.genes() {
            let k = g * 4.0;
            assert_eq!(k, k.round());
        }
    }

    #[test]
    fn perturbation_stays_within_radius_and_unit_interval() {
        let mut rng = StdRng::seed_from_u64(4);
        for &seed in &[0.0, 0.02, 0.5, 0.99, 1.0] {
            for _ in 0..100 {
                let g = perturb_gene(seed, 0.1, &mut rng);
                assert!((0.0..=1.0).contains(&g));
                assert!((g - seed).abs() <= 0.1 + 1e-12);
            }
        }
    }
}
