//! Crossover operators.

use rand::Rng;

use super::individual::Individual;
use super::types::CrossoverMethod;

/// Produce one child using the configured method.
///
/// With probability `crossover_rate` the parents are recombined; otherwise the
/// child is a copy of the fitter parent. The child is always unevaluated.
pub fn perform_crossover<R: Rng>(
    method: CrossoverMethod,
    parent1: &Individual,
    parent2: &Individual,
    crossover_rate: f64,
    rng: &mut R,
) -> Individual {
    if !rng.gen_bool(crossover_rate) {
        let fitter = match (parent1.fitness(), parent2.fitness()) {
            (Some(f1), Some(f2)) if f2 > f1 => parent2,
            _ => parent1,
        };
        return Individual::from_genes(fitter.genes().to_vec());
    }

    match method {
        CrossoverMethod::Uniform => uniform_crossover(parent1, parent2, rng),
        CrossoverMethod::SinglePoint => single_point_crossover(parent1, parent2, rng).0,
    }
}

/// Uniform crossover: each gene comes from either parent with equal odds.
pub fn uniform_crossover<R: Rng>(parent1: &Individual, parent2: &Individual, rng: &mut R) -> Individual {
    let genes = parent1
        .genes()
        .iter()
        .zip(parent2.genes().iter())
        .map(|(&g1, &g2)| if rng.gen_bool(0.5) { g1 } else { g2 })
        .collect();

    Individual::from_genes(genes)
}

/// Single-point crossover on a random cut position. Returns both children.
pub fn single_point_crossover<R: Rng>(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut R,
) -> (Individual, Individual) {
    let num_genes = parent1.len().min(parent2.len());
    if num_genes < 2 {
        return (
            Individual::from_genes(parent1.genes().to_vec()),
            Individual::from_genes(parent2.genes().to_vec()),
        );
    }
    let point = rng.gen_range(1..num_genes);

    let child1 = parent1.genes()[..point]
        .iter()
        .chain(parent2.genes()[point..num_genes].iter())
        .copied()
        .collect();
    let child2 = parent2.genes()[..point]
        .iter()
        .chain(parent1.genes()[point..num_genes].iter())
        .copied()
        .collect();

    (Individual::from_genes(child1), Individual::from_genes(child2))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn uniform_child_genes_come_from_parents() {
        let mut rng = StdRng::seed_from_u64(1);
        let p1 = Individual::with_fitness(vec![0.0; 16], 1.0);
        let p2 = Individual::with_fitness(vec![1.0; 16], 2.0);

        for _ in 0..20 {
            let child = perform_crossover(CrossoverMethod::Uniform, &p1, &p2, 1.0, &mut rng);
            assert_eq!(child.len(), 16);
            assert!(child.genes().iter().all(|g| *g == 0.0 || *g == 1.0));
            assert!(!child.is_evaluated());
        }
    }

    #[test]
    fn zero_rate_copies_fitter_parent() {
        let mut rng = StdRng::seed_from_u64(2);
        let p1 = Individual::with_fitness(vec![0.1, 0.2], 1.0);
        let p2 = Individual::with_fitness(vec![0.7, 0.8], 5.0);

        let child = perform_crossover(CrossoverMethod::SinglePoint, &p1, &p2, 0.0, &mut rng);
        assert_eq!(child.genes(), p2.genes());
        assert_eq!(child.fitness(), None);
    }

    #[test]
    fn single_point_children_swap_tails() {
        let mut rng = StdRng::seed_from_u64(4);
        let p1 = Individual::from_genes(vec![0.0, 0.0, 0.0, 0.0]);
        let p2 = Individual::from_genes(vec![1.0, 1.0, 1.0, 1.0]);
        let (c1, c2) = single_point_crossover(&p1, &p2, &mut rng);

        assert_eq!(c1.genes()[0], 0.0);
        assert_eq!(c2.genes()[0], 1.0);
        for (a, b) in c1.genes().iter().zip(c2.genes()) {
            assert_eq!(a + b, 1.0);
        }
    }
}
