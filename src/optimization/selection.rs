//! Parent selection operators.

use rand::Rng;

use super::individual::Individual;
use super::types::SelectionMethod;

/// Fitness-sharing niche count of `selected` against `population`.
///
/// Every individual within `sigma` of `selected` contributes `1 - d / sigma`
/// (triangular sharing kernel); individuals further away contribute nothing.
pub fn niche_count(selected: &Individual, population: &[Individual], sigma: f64) -> f64 {
    population
        .iter()
        .map(|other| selected.distance(other))
        .filter(|&d| d < sigma)
        .map(|d| 1.0 - d / sigma)
        .sum()
}

/// Roulette weights for `candidates`: fitness shifted to be non-negative,
/// divided by the niche count against the whole population.
///
/// Unevaluated or non-finite fitness gets zero weight.
pub fn sharing_weights(candidates: &[Individual], population: &[Individual], sigma: f64) -> Vec<f64> {
    let finite: Vec<f64> = candidates
        .iter()
        .filter_map(Individual::fitness)
        .filter(|f| f.is_finite())
        .collect();

    let Some(min) = finite.iter().copied().reduce(f64::min) else {
        return vec![0.0; candidates.len()];
    };
    let max = finite.iter().copied().fold(min, f64::max);
    let range = max - min;
    // Keeps the weakest candidate selectable.
    let floor = if range > 0.0 { 0.01 * range } else { 1.0 };

    candidates
        .iter()
        .map(|ind| match ind.fitness() {
            Some(f) if f.is_finite() => {
                let niche = niche_count(ind, population, sigma).max(1.0);
                (f - min + floor) / niche
            }
            _ => 0.0,
        })
        .collect()
}

/// Spin the roulette wheel once. Falls back to a uniform pick when the
/// weights carry no information.
pub fn roulette_wheel_select<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return rng.gen_range(0..weights.len());
    }

    let r = rng.r#gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if r < cumulative {
            return i;
        }
    }
    weights.len() - 1
}

/// Binary tournament: the fitter of two random candidates wins.
pub fn tournament_select<R: Rng>(candidates: &[Individual], rng: &mut R) -> usize {
    let a = rng.gen_range(0..candidates.len());
    let b = rng.gen_range(0..candidates.len());
    let fa = candidates[a].fitness().unwrap_or(f64::NEG_INFINITY);
    let fb = candidates[b].fitness().unwrap_or(f64::NEG_INFINITY);
    if fb > fa { b } else { a }
}

/// Select one parent index using the configured method.
pub fn select_parent<R: Rng>(
    method: SelectionMethod,
    candidates: &[Individual],
    weights: &[f64],
    rng: &mut R,
) -> usize {
    match method {
        SelectionMethod::RouletteWheel => roulette_wheel_select(weights, rng),
        SelectionMethod::Tournament => tournament_select(candidates, rng),
    }
}

/// Select two parent indices, distinct whenever there is more than one candidate.
pub fn select_mating_pair<R: Rng>(
    method: SelectionMethod,
    candidates: &[Individual],
    weights: &[f64],
    rng: &mut R,
) -> (usize, usize) {
    let first = select_parent(method, candidates, weights, rng);
    if candidates.len() < 2 {
        return (first, first);
    }

    let mut second = select_parent(method, candidates, weights, rng);
    let mut attempts = 0;
    while second == first && attempts < 10 {
        second = select_parent(method, candidates, weights, rng);
        attempts += 1;
    }

    // Give up on the wheel and take any other candidate.
    if second == first {
        second = (first + rng.gen_range(1..candidates.len())) % candidates.len();
    }

    (first, second)
}
