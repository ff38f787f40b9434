//! Placement optimization of objects on a foundation.

use crate::error::Result;
use crate::site::{Foundation, SitePoint};

use super::algorithm::Optimizer;
use super::design::LayoutDesign;
use super::objective::ObjectiveFunction;
use super::types::GaParameters;

/// Optimizer whose genes are (x, y) positions bounded by a foundation.
///
/// Keep-out rectangles added with [`Optimizer::add_constraint`] roll back
/// any generation that places a point inside them.
pub type LayoutOptimizer<'a, O> = Optimizer<LayoutDesign<'a>, O>;

impl<'a, O: ObjectiveFunction> Optimizer<LayoutDesign<'a>, O> {
    pub fn layout(
        foundation: Foundation,
        positions: &'a mut [SitePoint],
        objective: O,
        params: GaParameters,
    ) -> Result<Self> {
        Self::new(LayoutDesign::new(foundation, positions), objective, params)
    }

    pub fn positions(&self) -> &[SitePoint] {
        self.design().positions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::objective::FnObjective;

    #[test]
    fn best_position_is_applied_inside_foundation() {
        let foundation = Foundation::new(1.0, 1.0, 4.0, 4.0);
        let mut points = vec![SitePoint::new(0.0, 0.0)];
        let objective = FnObjective::new(|p: &[f64]| Ok(p[0] + p[1]));
        let params = GaParameters::default()
            .with_population_size(12)
            .with_maximum_generations(6)
            .with_seed(11);

        let mut optimizer = LayoutOptimizer::layout(foundation, &mut points, objective, params).unwrap();
        let result = optimizer.evolve().unwrap();

        let best = optimizer.positions()[0];
        assert!((-1.0..=3.0).contains(&best.x));
        assert!((-1.0..=3.0).contains(&best.y));
        // Elitism keeps the seed (score 0) in play, so the result is no worse.
        assert!(result.final_fitness.unwrap() >= 0.0);
    }
}
