//! Generation loop driving the genetic algorithm.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::site::RectangularBound;

use super::codec::{GeneDescriptor, decode_genes};
use super::design::{ChromosomeShape, DesignSpace};
use super::individual::{Individual, quantize};
use super::mutation::perturb_gene;
use super::objective::ObjectiveFunction;
use super::population::Population;
use super::types::{
    EvaluationFailurePolicy, GaParameters, OptimizationResult, OptimizerState, ProgressUpdate,
    SearchMethod, StopReason,
};

/// Score one individual through the objective function.
fn evaluate_individual<O: ObjectiveFunction>(
    genes: &[GeneDescriptor],
    objective: &O,
    policy: EvaluationFailurePolicy,
    individual: &mut Individual,
) -> Result<()> {
    let parameters = decode_genes(genes, individual.genes());
    let outcome = objective.compute(&parameters).and_then(|fitness| {
        if fitness.is_nan() {
            anyhow::bail!("objective returned NaN for {:?}", parameters)
        }
        Ok(fitness)
    });

    match (outcome, policy) {
        (Ok(fitness), _) => individual.set_fitness(fitness),
        (Err(err), EvaluationFailurePolicy::Abort) => return Err(Error::Evaluation(err)),
        (Err(err), EvaluationFailurePolicy::WorstFitness) => {
            warn!(error = %err, "Evaluation failed, scoring as worst fitness");
            individual.set_fitness(f64::NEG_INFINITY);
        }
    }
    Ok(())
}

/// Genetic algorithm over a design space.
///
/// The optimizer owns its population and gene metadata; the design space
/// usually borrows the domain objects that receive the final result.
pub struct Optimizer<D, O> {
    design: D,
    objective: O,
    params: GaParameters,
    genes: Vec<GeneDescriptor>,
    population: Population,
    constraints: Vec<RectangularBound>,
    rng: StdRng,
    initial_genes: Vec<f64>,
    final_genes: Vec<f64>,
    final_fitness: Option<f64>,
    fittest_of_generations: Vec<Individual>,
    outside_generation_counter: usize,
    compute_counter: usize,
    converged: bool,
    state: OptimizerState,
}

impl<D, O> Optimizer<D, O>
where
    D: DesignSpace,
    O: ObjectiveFunction,
{
    /// Build the optimizer and seed its first individual from the current design.
    pub fn new(design: D, objective: O, params: GaParameters) -> Result<Self> {
        params.validate()?;

        let genes = design.genes();
        let initial_genes = design.current_values();
        if initial_genes.len() != genes.len() {
            return Err(Error::ChromosomeLengthMismatch {
                expected: genes.len(),
                actual: initial_genes.len(),
            });
        }
        if let Some((descriptor, value)) = genes
            .iter()
            .zip(initial_genes.iter())
            .find(|(_, value)| !value.is_finite())
        {
            return Err(Error::invalid(format!(
                "current value of {} must be finite, got {}",
                descriptor.name, value
            )));
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut population = Population::new(
            params.population_size,
            genes.len(),
            params.discretization_steps,
            &mut rng,
        );
        population.selection_method = params.selection_method;
        population.crossover_method = params.crossover_method;
        population.beta = params.beta;
        population.convergence_threshold = params.convergence_threshold;

        let seed: Vec<f64> = genes
            .iter()
            .zip(initial_genes.iter())
            .map(|(descriptor, &value)| descriptor.encode(value))
            .collect();
        let seed_individual = Individual::from_genes(seed.clone());

        for (i, individual) in population.individuals_mut().iter_mut().enumerate() {
            if i == 0 {
                individual.copy_genes(&seed_individual);
            } else if params.search_method == SearchMethod::LocalSearchRandomOptimization {
                for (gene, &origin) in individual.genes_mut().iter_mut().zip(seed.iter()) {
                    let perturbed = perturb_gene(origin, params.local_search_radius, &mut rng);
                    *gene = quantize(perturbed, params.discretization_steps);
                }
            }
        }
        population.save_genes();

        debug!(
            genes = genes.len(),
            population = params.population_size,
            search = ?params.search_method,
            "Seeded population from current design"
        );

        Ok(Self {
            design,
            objective,
            params,
            genes,
            population,
            constraints: Vec::new(),
            rng,
            initial_genes,
            final_genes: Vec::new(),
            final_fitness: None,
            fittest_of_generations: Vec::new(),
            outside_generation_counter: 0,
            compute_counter: 0,
            converged: false,
            state: OptimizerState::NotStarted,
        })
    }

    /// Register a keep-out rectangle checked against (x, y) gene pairs.
    pub fn add_constraint(&mut self, bound: RectangularBound) {
        self.constraints.push(bound);
    }

    pub fn with_constraints(mut self, bounds: impl IntoIterator<Item = RectangularBound>) -> Self {
        self.constraints.extend(bounds);
        self
    }

    pub fn constraints(&self) -> &[RectangularBound] {
        &self.constraints
    }

    pub fn design(&self) -> &D {
        &self.design
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn params(&self) -> &GaParameters {
        &self.params
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn genes(&self) -> &[GeneDescriptor] {
        &self.genes
    }

    pub fn gene_names(&self) -> Vec<String> {
        self.genes.iter().map(|g| g.name.clone()).collect()
    }

    pub fn gene_minima(&self) -> Vec<f64> {
        self.genes.iter().map(|g| g.minimum).collect()
    }

    pub fn gene_maxima(&self) -> Vec<f64> {
        self.genes.iter().map(|g| g.maximum).collect()
    }

    pub fn is_gene_integer(&self) -> Vec<bool> {
        self.genes.iter().map(|g| g.integer).collect()
    }

    pub fn initial_genes(&self) -> &[f64] {
        &self.initial_genes
    }

    pub fn final_genes(&self) -> &[f64] {
        &self.final_genes
    }

    pub fn final_fitness(&self) -> Option<f64> {
        self.final_fitness
    }

    /// Fittest individual recorded at the end of each generation.
    pub fn fittest_of_generations(&self) -> &[Individual] {
        &self.fittest_of_generations
    }

    pub fn generation_count(&self) -> usize {
        self.outside_generation_counter
    }

    pub fn compute_count(&self) -> usize {
        self.compute_counter
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Run to completion without callbacks.
    pub fn evolve(&mut self) -> Result<OptimizationResult> {
        self.run::<fn(&ProgressUpdate), fn() -> bool>(None, None)
    }

    /// Run the generation loop, then apply the fittest individual.
    ///
    /// Nothing runs unless `maximum_generations > 1`. `should_stop` and the
    /// objective's cancellation flag are polled between generations. A
    /// generation cut short by cancellation or by `maximum_evaluations` is
    /// not bred, but the fittest evaluated individual is still applied.
    #[instrument(
        level = "debug",
        skip_all,
        fields(population = self.params.population_size, generations = self.params.maximum_generations)
    )]
    pub fn run<F, S>(
        &mut self,
        mut on_progress: Option<F>,
        should_stop: Option<S>,
    ) -> Result<OptimizationResult>
    where
        F: FnMut(&ProgressUpdate),
        S: Fn() -> bool,
    {
        if self.params.maximum_generations <= 1 {
            self.state = OptimizerState::Terminated(StopReason::NotRun);
            return Ok(self.result(StopReason::NotRun));
        }

        let deadline = self
            .params
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        self.state = OptimizerState::Evolving;

        let stop_reason = loop {
            if let Some(reason) = self.should_terminate(deadline, should_stop.as_ref()) {
                break reason;
            }

            let budget = self.remaining_evaluations();
            let evaluated = self.evaluate_generation(budget)?;
            self.compute_counter += evaluated;
            if evaluated < self.population.len() {
                break if self.objective.is_cancelled() {
                    StopReason::Cancelled
                } else {
                    StopReason::EvaluationsExhausted
                };
            }

            let rolled_back = self.finish_generation()?;

            if let Some(ref mut progress) = on_progress {
                progress(&ProgressUpdate {
                    generation: self.outside_generation_counter,
                    evaluations: self.compute_counter,
                    fittest: self.fittest_of_generations.last().cloned(),
                    stats: self.population.statistics(),
                    converged: self.converged,
                    rolled_back,
                });
            }
        };

        self.state = OptimizerState::Terminated(stop_reason);
        debug!(reason = %stop_reason, generations = self.outside_generation_counter, "Evolution stopped");
        self.apply_fittest();

        Ok(self.result(stop_reason))
    }

    fn should_terminate<S>(&self, deadline: Option<Instant>, should_stop: Option<&S>) -> Option<StopReason>
    where
        S: Fn() -> bool,
    {
        if self.converged {
            return Some(StopReason::Converged);
        }
        if self.outside_generation_counter >= self.params.maximum_generations {
            return Some(StopReason::GenerationsExhausted);
        }
        if let Some(limit) = self.params.maximum_evaluations {
            if self.compute_counter >= limit {
                return Some(StopReason::EvaluationsExhausted);
            }
        }
        if self.objective.is_cancelled() || should_stop.is_some_and(|stop| stop()) {
            return Some(StopReason::Cancelled);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::TimeLimit);
        }
        None
    }

    /// Evaluations left before `maximum_evaluations`, capped at one generation.
    fn remaining_evaluations(&self) -> usize {
        let n = self.population.len();
        self.params
            .maximum_evaluations
            .map_or(n, |limit| limit.saturating_sub(self.compute_counter).min(n))
    }

    /// Evaluate one individual. When it closes its generation, breed the
    /// next one.
    pub fn compute_individual(&mut self, index: usize) -> Result<()> {
        if self.converged {
            return Ok(());
        }

        let n = self.population.len();
        let individual = self
            .population
            .individual_mut(index)
            .ok_or(Error::IndividualIndexOutOfBounds { index, length: n })?;
        evaluate_individual(&self.genes, &self.objective, self.params.failure_policy, individual)?;

        let last_of_generation = self.compute_counter % n == n - 1;
        self.compute_counter += 1;
        if last_of_generation {
            self.finish_generation()?;
        }
        Ok(())
    }

    /// Evaluate the first `budget` individuals in parallel. Returns how many
    /// were scored before any cancellation.
    #[cfg(feature = "parallel")]
    fn evaluate_generation(&mut self, budget: usize) -> Result<usize> {
        let genes = &self.genes;
        let objective = &self.objective;
        let policy = self.params.failure_policy;

        let outcomes: Vec<Result<bool>> = self.population.individuals_mut()[..budget]
            .par_iter_mut()
            .map(|individual| {
                if objective.is_cancelled() {
                    return Ok(false);
                }
                evaluate_individual(genes, objective, policy, individual).map(|_| true)
            })
            .collect();

        let mut evaluated = 0;
        for outcome in outcomes {
            if outcome? {
                evaluated += 1;
            }
        }
        Ok(evaluated)
    }

    /// Evaluate the first `budget` individuals sequentially, for targets
    /// without threads.
    #[cfg(not(feature = "parallel"))]
    fn evaluate_generation(&mut self, budget: usize) -> Result<usize> {
        let policy = self.params.failure_policy;
        let mut evaluated = 0;
        for individual in self.population.individuals_mut().iter_mut().take(budget) {
            if self.objective.is_cancelled() {
                break;
            }
            evaluate_individual(&self.genes, &self.objective, policy, individual)?;
            evaluated += 1;
        }
        Ok(evaluated)
    }

    /// Selection, crossover, constraint check and mutation. Returns true if
    /// the generation was rolled back.
    fn finish_generation(&mut self) -> Result<bool> {
        let generation = self.outside_generation_counter;

        self.population.save_genes();
        self.population.run_sga(
            self.params.selection_rate,
            self.params.crossover_rate,
            self.params.sharing_radius,
            &mut self.rng,
        )?;

        if let Some(fittest) = self.population.fittest() {
            info!(
                generation,
                fitness = fittest.fitness(),
                genes = ?decode_genes(&self.genes, fittest.genes()),
                "Fittest of generation"
            );
            self.fittest_of_generations.push(fittest.clone());
        }

        let rolled_back = self.detect_violations();
        if rolled_back {
            debug!(generation, "Constraint violated, restoring previous generation");
            self.population.restore_genes();
        } else {
            self.converged = self.population.is_sga_converged();
            if self.converged {
                debug!(generation, "Population converged");
            } else if self.params.search_method == SearchMethod::GlobalSearchUniformSelection {
                self.population.mutate(
                    self.params.mutation_rate,
                    self.params.mutation_method,
                    self.params.local_search_radius,
                    &mut self.rng,
                );
            }
        }

        self.outside_generation_counter += 1;
        Ok(rolled_back)
    }

    /// Flag individuals whose decoded (x, y) pairs fall inside a constraint.
    ///
    /// Only paired-coordinate chromosomes are checked; scalar chromosomes
    /// never violate.
    pub fn detect_violations(&mut self) -> bool {
        if self.design.shape() != ChromosomeShape::PairedXY || self.constraints.is_empty() {
            self.population.clear_violations();
            return false;
        }

        let flags: Vec<bool> = self
            .population
            .individuals()
            .iter()
            .map(|individual| {
                decode_genes(&self.genes, individual.genes())
                    .chunks_exact(2)
                    .any(|point| {
                        self.constraints
                            .iter()
                            .any(|bound| bound.contains(point[0], point[1]))
                    })
            })
            .collect();

        let any = flags.contains(&true);
        self.population.violations_mut().copy_from_slice(&flags);
        any
    }

    /// Write the fittest individual back into the design. No-op when nothing
    /// has been evaluated.
    pub fn apply_fittest(&mut self) -> Option<f64> {
        let fittest = self.population.fittest()?.clone();
        let values = decode_genes(&self.genes, fittest.genes());

        self.design.apply(&values);
        self.final_genes = values;
        self.final_fitness = fittest.fitness();
        self.state = OptimizerState::Applied;

        info!(fitness = self.final_fitness, genes = ?self.final_genes, "Applied fittest individual");
        self.final_fitness
    }

    fn result(&self, stop_reason: StopReason) -> OptimizationResult {
        OptimizationResult {
            gene_names: self.gene_names(),
            initial_genes: self.initial_genes.clone(),
            final_genes: self.final_genes.clone(),
            final_fitness: self.final_fitness,
            generations: self.outside_generation_counter,
            evaluations: self.compute_counter,
            converged: self.converged,
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::design::LayoutDesign;
    use crate::optimization::objective::FnObjective;
    use crate::site::{Foundation, SitePoint};

    fn layout_params() -> GaParameters {
        GaParameters {
            population_size: 8,
            maximum_generations: 4,
            seed: Some(17),
            ..GaParameters::default()
        }
    }

    #[test]
    fn layout_seed_is_current_position() {
        let mut points = vec![SitePoint::new(2.5, -1.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 4.0), &mut points);
        let objective = FnObjective::new(|_: &[f64]| Ok(0.0));
        let optimizer = Optimizer::new(design, objective, layout_params()).unwrap();

        let first = optimizer.population().individual(0).unwrap();
        assert_eq!(first.genes(), &[0.75, 0.25]);
        assert_eq!(optimizer.gene_minima(), vec![-5.0, -2.0]);
        assert_eq!(optimizer.gene_maxima(), vec![5.0, 2.0]);
        assert_eq!(optimizer.state(), OptimizerState::NotStarted);
    }

    #[test]
    fn violations_flag_points_inside_bounds() {
        let mut points = vec![SitePoint::new(0.0, 0.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|_: &[f64]| Ok(0.0));
        let mut optimizer = Optimizer::new(design, objective, layout_params())
            .unwrap()
            .with_constraints([RectangularBound::new(-1.0, -1.0, 2.0, 2.0)]);

        // Individual 0 decodes to (0, 0), inside the keep-out square.
        assert!(optimizer.detect_violations());
        assert!(optimizer.population().violations()[0]);
    }

    #[test]
    fn no_constraints_means_no_violations() {
        let mut points = vec![SitePoint::new(0.0, 0.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|_: &[f64]| Ok(0.0));
        let mut optimizer = Optimizer::new(design, objective, layout_params()).unwrap();

        assert!(!optimizer.detect_violations());
        assert!(optimizer.population().violations().iter().all(|v| !v));
    }

    #[test]
    fn generations_inside_keep_out_are_rolled_back() {
        let mut points = vec![SitePoint::new(-4.0, -4.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|p: &[f64]| Ok(-(p[0] * p[0] + p[1] * p[1])));
        // Covers the whole foundation, so every bred generation is infeasible.
        let mut optimizer = Optimizer::new(design, objective, layout_params())
            .unwrap()
            .with_constraints([RectangularBound::new(-6.0, -6.0, 12.0, 12.0)]);

        let mut updates = Vec::new();
        let result = optimizer
            .run(Some(|u: &ProgressUpdate| updates.push(u.rolled_back)), None::<fn() -> bool>)
            .unwrap();

        assert_eq!(result.generations, 4);
        assert_eq!(updates, vec![true; 4]);
        assert!(!result.converged);
        assert_eq!(
            optimizer.population().individuals(),
            optimizer.population().saved_generation()
        );
    }

    #[test]
    fn compute_individual_breeds_after_last_member() {
        let mut points = vec![SitePoint::new(1.0, 1.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|p: &[f64]| Ok(p[0]));
        let mut optimizer = Optimizer::new(design, objective, layout_params()).unwrap();

        for i in 0..7 {
            optimizer.compute_individual(i).unwrap();
        }
        assert_eq!(optimizer.generation_count(), 0);
        assert_eq!(optimizer.compute_count(), 7);

        optimizer.compute_individual(7).unwrap();
        assert_eq!(optimizer.generation_count(), 1);
        assert_eq!(optimizer.fittest_of_generations().len(), 1);
        assert!(matches!(
            optimizer.compute_individual(8),
            Err(Error::IndividualIndexOutOfBounds { index: 8, length: 8 })
        ));
    }

    #[test]
    fn abort_policy_propagates_objective_errors() {
        let mut points = vec![SitePoint::new(1.0, 1.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|_: &[f64]| anyhow::bail!("irradiance backend offline"));
        let mut optimizer = Optimizer::new(design, objective, layout_params()).unwrap();

        assert!(matches!(optimizer.evolve(), Err(Error::Evaluation(_))));
    }

    #[test]
    fn worst_fitness_policy_keeps_running() {
        let mut points = vec![SitePoint::new(1.0, 1.0)];
        let design = LayoutDesign::new(Foundation::new(0.0, 0.0, 10.0, 10.0), &mut points);
        let objective = FnObjective::new(|p: &[f64]| {
            if p[0] > 0.0 {
                anyhow::bail!("right half unsupported")
            }
            Ok(-p[1].abs())
        });
        let params = GaParameters {
            failure_policy: EvaluationFailurePolicy::WorstFitness,
            ..layout_params()
        };
        let mut optimizer = Optimizer::new(design, objective, params).unwrap();

        let result = optimizer.evolve().unwrap();
        assert!(result.generations > 0);
        assert!(result.final_fitness.is_some());
    }
}
