//! Objective function contract.
//!
//! The optimizer decodes each chromosome into a private parameter buffer and
//! hands that buffer to [`ObjectiveFunction::compute`]; the shared design is
//! only written once, when the fittest individual is applied. Scores are
//! maximized.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scoring mode requested from the analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveType {
    #[default]
    Daily,
    Yearly,
}

#[cfg(feature = "parallel")]
mod sync_bound {
    /// `Sync` when generations are evaluated in parallel.
    pub trait MaybeSync: Sync {}
    impl<T: Sync + ?Sized> MaybeSync for T {}
}

#[cfg(not(feature = "parallel"))]
mod sync_bound {
    /// No bound when generations are evaluated sequentially.
    pub trait MaybeSync {}
    impl<T: ?Sized> MaybeSync for T {}
}

pub use sync_bound::MaybeSync;

/// Scores one decoded parameter set.
pub trait ObjectiveFunction: MaybeSync {
    fn objective_type(&self) -> ObjectiveType {
        ObjectiveType::Daily
    }

    /// Score `parameters` (domain units, one value per gene).
    fn compute(&self, parameters: &[f64]) -> anyhow::Result<f64>;

    /// Ask long-running computations to stop early.
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

impl<T: ObjectiveFunction + ?Sized> ObjectiveFunction for &T {
    fn objective_type(&self) -> ObjectiveType {
        (**self).objective_type()
    }

    fn compute(&self, parameters: &[f64]) -> anyhow::Result<f64> {
        (**self).compute(parameters)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Objective backed by a closure.
pub struct FnObjective<F> {
    function: F,
    objective_type: ObjectiveType,
    cancelled: CancellationFlag,
}

impl<F> FnObjective<F>
where
    F: Fn(&[f64]) -> anyhow::Result<f64>,
{
    pub fn new(function: F) -> Self {
        Self {
            function,
            objective_type: ObjectiveType::Daily,
            cancelled: CancellationFlag::new(),
        }
    }

    pub fn with_type(mut self, objective_type: ObjectiveType) -> Self {
        self.objective_type = objective_type;
        self
    }

    /// Handle that cancels this objective from elsewhere.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancelled.clone()
    }
}

impl<F> ObjectiveFunction for FnObjective<F>
where
    F: Fn(&[f64]) -> anyhow::Result<f64> + MaybeSync,
{
    fn objective_type(&self) -> ObjectiveType {
        self.objective_type
    }

    fn compute(&self, parameters: &[f64]) -> anyhow::Result<f64> {
        (self.function)(parameters)
    }

    fn cancel(&self) {
        self.cancelled.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}

/// Placeholder objective returning a uniform random score in [0, 1).
///
/// Useful for exercising the search machinery without an analysis backend.
#[derive(Debug, Default)]
pub struct RandomObjective {
    objective_type: ObjectiveType,
    cancelled: CancellationFlag,
}

impl RandomObjective {
    pub fn new(objective_type: ObjectiveType) -> Self {
        Self {
            objective_type,
            cancelled: CancellationFlag::new(),
        }
    }
}

impl ObjectiveFunction for RandomObjective {
    fn objective_type(&self) -> ObjectiveType {
        self.objective_type
    }

    fn compute(&self, _parameters: &[f64]) -> anyhow::Result<f64> {
        Ok(rand::thread_rng().r#gen::<f64>())
    }

    fn cancel(&self) {
        self.cancelled.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_objective_scores_parameters() {
        let objective = FnObjective::new(|p: &[f64]| Ok(p.iter().sum()));
        assert_eq!(objective.compute(&[1.0, 2.5]).unwrap(), 3.5);
        assert_eq!(objective.objective_type(), ObjectiveType::Daily);
    }

    #[test]
    fn cancellation_is_shared() {
        let objective = FnObjective::new(|_: &[f64]| Ok(0.0)).with_type(ObjectiveType::Yearly);
        let handle = objective.cancellation();
        assert!(!objective.is_cancelled());

        handle.cancel();
        assert!(objective.is_cancelled());
        assert_eq!(objective.objective_type(), ObjectiveType::Yearly);
    }

    #[test]
    fn references_forward_to_the_objective() {
        let objective = RandomObjective::new(ObjectiveType::Yearly);
        let by_ref = &objective;
        let score = by_ref.compute(&[]).unwrap();
        assert!((0.0..1.0).contains(&score));

        by_ref.cancel();
        assert!(objective.is_cancelled());
    }
}
