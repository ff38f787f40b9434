//! Tilt angle optimization for solar panel arrays.

use crate::error::Result;
use crate::site::SolarPanel;

use super::algorithm::Optimizer;
use super::design::TiltAngleDesign;
use super::objective::ObjectiveFunction;
use super::types::GaParameters;

/// Optimizer whose genes are the tilt angles of a set of panels.
///
/// Each panel contributes one gene, seeded from its current tilt. The best
/// angles found are written back into the panels when the run ends.
pub type SolarPanelTiltAngleOptimizer<'a, O> = Optimizer<TiltAngleDesign<'a>, O>;

impl<'a, O: ObjectiveFunction> Optimizer<TiltAngleDesign<'a>, O> {
    pub fn tilt_angles(
        panels: &'a mut [SolarPanel],
        objective: O,
        params: GaParameters,
    ) -> Result<Self> {
        Self::new(TiltAngleDesign::new(panels), objective, params)
    }

    pub fn panels(&self) -> &[SolarPanel] {
        self.design().panels()
    }
}
