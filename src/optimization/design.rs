//! Design spaces: what the chromosome means and where results are written.

use crate::site::{Foundation, SitePoint, SolarPanel};

use super::codec::GeneDescriptor;

/// Semantic shape of a chromosome, used to decide whether spatial
/// constraints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromosomeShape {
    /// Independent scalar parameters.
    #[default]
    Scalar,
    /// Consecutive gene pairs are (x, y) site coordinates.
    PairedXY,
}

/// Source of gene bounds and sink for the optimized values.
pub trait DesignSpace {
    /// One descriptor per chromosome position.
    fn genes(&self) -> Vec<GeneDescriptor>;

    /// Current domain values, one per gene.
    fn current_values(&self) -> Vec<f64>;

    /// Write domain values back into the design.
    fn apply(&mut self, values: &[f64]);

    fn shape(&self) -> ChromosomeShape {
        ChromosomeShape::Scalar
    }
}

/// One tilt angle gene per solar panel.
#[derive(Debug)]
pub struct TiltAngleDesign<'a> {
    panels: &'a mut [SolarPanel],
}

impl<'a> TiltAngleDesign<'a> {
    pub fn new(panels: &'a mut [SolarPanel]) -> Self {
        Self { panels }
    }

    pub fn panels(&self) -> &[SolarPanel] {
        self.panels
    }
}

impl DesignSpace for TiltAngleDesign<'_> {
    fn genes(&self) -> Vec<GeneDescriptor> {
        (0..self.panels.len())
            .map(|i| GeneDescriptor::tilt_angle(format!("Tilt Angle {i}")))
            .collect()
    }

    fn current_values(&self) -> Vec<f64> {
        self.panels.iter().map(|p| p.tilt_angle).collect()
    }

    fn apply(&mut self, values: &[f64]) {
        for (panel, &angle) in self.panels.iter_mut().zip(values) {
            panel.tilt_angle = angle;
        }
    }
}

/// Positions of objects on a foundation, two genes (x, y) per object.
#[derive(Debug)]
pub struct LayoutDesign<'a> {
    foundation: Foundation,
    positions: &'a mut [SitePoint],
}

impl<'a> LayoutDesign<'a> {
    pub fn new(foundation: Foundation, positions: &'a mut [SitePoint]) -> Self {
        Self {
            foundation,
            positions,
        }
    }

    pub fn foundation(&self) -> &Foundation {
        &self.foundation
    }

    pub fn positions(&self) -> &[SitePoint] {
        self.positions
    }
}

impl DesignSpace for LayoutDesign<'_> {
    fn genes(&self) -> Vec<GeneDescriptor> {
        let (x_min, x_max) = self.foundation.x_range();
        let (y_min, y_max) = self.foundation.y_range();
        (0..self.positions.len())
            .flat_map(|i| {
                [
                    GeneDescriptor::linear(format!("X {i}"), x_min, x_max),
                    GeneDescriptor::linear(format!("Y {i}"), y_min, y_max),
                ]
            })
            .collect()
    }

    fn current_values(&self) -> Vec<f64> {
        self.positions.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    fn apply(&mut self, values: &[f64]) {
        for (point, pair) in self.positions.iter_mut().zip(values.chunks_exact(2)) {
            point.x = pair[0];
            point.y = pair[1];
        }
    }

    fn shape(&self) -> ChromosomeShape {
        ChromosomeShape::PairedXY
    }
}
