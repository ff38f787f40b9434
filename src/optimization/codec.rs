//! Mapping between normalized genes and domain values.

use std::fmt;
use std::sync::Arc;

/// Converts one domain parameter to and from a gene in [0, 1].
pub trait GeneCodec: fmt::Debug + Send + Sync {
    fn encode(&self, value: f64) -> f64;
    fn decode(&self, gene: f64) -> f64;
}

/// Tilt angle in degrees: gene 0 is -90°, 0.5 is flat, 1 is +90°.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltAngleCodec;

impl TiltAngleCodec {
    pub const MAX_ANGLE: f64 = 90.0;
}

impl GeneCodec for TiltAngleCodec {
    fn encode(&self, angle: f64) -> f64 {
        0.5 * (1.0 + angle / Self::MAX_ANGLE)
    }

    fn decode(&self, gene: f64) -> f64 {
        (2.0 * gene - 1.0) * Self::MAX_ANGLE
    }
}

/// Linear map of [0, 1] onto `[minimum, maximum]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCodec {
    pub minimum: f64,
    pub maximum: f64,
}

impl LinearCodec {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }
}

impl GeneCodec for LinearCodec {
    fn encode(&self, value: f64) -> f64 {
        let span = self.maximum - self.minimum;
        if span == 0.0 {
            return 0.0;
        }
        (value - self.minimum) / span
    }

    fn decode(&self, gene: f64) -> f64 {
        self.minimum + gene * (self.maximum - self.minimum)
    }
}

/// Per-gene metadata: name, domain bounds, integrality and codec.
#[derive(Debug, Clone)]
pub struct GeneDescriptor {
    pub name: String,
    pub minimum: f64,
    pub maximum: f64,
    pub integer: bool,
    codec: Arc<dyn GeneCodec>,
}

impl GeneDescriptor {
    pub fn new(
        name: impl Into<String>,
        minimum: f64,
        maximum: f64,
        codec: Arc<dyn GeneCodec>,
    ) -> Self {
        Self {
            name: name.into(),
            minimum,
            maximum,
            integer: false,
            codec,
        }
    }

    /// Gene over `[minimum, maximum]` with a linear codec.
    pub fn linear(name: impl Into<String>, minimum: f64, maximum: f64) -> Self {
        Self::new(name, minimum, maximum, Arc::new(LinearCodec::new(minimum, maximum)))
    }

    /// Tilt angle gene bounded to ±90°.
    pub fn tilt_angle(name: impl Into<String>) -> Self {
        Self::new(
            name,
            -TiltAngleCodec::MAX_ANGLE,
            TiltAngleCodec::MAX_ANGLE,
            Arc::new(TiltAngleCodec),
        )
    }

    /// Round decoded values to whole numbers.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn codec(&self) -> &dyn GeneCodec {
        self.codec.as_ref()
    }

    /// Domain value to gene, clamped to [0, 1].
    pub fn encode(&self, value: f64) -> f64 {
        self.codec.encode(value).clamp(0.0, 1.0)
    }

    pub fn decode(&self, gene: f64) -> f64 {
        let value = self.codec.decode(gene);
        if self.integer { value.round() } else { value }
    }
}

/// Decode a whole chromosome into domain values.
pub fn decode_genes(genes: &[GeneDescriptor], chromosome: &[f64]) -> Vec<f64> {
    genes
        .iter()
        .zip(chromosome.iter())
        .map(|(descriptor, &gene)| descriptor.decode(gene))
        .collect()
}
