//! Weighting kernels and neighbor filters for local fits

use fitfield_core::{Point2f, Vector2};
use serde::{Deserialize, Serialize};

/// Scalar type used by fit accumulators
pub type Scalar = f64;

/// Kernel applied to the normalized distance `d / t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightKernel {
    /// Smooth compact kernel: (x² - 1)² for x in [0, 1]
    Smooth,
    /// Constant kernel, used for unweighted fits
    Constant,
}

impl WeightKernel {
    /// Kernel value at normalized distance `x` in [0, 1]
    pub fn eval(&self, x: Scalar) -> Scalar {
        match self {
            WeightKernel::Smooth => {
                let v = x * x - 1.0;
                v * v
            }
            WeightKernel::Constant => 1.0,
        }
    }
}

/// Selects and weights neighbors of a fit center.
///
/// Points farther than `scale` from the center get a zero weight and are
/// ignored by the fits. Fits work in coordinates local to the center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborFilter {
    center: Point2f,
    scale: f32,
    kernel: WeightKernel,
}

impl NeighborFilter {
    pub fn new(center: Point2f, scale: f32, kernel: WeightKernel) -> Self {
        Self { center, scale, kernel }
    }

    /// Smooth kernel with bandwidth `scale`
    pub fn smooth(center: Point2f, scale: f32) -> Self {
        Self::new(center, scale, WeightKernel::Smooth)
    }

    /// Constant kernel with support radius `scale`
    pub fn constant(center: Point2f, scale: f32) -> Self {
        Self::new(center, scale, WeightKernel::Constant)
    }

    /// Constant kernel accepting every point
    pub fn unbounded(center: Point2f) -> Self {
        Self::new(center, f32::INFINITY, WeightKernel::Constant)
    }

    pub fn center(&self) -> Point2f {
        self.center
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn kernel(&self) -> WeightKernel {
        self.kernel
    }

    /// Weight of a point; zero outside of the support
    pub fn weight(&self, p: &Point2f) -> Scalar {
        let d = Scalar::from((p - self.center).norm());
        let t = Scalar::from(self.scale);
        if d > t {
            return 0.0;
        }
        if t.is_infinite() {
            return self.kernel.eval(0.0);
        }
        self.kernel.eval(d / t)
    }

    /// Position relative to the filter center
    pub fn to_local(&self, p: &Point2f) -> Vector2<Scalar> {
        (p - self.center).cast::<Scalar>()
    }

    /// Back from local to point space
    pub fn to_global(&self, local: &Vector2<Scalar>) -> Point2f {
        self.center + local.cast::<f32>()
    }
}
