//! Field evaluation parameters

use fitfield_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALE: f32 = 40.0;
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Neighborhood bandwidth and number of MLS re-centering steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    pub scale: f32,
    pub iterations: u32,
}

impl Default for FitParameters {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl FitParameters {
    pub fn new(scale: f32, iterations: u32) -> Result<Self> {
        let params = Self { scale, iterations };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidParameter(
                "at least one MLS iteration is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration shared by every field evaluator of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    pub params: FitParameters,
    /// Point used by the anchored evaluators
    pub anchor: usize,
    /// Draw the projection path of every point
    pub trajectories: bool,
}

impl FieldConfig {
    pub fn with_params(mut self, params: FitParameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_anchor(mut self, anchor: usize) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_trajectories(mut self, trajectories: bool) -> Self {
        self.trajectories = trajectories;
        self
    }

    /// Anchor index checked against the number of points
    pub fn checked_anchor(&self, len: usize) -> Result<usize> {
        if self.anchor < len {
            Ok(self.anchor)
        } else {
            Err(Error::AnchorOutOfRange {
                index: self.anchor,
                len,
            })
        }
    }
}
