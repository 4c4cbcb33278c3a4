//! Selection of the active field evaluator by name

use crate::passes::{AnchoredField, DistanceField, DistanceFromPoint, GlobalField, MlsField, RenderPass};
use fitfield_algorithms::FitKind;
use fitfield_core::{Error, Result};
use std::fmt;

/// Every field evaluator the pipeline can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    DistanceField,
    DistanceFromPoint,
    /// Per-pixel MLS fit
    Mls(FitKind),
    /// One unweighted fit of the whole set
    Global(FitKind),
    /// One MLS fit grown from the anchor point
    Anchored(FitKind),
}

impl Default for FieldKind {
    fn default() -> Self {
        FieldKind::Mls(FitKind::OrientedSphere)
    }
}

impl FieldKind {
    pub fn all() -> Vec<FieldKind> {
        let mut kinds = vec![FieldKind::DistanceField, FieldKind::DistanceFromPoint];
        kinds.extend(FitKind::ALL.map(FieldKind::Mls));
        kinds.extend(FitKind::ALL.map(FieldKind::Global));
        kinds.extend(FitKind::ALL.map(FieldKind::Anchored));
        kinds
    }

    pub fn name(&self) -> String {
        match self {
            FieldKind::DistanceField => "Distance Field".to_string(),
            FieldKind::DistanceFromPoint => "Distance From Point".to_string(),
            FieldKind::Mls(kind) => kind.name().to_string(),
            FieldKind::Global(kind) => format!("Best {}", kind.name()),
            FieldKind::Anchored(kind) => format!("One {}", kind.name()),
        }
    }

    /// Exact name lookup
    pub fn from_name(name: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| Error::UnknownFitType(name.to_string()))
    }

    /// Fresh evaluator instance
    pub fn create_pass(&self) -> Box<dyn RenderPass> {
        match *self {
            FieldKind::DistanceField => Box::new(DistanceField),
            FieldKind::DistanceFromPoint => Box::new(DistanceFromPoint),
            FieldKind::Mls(kind) => Box::new(MlsField::new(kind)),
            FieldKind::Global(kind) => Box::new(GlobalField::new(kind)),
            FieldKind::Anchored(kind) => Box::new(AnchoredField::new(kind)),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
