//! Optical prescription types
//!
//! OD is the right eye, OS the left. Sphere and cylinder are dioptres,
//! axis is degrees, pupillary distance is millimetres. Plano orders
//! carry an empty prescription.

use serde::{Deserialize, Serialize};

/// Parameters for a single eye.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct EyePrescription {
    /// Spherical correction in dioptres (negative = myopia)
    pub sphere: f64,
    /// Cylindrical correction in dioptres
    #[serde(default)]
    pub cylinder: f64,
    /// Cylinder axis in degrees (0-180)
    #[serde(default)]
    pub axis: f64,
}

/// Prescription attached to one order line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PrescriptionData {
    /// Right eye
    #[serde(skip_serializing_if = "Option::is_none")]
    pub od: Option<EyePrescription>,
    /// Left eye
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<EyePrescription>,
    /// Pupillary distance in millimetres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pd: Option<f64>,
}

impl PrescriptionData {
    /// Empty prescription used for plano (non-corrective) lenses.
    pub fn none() -> Self {
        Self::default()
    }

    /// True when no optical parameter has been captured.
    pub fn is_empty(&self) -> bool {
        self.od.is_none() && self.os.is_none() && self.pd.is_none()
    }
}
