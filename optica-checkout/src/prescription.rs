//! Prescription capture
//!
//! Whether the form is required at all hangs off
//! [`LensType::requires_prescription`]: plano fashion lenses skip
//! capture entirely and the line carries an empty prescription.
//! Bounds follow what a dispensing optician will actually cut.

use crate::error::ValidationError;
use shared::models::LensType;
use shared::prescription::{EyePrescription, PrescriptionData};

/// Dioptre range accepted for sphere values
const SPHERE_RANGE: (f64, f64) = (-30.0, 30.0);
/// Dioptre range accepted for cylinder values
const CYLINDER_RANGE: (f64, f64) = (-10.0, 10.0);
/// Cylinder axis range in degrees
const AXIS_RANGE: (f64, f64) = (0.0, 180.0);
/// Pupillary distance range in millimetres
const PD_RANGE: (f64, f64) = (40.0, 85.0);

/// Raw prescription inputs as typed at the counter. Everything is
/// optional here; what must be present depends on the lens type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrescriptionForm {
    pub sphere_od: Option<f64>,
    pub sphere_os: Option<f64>,
    pub cylinder_od: Option<f64>,
    pub cylinder_os: Option<f64>,
    pub axis_od: Option<f64>,
    pub axis_os: Option<f64>,
    pub pd: Option<f64>,
}

impl PrescriptionForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[inline]
fn require_finite(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(
            field,
            format!("must be a finite number, got {value}"),
        ));
    }
    Ok(())
}

fn check_range(value: f64, range: (f64, f64), field: &str) -> Result<f64, ValidationError> {
    require_finite(value, field)?;
    if !(range.0..=range.1).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}, got {value}", range.0, range.1),
        ));
    }
    Ok(value)
}

fn capture_eye(
    sphere: Option<f64>,
    cylinder: Option<f64>,
    axis: Option<f64>,
    eye: &str,
) -> Result<EyePrescription, ValidationError> {
    let sphere = sphere.ok_or_else(|| {
        ValidationError::new(format!("sphere_{eye}"), "sphere is required for this lens type")
    })?;
    let sphere = check_range(sphere, SPHERE_RANGE, &format!("sphere_{eye}"))?;
    let cylinder = check_range(
        cylinder.unwrap_or(0.0),
        CYLINDER_RANGE,
        &format!("cylinder_{eye}"),
    )?;
    let axis = check_range(axis.unwrap_or(0.0), AXIS_RANGE, &format!("axis_{eye}"))?;
    Ok(EyePrescription {
        sphere,
        cylinder,
        axis,
    })
}

/// Turn form input into the prescription carried by a cart line.
///
/// Corrective lens types require sphere for both eyes plus the
/// pupillary distance; cylinder and axis default to zero. Plano types
/// ignore the form and return an empty prescription, so stale input
/// left over from a previous line cannot leak into the order.
pub fn capture(
    lens_type: &LensType,
    form: &PrescriptionForm,
) -> Result<PrescriptionData, ValidationError> {
    if !lens_type.requires_prescription {
        return Ok(PrescriptionData::none());
    }

    let od = capture_eye(form.sphere_od, form.cylinder_od, form.axis_od, "od")?;
    let os = capture_eye(form.sphere_os, form.cylinder_os, form.axis_os, "os")?;
    let pd = form
        .pd
        .ok_or_else(|| ValidationError::new("pd", "pupillary distance is required"))?;
    let pd = check_range(pd, PD_RANGE, "pd")?;

    Ok(PrescriptionData {
        od: Some(od),
        os: Some(os),
        pd: Some(pd),
    })
}
