//! Digitization description attached to a sensitive detector element.

use crate::error::{Error, Result};
use crate::segmentation::CartesianSegmentation;

/// Readout description of a planar silicon module.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizationModule {
    segmentation: CartesianSegmentation,
    half_thickness: f64,
    readout_direction: i32,
    lorentz_angle: f64,
}

impl DigitizationModule {
    /// Creates a module description.
    ///
    /// `readout_direction` is `+1` or `-1` and selects the face of the module
    /// towards which charge drifts.
    ///
    /// # Errors
    /// Fails for a non-positive thickness, a readout direction other than
    /// `±1`, or a non-finite Lorentz angle.
    pub fn new(
        segmentation: CartesianSegmentation,
        half_thickness: f64,
        readout_direction: i32,
        lorentz_angle: f64,
    ) -> Result<Self> {
        if !(half_thickness > 0.0) {
            return Err(Error::InvalidModule(format!(
                "half thickness must be positive, got {half_thickness}"
            )));
        }
        if readout_direction != 1 && readout_direction != -1 {
            return Err(Error::InvalidModule(format!(
                "readout direction must be +1 or -1, got {readout_direction}"
            )));
        }
        if !lorentz_angle.is_finite() {
            return Err(Error::InvalidModule(format!(
                "lorentz angle must be finite, got {lorentz_angle}"
            )));
        }
        Ok(Self {
            segmentation,
            half_thickness,
            readout_direction,
            lorentz_angle,
        })
    }

    /// Readout segmentation.
    #[must_use]
    pub fn segmentation(&self) -> &CartesianSegmentation {
        &self.segmentation
    }

    /// Half thickness of the sensitive volume.
    #[must_use]
    pub fn half_thickness(&self) -> f64 {
        self.half_thickness
    }

    /// Full sensor thickness.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        2.0 * self.half_thickness
    }

    /// Side of the readout along local z, `+1` or `-1`.
    #[must_use]
    pub fn readout_direction(&self) -> i32 {
        self.readout_direction
    }

    /// Lorentz angle in radians.
    #[must_use]
    pub fn lorentz_angle(&self) -> f64 {
        self.lorentz_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segmentation() -> CartesianSegmentation {
        CartesianSegmentation::new(2, 2, 1.0, 1.0).unwrap()
    }

    #[test]
    fn test_module_accessors() {
        let module = DigitizationModule::new(segmentation(), 0.15, -1, 0.1).unwrap();
        assert_relative_eq!(module.thickness(), 0.3);
        assert_eq!(module.readout_direction(), -1);
        assert_relative_eq!(module.lorentz_angle(), 0.1);
        assert_eq!(module.segmentation().channels(), (2, 2));
    }

    #[test]
    fn test_module_validation() {
        assert!(DigitizationModule::new(segmentation(), 0.0, 1, 0.0).is_err());
        assert!(DigitizationModule::new(segmentation(), 0.1, 0, 0.0).is_err());
        assert!(DigitizationModule::new(segmentation(), 0.1, 1, f64::NAN).is_err());
    }
}
