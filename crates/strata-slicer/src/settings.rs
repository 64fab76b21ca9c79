//! Slicing parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlicerError};

/// Slicing parameters supplied by the host for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    /// Distance between layer planes (mm).
    pub layer_height: f64,
    /// Number of contours per profile, including the base surface.
    pub num_contours: u32,
    /// Distance between nested contours (mm).
    pub contour_width: f64,
    /// Gap left between a layer's surface and the next plane (mm).
    pub extrude_margin: f64,
    /// Name of the component that receives all created geometry.
    pub container_name: String,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.254,
            num_contours: 3,
            contour_width: 0.508,
            extrude_margin: 0.001,
            container_name: "extrusions".into(),
        }
    }
}

impl SliceSettings {
    /// Settings with the three host parameters and default extras.
    pub fn new(layer_height: f64, num_contours: u32, contour_width: f64) -> Self {
        Self {
            layer_height,
            num_contours,
            contour_width,
            ..Default::default()
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.layer_height > 0.0 && self.layer_height.is_finite()) {
            return Err(SlicerError::InvalidSettings(format!(
                "layer_height must be positive, got {}",
                self.layer_height
            )));
        }
        if !(self.contour_width > 0.0 && self.contour_width.is_finite()) {
            return Err(SlicerError::InvalidSettings(format!(
                "contour_width must be positive, got {}",
                self.contour_width
            )));
        }
        if self.num_contours < 2 {
            return Err(SlicerError::InvalidSettings(format!(
                "num_contours must be at least 2, got {}",
                self.num_contours
            )));
        }
        if !(self.extrude_margin >= 0.0 && self.extrude_margin < self.layer_height) {
            return Err(SlicerError::InvalidSettings(format!(
                "extrude_margin must be in [0, layer_height), got {}",
                self.extrude_margin
            )));
        }
        if self.container_name.trim().is_empty() {
            return Err(SlicerError::InvalidSettings(
                "container_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Extrusion distance of every layer surface.
    pub fn thickness(&self) -> f64 {
        self.layer_height - self.extrude_margin
    }

    /// Signed offset of contour `i`; negative is towards the material.
    pub fn contour_offset(&self, i: u32) -> f64 {
        -(self.contour_width * i as f64)
    }
}
