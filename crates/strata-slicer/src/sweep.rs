//! Plane sweep: layer heights and layer planes.

use serde::Serialize;

/// Layer heights within this fraction of a layer above `z_max` still count.
const HEIGHT_SLACK: f64 = 1e-9;

/// A horizontal cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerPlane {
    /// Layer index (0 = bottom layer). The anchor plane also uses 0.
    pub index: usize,
    /// Z height of the plane (mm).
    pub z: f64,
    /// Whether the plane is rendered by the host.
    pub visible: bool,
}

impl LayerPlane {
    /// A visible layer plane.
    pub fn new(index: usize, z: f64) -> Self {
        Self {
            index,
            z,
            visible: true,
        }
    }

    /// The hidden reference plane at the bottom of the model.
    pub fn anchor(z: f64) -> Self {
        Self {
            index: 0,
            z,
            visible: false,
        }
    }
}

/// Generate layer heights from `z_min` to `z_max` inclusive.
///
/// Heights are `z_min + k * layer_height` for every `k` that keeps the height
/// at or below `z_max`. Returns nothing for a non-positive layer height or an
/// inverted range.
pub fn generate_layer_heights(z_min: f64, z_max: f64, layer_height: f64) -> Vec<f64> {
    if !(layer_height > 0.0) || !(z_max >= z_min) {
        return Vec::new();
    }

    let steps = ((z_max - z_min) / layer_height + HEIGHT_SLACK).floor() as usize;
    (0..=steps)
        .map(|k| (z_min + k as f64 * layer_height).min(z_max))
        .collect()
}
