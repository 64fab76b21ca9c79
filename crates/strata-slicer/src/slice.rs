//! The slicing driver: sweep planes through the model and build the layer
//! and contour surfaces of every section.

use serde::Serialize;
use strata_math::{Aabb3, Tolerance};
use tracing::{debug, info, warn};

use crate::design::{ComponentId, Design};
use crate::error::{OffsetDegeneracy, Result, SlicerError};
use crate::extrude::{extrude_profile, SurfaceBody, SurfaceKind};
use crate::offset::{generate_contours, OffsetOutcome};
use crate::path::Polygon;
use crate::profile::{partition_profiles, ProfilePath};
use crate::settings::SliceSettings;
use crate::sketch::cross_section;
use crate::sweep::{generate_layer_heights, LayerPlane};

/// A profile that could not be extruded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedProfile {
    /// Profile index within the layer.
    pub profile: usize,
    /// Number of curves in the profile.
    pub curves: usize,
    /// Why it was skipped.
    pub reason: String,
}

/// An offset attempt that produced no body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOffset {
    /// Container index of the layer surface that was offset.
    pub surface: usize,
    /// Contour number.
    pub contour: u32,
    /// Signed offset distance.
    pub distance: f64,
    /// Why no body was produced.
    pub reason: OffsetDegeneracy,
}

/// What happened on one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    /// Layer index.
    pub index: usize,
    /// Plane height.
    pub z: f64,
    /// Source bodies spanning the plane.
    pub bodies: usize,
    /// Curves in the section sketch.
    pub curves: usize,
    /// Connected profiles found.
    pub profiles: usize,
    /// Surface bodies created, contours included.
    pub surfaces: usize,
    /// Profiles that could not be extruded.
    pub skipped_profiles: Vec<SkippedProfile>,
    /// Offsets that were degenerate.
    pub degenerate_offsets: Vec<SkippedOffset>,
}

impl LayerReport {
    fn new(plane: LayerPlane) -> Self {
        Self {
            index: plane.index,
            z: plane.z,
            bodies: 0,
            curves: 0,
            profiles: 0,
            surfaces: 0,
            skipped_profiles: Vec::new(),
            degenerate_offsets: Vec::new(),
        }
    }
}

/// Totals over all layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SliceStats {
    /// Layer planes created (the anchor plane not included).
    pub layer_count: usize,
    /// Layers with at least one profile.
    pub populated_layers: usize,
    /// Surfaces extruded from profiles.
    pub layer_surfaces: usize,
    /// Surfaces created by offsetting.
    pub offset_surfaces: usize,
    /// Profiles skipped.
    pub skipped_profiles: usize,
    /// Degenerate offsets.
    pub degenerate_offsets: usize,
}

/// Summary of one slicing run.
#[derive(Debug, Clone, Serialize)]
pub struct SliceReport {
    /// Component holding every created plane, sketch and surface.
    #[serde(skip)]
    pub container: ComponentId,
    /// Lower corner of the model bounds.
    pub bounds_min: [f64; 3],
    /// Upper corner of the model bounds.
    pub bounds_max: [f64; 3],
    /// Per-layer results, bottom to top.
    pub layers: Vec<LayerReport>,
    /// Totals.
    pub stats: SliceStats,
}

/// Layer heights `run_slice` would use for `design`, with the model bounds.
///
/// Performs the same precondition checks as [`run_slice`] without creating
/// any geometry.
pub fn plan_layers(design: &Design, settings: &SliceSettings) -> Result<(Aabb3, Vec<f64>)> {
    settings.validate()?;
    let bounds = design.model_bounds().ok_or(SlicerError::EmptyModel)?;
    if bounds.height() <= Tolerance::DEFAULT.linear {
        return Err(SlicerError::DegenerateBounds {
            min_z: bounds.min.z,
            max_z: bounds.max.z,
        });
    }
    let heights = generate_layer_heights(bounds.min.z, bounds.max.z, settings.layer_height);
    Ok((bounds, heights))
}

/// Slice every body of `design` into layer and contour surfaces.
///
/// All geometry is created in a new component named
/// `settings.container_name`. Invalid settings, an empty model or a flat
/// model are reported before anything is created. Profiles that cannot be
/// extruded and degenerate offsets are recorded in the report and skipped.
/// The component that was active on entry is active again on return.
pub fn run_slice(design: &mut Design, settings: &SliceSettings) -> Result<SliceReport> {
    let (bounds, heights) = plan_layers(design, settings)?;
    let previous = design.active();

    let container = design.add_component(&settings.container_name);
    design.activate(container)?;
    design.add_plane(LayerPlane::anchor(bounds.min.z));

    let mut layers = Vec::with_capacity(heights.len());
    for (index, &z) in heights.iter().enumerate() {
        let plane = LayerPlane::new(index, z);
        design.activate(container)?;
        design.add_plane(plane);
        layers.push(slice_layer(design, container, plane, settings)?);
    }

    design.activate(previous)?;

    let stats = summarize(design, container, &layers);
    info!(
        layers = stats.layer_count,
        populated = stats.populated_layers,
        surfaces = stats.layer_surfaces,
        contours = stats.offset_surfaces,
        skipped = stats.skipped_profiles,
        degenerate = stats.degenerate_offsets,
        "slice complete"
    );

    Ok(SliceReport {
        container,
        bounds_min: [bounds.min.x, bounds.min.y, bounds.min.z],
        bounds_max: [bounds.max.x, bounds.max.y, bounds.max.z],
        layers,
        stats,
    })
}

/// Section one plane, extrude its profiles and offset the results.
fn slice_layer(
    design: &mut Design,
    container: ComponentId,
    plane: LayerPlane,
    settings: &SliceSettings,
) -> Result<LayerReport> {
    let thickness = settings.thickness();
    let sketch = cross_section(design, plane);
    let profiles = partition_profiles(&sketch);

    let mut report = LayerReport::new(plane);
    report.bodies = sketch.bodies.len();
    report.curves = sketch.len();
    report.profiles = profiles.len();

    let mut extruded = Vec::with_capacity(profiles.len());
    for (p, profile) in profiles.iter().enumerate() {
        match extrude_profile(&sketch, profile, thickness) {
            Ok((path, mesh)) => extruded.push((p, path, mesh)),
            Err(err) => {
                warn!(layer = plane.index, profile = p, %err, "skipping profile");
                report.skipped_profiles.push(SkippedProfile {
                    profile: p,
                    curves: profile.len(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let holes = classify_holes(extruded.iter().map(|(_, path, _)| path));
    for ((p, path, mesh), hole) in extruded.into_iter().zip(holes) {
        design.activate(container)?;
        let base = design.add_surface(SurfaceBody {
            name: format!("layer{}-profile{p}", plane.index),
            layer: plane.index,
            z: plane.z,
            thickness,
            kind: SurfaceKind::Layer,
            hole,
            path,
            mesh,
        });
        report.surfaces += 1;

        for attempt in generate_contours(design, container, base, settings)? {
            match attempt.outcome {
                OffsetOutcome::Created { .. } => report.surfaces += 1,
                OffsetOutcome::Degenerate(reason) => report.degenerate_offsets.push(SkippedOffset {
                    surface: base,
                    contour: attempt.contour,
                    distance: attempt.distance,
                    reason,
                }),
            }
        }
    }

    design.activate(container)?;
    design.add_sketch(sketch);

    debug!(
        layer = plane.index,
        z = plane.z,
        bodies = report.bodies,
        profiles = report.profiles,
        surfaces = report.surfaces,
        "layer sliced"
    );
    Ok(report)
}

/// Mark each closed path lying inside an odd number of other closed paths.
fn classify_holes<'a>(paths: impl Iterator<Item = &'a ProfilePath>) -> Vec<bool> {
    let loops: Vec<Option<&Polygon>> = paths
        .map(|path| match path {
            ProfilePath::Closed(polygon) => Some(polygon),
            ProfilePath::Open(_) | ProfilePath::Branched(_) => None,
        })
        .collect();

    loops
        .iter()
        .enumerate()
        .map(|(i, polygon)| {
            let Some(sample) = polygon.and_then(|p| p.points.first()) else {
                return false;
            };
            let depth = loops
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && other.is_some_and(|o| o.contains(sample)))
                .count();
            depth % 2 == 1
        })
        .collect()
}

fn summarize(design: &Design, container: ComponentId, layers: &[LayerReport]) -> SliceStats {
    let mut stats = SliceStats {
        layer_count: layers.len(),
        populated_layers: layers.iter().filter(|l| l.profiles > 0).count(),
        skipped_profiles: layers.iter().map(|l| l.skipped_profiles.len()).sum(),
        degenerate_offsets: layers.iter().map(|l| l.degenerate_offsets.len()).sum(),
        ..Default::default()
    };
    if let Some(component) = design.component(container) {
        stats.layer_surfaces = component.layer_surfaces().count();
        stats.offset_surfaces = component.offset_surfaces().count();
    }
    stats
}
