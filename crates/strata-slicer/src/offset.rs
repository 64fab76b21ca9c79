//! Contour offset generation: nested surfaces inset from each layer surface.

use tracing::debug;

use crate::design::{ComponentId, Design};
use crate::error::{OffsetDegeneracy, Result, SlicerError};
use crate::extrude::{surface_mesh, SurfaceBody, SurfaceKind};
use crate::profile::ProfilePath;
use crate::settings::SliceSettings;

/// Result of one offset attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetOutcome {
    /// A new surface body was added at this index of the container.
    Created {
        /// Index of the new surface in the container.
        surface: usize,
    },
    /// No body was produced; later contours are still attempted.
    Degenerate(OffsetDegeneracy),
}

/// One contour of a layer surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourAttempt {
    /// Contour number, starting at 1.
    pub contour: u32,
    /// Signed offset distance used.
    pub distance: f64,
    /// What happened.
    pub outcome: OffsetOutcome,
}

/// Add contours `1..num_contours` of surface `base` of `container`.
///
/// Each contour offsets the base path by [`SliceSettings::contour_offset`]
/// towards the material and extrudes it by the base thickness. The container
/// is activated before every attempt. The base surface is left unchanged.
pub fn generate_contours(
    design: &mut Design,
    container: ComponentId,
    base: usize,
    settings: &SliceSettings,
) -> Result<Vec<ContourAttempt>> {
    let source = design
        .component(container)
        .ok_or(SlicerError::UnknownComponent)?
        .surfaces
        .get(base)
        .cloned()
        .ok_or(SlicerError::UnknownSurface(base))?;

    let mut attempts = Vec::with_capacity(settings.num_contours.saturating_sub(1) as usize);
    for contour in 1..settings.num_contours {
        design.activate(container)?;
        let distance = settings.contour_offset(contour);

        let offset = match &source.path {
            ProfilePath::Open(_) => Err(OffsetDegeneracy::OpenProfile),
            ProfilePath::Branched(_) => Err(OffsetDegeneracy::Branching),
            // Holes have their material outside the loop.
            ProfilePath::Closed(polygon) if source.hole => polygon.offset(-distance),
            ProfilePath::Closed(polygon) => polygon.offset(distance),
        };

        let outcome = match offset {
            Ok(polygon) => {
                let mesh = surface_mesh(&polygon.points, true, source.z, source.thickness);
                let surface = design.add_surface(SurfaceBody {
                    name: format!("{}-contour{contour}", source.name),
                    layer: source.layer,
                    z: source.z,
                    thickness: source.thickness,
                    kind: SurfaceKind::Offset {
                        parent: base,
                        contour,
                        distance,
                    },
                    hole: source.hole,
                    path: ProfilePath::Closed(polygon),
                    mesh,
                });
                OffsetOutcome::Created { surface }
            }
            Err(reason) => {
                debug!(
                    surface = %source.name,
                    contour,
                    distance,
                    %reason,
                    "offset degenerate"
                );
                OffsetOutcome::Degenerate(reason)
            }
        };
        attempts.push(ContourAttempt {
            contour,
            distance,
            outcome,
        });
    }
    Ok(attempts)
}
