#![warn(missing_docs)]

//! Layered shape-to-surface slicing.
//!
//! Sweeps horizontal planes through the bodies of a [`Design`], cuts each
//! body with every plane it spans, groups the section curves into connected
//! profiles and extrudes each profile upwards into an uncapped surface one
//! layer thick. Every closed layer surface then gets nested contour surfaces
//! offset towards the material.
//!
//! # Example
//!
//! ```ignore
//! use strata_slicer::{run_slice, Design, SliceSettings};
//! use strata_mesh::TriangleMesh;
//!
//! let mut design = Design::new();
//! design.add_body("part", mesh)?;
//! let report = run_slice(&mut design, &SliceSettings::new(0.1, 3, 0.05))?;
//!
//! println!("Layers: {}", report.stats.layer_count);
//! println!("Surfaces: {}", report.stats.layer_surfaces + report.stats.offset_surfaces);
//! ```

pub mod design;
pub mod error;
pub mod extrude;
pub mod offset;
pub mod path;
pub mod profile;
pub mod settings;
pub mod sketch;
pub mod slice;
pub mod sweep;

pub use design::{Body, BodyId, Component, ComponentId, Design};
pub use error::{ExtrudeError, OffsetDegeneracy, Result, SlicerError};
pub use extrude::{extrude_profile, path_mesh, surface_mesh, SurfaceBody, SurfaceKind};
pub use offset::{generate_contours, ContourAttempt, OffsetOutcome};
pub use path::{Polygon, Polyline};
pub use profile::{partition_profiles, ConnectedProfile, ProfilePath};
pub use settings::SliceSettings;
pub use sketch::{cross_section, CurveId, Sketch, SketchCurve};
pub use slice::{plan_layers, run_slice, LayerReport, SkippedOffset, SkippedProfile, SliceReport, SliceStats};
pub use sweep::{generate_layer_heights, LayerPlane};
