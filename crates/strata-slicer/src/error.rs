//! Error types for the slicer.

use serde::Serialize;
use strata_mesh::MeshError;
use thiserror::Error;

/// Fatal errors: the invocation is aborted before any geometry is created.
#[derive(Error, Debug)]
pub enum SlicerError {
    /// Invalid slice settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The design has no source bodies to slice.
    #[error("model has no bodies")]
    EmptyModel,

    /// The model bounding box has no vertical extent.
    #[error("model bounds are degenerate: z {min_z}..{max_z}")]
    DegenerateBounds {
        /// Bottom of the model.
        min_z: f64,
        /// Top of the model.
        max_z: f64,
    },

    /// A body could not be added to the design.
    #[error("body `{name}` is invalid: {source}")]
    InvalidBody {
        /// Body name.
        name: String,
        /// Underlying mesh problem.
        #[source]
        source: MeshError,
    },

    /// A component key does not belong to this design.
    #[error("unknown component")]
    UnknownComponent,

    /// A surface index is out of range for its component.
    #[error("component has no surface {0}")]
    UnknownSurface(usize),
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SlicerError>;

/// Reasons a single profile cannot be extruded. Only that profile is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtrudeError {
    /// The profile has no curves.
    #[error("profile has no curves")]
    EmptyProfile,

    /// A curve of the profile has zero length.
    #[error("curve {0} of the profile has zero length")]
    DegenerateCurve(usize),

    /// The profile crosses itself.
    #[error("profile is self-intersecting")]
    SelfIntersecting,

    /// Extrusion distance is not positive.
    #[error("extrusion thickness must be positive, got {0}")]
    ZeroThickness(f64),
}

/// Expected reasons an offset attempt produces no body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetDegeneracy {
    /// Open profiles have no inside to offset towards.
    #[error("open profile has no inside to offset towards")]
    OpenProfile,

    /// The profile branches, so there is no single loop to offset.
    #[error("branching profile has no single loop to offset")]
    Branching,

    /// The distance exceeds the shape's inscribed radius.
    #[error("offset collapses the profile")]
    Collapsed,

    /// The offset loop crosses itself.
    #[error("offset result self-intersects")]
    SelfIntersecting,
}
