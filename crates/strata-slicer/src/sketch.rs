//! Section sketches: the curves cut from the source bodies by one layer plane.

use slotmap::{new_key_type, SlotMap};
use strata_math::{Point2, Tolerance};
use strata_mesh::intersect_plane;

use crate::design::{Body, BodyId, Design};
use crate::sweep::LayerPlane;

new_key_type! {
    /// Key of a curve within its sketch.
    pub struct CurveId;
}

/// A line curve in sketch coordinates (plane-local XY).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchCurve {
    /// Start point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
    /// Construction curves are reference geometry and never form profiles.
    pub construction: bool,
    /// Body the curve was cut from, if any.
    pub body: Option<BodyId>,
}

impl SketchCurve {
    /// A regular line curve.
    pub fn line(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            construction: false,
            body: None,
        }
    }

    /// A construction line.
    pub fn construction(start: Point2, end: Point2) -> Self {
        Self {
            construction: true,
            ..Self::line(start, end)
        }
    }

    /// Curve length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A planar sketch on a layer plane.
#[derive(Debug, Clone)]
pub struct Sketch {
    /// Plane the sketch lies on.
    pub plane: LayerPlane,
    /// Bodies whose boundary was projected into this sketch.
    pub bodies: Vec<BodyId>,
    curves: SlotMap<CurveId, SketchCurve>,
}

impl Sketch {
    /// An empty sketch on `plane`.
    pub fn new(plane: LayerPlane) -> Self {
        Self {
            plane,
            bodies: Vec::new(),
            curves: SlotMap::with_key(),
        }
    }

    /// Add a curve, returning its key.
    pub fn add_curve(&mut self, curve: SketchCurve) -> CurveId {
        self.curves.insert(curve)
    }

    /// Look up a curve.
    pub fn curve(&self, id: CurveId) -> Option<&SketchCurve> {
        self.curves.get(id)
    }

    /// Iterate over curves in insertion order.
    pub fn curves(&self) -> impl Iterator<Item = (CurveId, &SketchCurve)> {
        self.curves.iter()
    }

    /// Number of curves, construction curves included.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True if the sketch has no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Cut `body` with the sketch plane and add the resulting curves.
    ///
    /// Returns the number of curves added. Cuts shorter than the linear
    /// tolerance are dropped.
    pub fn project_cut_edges(&mut self, id: BodyId, body: &Body) -> usize {
        let tol = Tolerance::DEFAULT;
        let mut added = 0;
        for (start, end) in intersect_plane(&body.mesh, self.plane.z) {
            if tol.points_equal(&start, &end) {
                continue;
            }
            self.add_curve(SketchCurve {
                body: Some(id),
                ..SketchCurve::line(start, end)
            });
            added += 1;
        }
        self.bodies.push(id);
        added
    }
}

/// Build the section sketch of every body spanning `plane`.
///
/// Bodies are selected with the half-open rule of [`Body::spans`]. When no
/// body qualifies the sketch is empty.
pub fn cross_section(design: &Design, plane: LayerPlane) -> Sketch {
    let mut sketch = Sketch::new(plane);
    for (id, body) in design.bodies() {
        if body.spans(plane.z) {
            sketch.project_cut_edges(id, body);
        }
    }
    sketch
}
