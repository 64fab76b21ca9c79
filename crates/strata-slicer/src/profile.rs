//! Connected profiles: grouping section curves by shared endpoints and
//! ordering them into paths.

use std::collections::{HashMap, HashSet, VecDeque};

use strata_math::{Point2, Tolerance};
use strata_mesh::Segment2;

use crate::error::ExtrudeError;
use crate::path::{Polygon, Polyline};
use crate::sketch::{CurveId, Sketch, SketchCurve};

/// Endpoint key on the tolerance grid.
type EndKey = [i64; 2];

/// A set of curves of one sketch connected through shared endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedProfile {
    /// Member curves in traversal order; the first is the seed curve.
    pub curves: Vec<CurveId>,
}

impl ConnectedProfile {
    /// Number of member curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True if the profile has no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

/// Endpoint adjacency of the non-construction curves of a sketch.
struct CurveGraph {
    ends: HashMap<EndKey, Vec<CurveId>>,
}

impl CurveGraph {
    fn build(sketch: &Sketch) -> Self {
        let tol = Tolerance::DEFAULT;
        let mut ends: HashMap<EndKey, Vec<CurveId>> = HashMap::new();
        for (id, curve) in sketch.curves().filter(|(_, c)| !c.construction) {
            for p in [curve.start, curve.end] {
                let touching = ends.entry(tol.snap(&p)).or_default();
                if !touching.contains(&id) {
                    touching.push(id);
                }
            }
        }
        Self { ends }
    }

    fn neighbours<'a>(
        &'a self,
        curve: &SketchCurve,
    ) -> impl Iterator<Item = CurveId> + 'a {
        let tol = Tolerance::DEFAULT;
        [tol.snap(&curve.start), tol.snap(&curve.end)]
            .into_iter()
            .flat_map(move |key| self.ends.get(&key).into_iter().flatten().copied())
    }
}

/// Split the curves of `sketch` into connected profiles.
///
/// Construction curves are ignored. Every other curve belongs to exactly one
/// profile. Profiles are seeded in sketch order, so the result is the same
/// for the same sketch.
pub fn partition_profiles(sketch: &Sketch) -> Vec<ConnectedProfile> {
    let graph = CurveGraph::build(sketch);
    let mut consumed: HashSet<CurveId> = HashSet::new();
    let mut profiles = Vec::new();

    for (seed, curve) in sketch.curves() {
        if curve.construction || consumed.contains(&seed) {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        consumed.insert(seed);
        while let Some(id) = queue.pop_front() {
            members.push(id);
            let Some(curve) = sketch.curve(id) else {
                continue;
            };
            for next in graph.neighbours(curve) {
                if consumed.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        profiles.push(ConnectedProfile { curves: members });
    }
    profiles
}

/// The curves of a profile ordered end to end.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfilePath {
    /// A closed loop; the last point joins back to the first.
    Closed(Polygon),
    /// An open chain from one free end to the other.
    Open(Polyline),
    /// Curves that do not order into one chain, such as where more than two
    /// meet at a point. Kept as unordered segments.
    Branched(Vec<Segment2>),
}

impl ProfilePath {
    /// Order the curves of `profile` into a path.
    ///
    /// Fails if the profile is empty or a curve has zero length. Curves that
    /// branch, or otherwise do not form a single chain, give
    /// [`ProfilePath::Branched`].
    pub fn from_profile(sketch: &Sketch, profile: &ConnectedProfile) -> Result<Self, ExtrudeError> {
        let tol = Tolerance::DEFAULT;
        let curves: Vec<&SketchCurve> = profile
            .curves
            .iter()
            .filter_map(|&id| sketch.curve(id))
            .collect();
        if curves.is_empty() {
            return Err(ExtrudeError::EmptyProfile);
        }
        if let Some(pos) = curves.iter().position(|c| tol.points_equal(&c.start, &c.end)) {
            return Err(ExtrudeError::DegenerateCurve(pos));
        }

        // (curve, end) pairs meeting at each endpoint; end 0 is the start.
        let mut ends: HashMap<EndKey, Vec<(usize, usize)>> = HashMap::new();
        for (i, c) in curves.iter().enumerate() {
            ends.entry(tol.snap(&c.start)).or_default().push((i, 0));
            ends.entry(tol.snap(&c.end)).or_default().push((i, 1));
        }
        let branched = || Self::Branched(curves.iter().map(|c| (c.start, c.end)).collect());
        if ends.values().any(|touching| touching.len() > 2) {
            return Ok(branched());
        }

        // Start from the first free end if there is one, else from curve 0.
        let free_start = curves.iter().enumerate().find_map(|(i, c)| {
            if ends[&tol.snap(&c.start)].len() == 1 {
                Some((i, 0))
            } else if ends[&tol.snap(&c.end)].len() == 1 {
                Some((i, 1))
            } else {
                None
            }
        });
        let closed = free_start.is_none();
        let (mut current, mut entry) = free_start.unwrap_or((0, 0));

        let endpoint = |i: usize, end: usize| -> Point2 {
            if end == 0 {
                curves[i].start
            } else {
                curves[i].end
            }
        };

        let mut used = vec![false; curves.len()];
        let mut points = vec![endpoint(current, entry)];
        loop {
            used[current] = true;
            let exit = endpoint(current, 1 - entry);
            let next = ends[&tol.snap(&exit)]
                .iter()
                .copied()
                .find(|&(i, _)| !used[i]);
            match next {
                Some((i, end)) => {
                    points.push(exit);
                    current = i;
                    entry = end;
                }
                None => {
                    if !closed {
                        points.push(exit);
                    }
                    break;
                }
            }
        }

        // Curves left over mean the profile is not a single chain.
        if used.iter().any(|&u| !u) {
            return Ok(branched());
        }

        if closed {
            if points.len() < 3 {
                return Err(ExtrudeError::SelfIntersecting);
            }
            Ok(Self::Closed(Polygon::new(points)))
        } else {
            Ok(Self::Open(Polyline::new(points)))
        }
    }

    /// Whether the path is a closed loop.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    /// Whether the path crosses or touches itself. Branched paths have no
    /// order to check and count as simple.
    pub fn is_simple(&self) -> bool {
        match self {
            Self::Closed(polygon) => polygon.is_simple(),
            Self::Open(polyline) => polyline.is_simple(),
            Self::Branched(_) => true,
        }
    }
}
