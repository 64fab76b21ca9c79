//! The design context: source bodies and the components that own created geometry.
//!
//! A [`Design`] is passed explicitly to every stage. New geometry always
//! lands in the *active* component, so callers that create bodies must
//! activate the component they mean to fill.

use slotmap::{new_key_type, SlotMap};
use strata_math::Aabb3;
use strata_mesh::{TriangleMesh, PLANE_EPS};

use crate::error::{Result, SlicerError};
use crate::extrude::{SurfaceBody, SurfaceKind};
use crate::sketch::Sketch;
use crate::sweep::LayerPlane;

new_key_type! {
    /// Key of a source body.
    pub struct BodyId;
    /// Key of a component.
    pub struct ComponentId;
}

/// A source solid.
#[derive(Debug, Clone)]
pub struct Body {
    /// Display name.
    pub name: String,
    /// Closed triangle mesh of the solid.
    pub mesh: TriangleMesh,
    /// Cached bounds of `mesh`.
    pub bounds: Aabb3,
}

impl Body {
    /// Whether this body contributes to the section at `z`.
    ///
    /// Half-open: the bottom face is included, the top face is not. Heights
    /// within [`PLANE_EPS`] of a face count as on it, matching the section cut.
    pub fn spans(&self, z: f64) -> bool {
        self.bounds.min.z - PLANE_EPS <= z && z < self.bounds.max.z - PLANE_EPS
    }
}

/// A named container of created geometry.
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// Display name.
    pub name: String,
    /// Construction planes, in creation order.
    pub planes: Vec<LayerPlane>,
    /// Section sketches, in creation order.
    pub sketches: Vec<Sketch>,
    /// Surface bodies, in creation order.
    pub surfaces: Vec<SurfaceBody>,
}

impl Component {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Surfaces extruded directly from section profiles.
    pub fn layer_surfaces(&self) -> impl Iterator<Item = &SurfaceBody> {
        self.surfaces
            .iter()
            .filter(|s| matches!(s.kind, SurfaceKind::Layer))
    }

    /// Surfaces produced by contour offsetting.
    pub fn offset_surfaces(&self) -> impl Iterator<Item = &SurfaceBody> {
        self.surfaces
            .iter()
            .filter(|s| matches!(s.kind, SurfaceKind::Offset { .. }))
    }

    /// All surfaces of one layer.
    pub fn surfaces_in_layer(&self, layer: usize) -> impl Iterator<Item = &SurfaceBody> {
        self.surfaces.iter().filter(move |s| s.layer == layer)
    }
}

/// Source bodies plus the components created while slicing them.
#[derive(Debug, Clone)]
pub struct Design {
    bodies: SlotMap<BodyId, Body>,
    components: SlotMap<ComponentId, Component>,
    root: ComponentId,
    active: ComponentId,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    /// An empty design whose root component is active.
    pub fn new() -> Self {
        let mut components = SlotMap::with_key();
        let root = components.insert(Component::new("root"));
        Self {
            bodies: SlotMap::with_key(),
            components,
            root,
            active: root,
        }
    }

    /// Add a source body. The mesh must be a non-empty, well-formed triangle mesh.
    pub fn add_body(&mut self, name: impl Into<String>, mesh: TriangleMesh) -> Result<BodyId> {
        let name = name.into();
        let invalid = |source| SlicerError::InvalidBody {
            name: name.clone(),
            source,
        };
        mesh.validate().map_err(invalid)?;
        let bounds = mesh.bounds().ok_or(strata_mesh::MeshError::Empty).map_err(invalid)?;
        Ok(self.bodies.insert(Body { name, mesh, bounds }))
    }

    /// Look up a source body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Iterate over source bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    /// Number of source bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bounds of every source body, or `None` if there are none.
    pub fn model_bounds(&self) -> Option<Aabb3> {
        let mut bounds = Aabb3::empty();
        for body in self.bodies.values() {
            bounds.include(&body.bounds);
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    /// The root component.
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// The component that receives new geometry.
    pub fn active(&self) -> ComponentId {
        self.active
    }

    /// Create a new, empty component under the root. Does not activate it.
    pub fn add_component(&mut self, name: &str) -> ComponentId {
        self.components.insert(Component::new(name))
    }

    /// Make `id` the component that receives new geometry.
    pub fn activate(&mut self, id: ComponentId) -> Result<()> {
        if !self.components.contains_key(id) {
            return Err(SlicerError::UnknownComponent);
        }
        self.active = id;
        Ok(())
    }

    /// Look up a component.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// First component with the given name.
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| id)
    }

    fn active_component_mut(&mut self) -> &mut Component {
        &mut self.components[self.active]
    }

    /// Add a plane to the active component.
    pub fn add_plane(&mut self, plane: LayerPlane) {
        self.active_component_mut().planes.push(plane);
    }

    /// Add a sketch to the active component.
    pub fn add_sketch(&mut self, sketch: Sketch) {
        self.active_component_mut().sketches.push(sketch);
    }

    /// Add a surface to the active component, returning its index there.
    pub fn add_surface(&mut self, surface: SurfaceBody) -> usize {
        let surfaces = &mut self.active_component_mut().surfaces;
        surfaces.push(surface);
        surfaces.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Point3;

    fn unit_cube() -> TriangleMesh {
        TriangleMesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_body_span_is_half_open() {
        let mut design = Design::new();
        let id = design.add_body("cube", unit_cube()).unwrap();
        let body = design.body(id).unwrap();
        assert!(body.spans(0.0));
        assert!(body.spans(0.5));
        assert!(!body.spans(1.0));
        assert!(!body.spans(-0.1));
        assert!(!body.spans(1.0 - 1e-12));
    }

    #[test]
    fn test_body_span_absorbs_height_drift() {
        let mut design = Design::new();
        let mut cube = unit_cube();
        cube.translate(strata_math::Vec3::new(0.0, 0.0, 0.3));
        let id = design.add_body("raised", cube).unwrap();

        // 0.1 * 3 style drift lands just below the bottom face.
        let z = 0.29999999999999993;
        assert!(z < 0.3);
        assert!(design.body(id).unwrap().spans(z));

        let sketch = crate::sketch::cross_section(&design, LayerPlane::new(0, z));
        assert_eq!(sketch.bodies, vec![id]);
        assert_eq!(sketch.len(), 4);
    }

    #[test]
    fn test_add_body_rejects_empty_mesh() {
        let mut design = Design::new();
        let err = design.add_body("nothing", TriangleMesh::new()).unwrap_err();
        assert!(matches!(err, SlicerError::InvalidBody { ref name, .. } if name == "nothing"));
        assert_eq!(design.body_count(), 0);
    }

    #[test]
    fn test_model_bounds_cover_all_bodies() {
        let mut design = Design::new();
        assert!(design.model_bounds().is_none());

        design.add_body("a", unit_cube()).unwrap();
        let mut b = unit_cube();
        b.translate(strata_math::Vec3::new(3.0, 0.0, 2.0));
        design.add_body("b", b).unwrap();

        let bounds = design.model_bounds().unwrap();
        assert_eq!(bounds.min.z, 0.0);
        assert_eq!(bounds.max.z, 3.0);
        assert_eq!(bounds.max.x, 4.0);
    }

    #[test]
    fn test_geometry_goes_to_active_component() {
        let mut design = Design::new();
        let container = design.add_component("extrusions");
        assert_eq!(design.active(), design.root());

        design.add_plane(LayerPlane::new(0, 0.0));
        design.activate(container).unwrap();
        design.add_plane(LayerPlane::anchor(0.0));
        design.add_plane(LayerPlane::new(1, 0.1));

        assert_eq!(design.component(design.root()).unwrap().planes.len(), 1);
        assert_eq!(design.component(container).unwrap().planes.len(), 2);
        assert_eq!(design.find_component("extrusions"), Some(container));
    }

    #[test]
    fn test_activate_unknown_component() {
        let mut design = Design::new();
        let mut other = Design::new();
        // Second slot in `other`; `design` only has its root.
        let foreign = other.add_component("elsewhere");
        assert!(matches!(
            design.activate(foreign),
            Err(SlicerError::UnknownComponent)
        ));
        assert_eq!(design.active(), design.root());
    }
}
