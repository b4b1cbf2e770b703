//! # Object Picking System
//!
//! This module provides 3D object picking using mouse ray-casting. Clicking on a
//! nested mesh (a cushion inside a bed group, a door inside the van shell)
//! resolves to the nearest ancestor tagged as furniture or van.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert pointer coordinates to a world-space ray
//! 2. **Ray-Node Intersection**: Reject visible meshes whose world AABB the ray
//!    misses, then test the remaining ones triangle by triangle
//! 3. **Target Resolution**: Walk each hit's ancestors (bounded) to a tagged object
//!
//! ## Usage
//!
//! ```no_run
//! use vanstudio::gfx::picking::ObjectPicker;
//! # use vanstudio::gfx::{camera::OrbitCamera, scene::Scene};
//! # let camera: OrbitCamera = unimplemented!();
//! # let scene = Scene::new();
//!
//! let picker = ObjectPicker::new(32);
//! if let Some(pick) = picker.pick_object((400.0, 300.0), (800.0, 600.0), &camera, &scene) {
//!     println!("Picked {:?} at {:?}", pick.target, pick.intersection_point);
//! }
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::{
    camera::OrbitCamera,
    scene::{NodeId, ObjectKind, Scene},
};

/// Denominators below this are treated as a ray parallel to a plane.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Determinants below this mean the ray lies in the triangle's plane.
const TRIANGLE_EPSILON: f32 = 1e-10;

/// Barycentric slack so rays through shared edges hit one of the neighbours.
const BARYCENTRIC_TOLERANCE: f32 = 1e-5;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Closest distance between this ray and the segment `a..b`.
    ///
    /// Returns `(distance_between, t_along_ray)`, or `None` when the closest
    /// point lies behind the ray origin.
    pub fn distance_to_segment(&self, a: Vector3<f32>, b: Vector3<f32>) -> Option<(f32, f32)> {
        let segment = b - a;
        let w0 = self.origin - a;
        let aa = self.direction.dot(self.direction);
        let bb = self.direction.dot(segment);
        let cc = segment.dot(segment);
        let dd = self.direction.dot(w0);
        let ee = segment.dot(w0);
        let denom = aa * cc - bb * bb;

        // parallel or degenerate segments measure from `a`
        let s = if denom.abs() < PARALLEL_EPSILON || cc < PARALLEL_EPSILON {
            0.0
        } else {
            ((aa * ee - bb * dd) / denom).clamp(0.0, 1.0)
        };
        let t = (bb * s - dd) / aa;

        if t < 0.0 {
            return None;
        }

        let on_ray = self.point_at(t);
        let on_segment = a + segment * s;
        Some(((on_ray - on_segment).magnitude(), t))
    }

    /// Möller–Trumbore test against both faces of the triangle `a b c`.
    ///
    /// Returns the distance along the ray, or `None` on a miss or when the
    /// triangle lies behind the origin.
    pub fn intersect_triangle(
        &self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if u < -BARYCENTRIC_TOLERANCE || u > 1.0 + BARYCENTRIC_TOLERANCE {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < -BARYCENTRIC_TOLERANCE || u + v > 1.0 + BARYCENTRIC_TOLERANCE {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t >= 0.0 && t.is_finite()).then_some(t)
    }
}

/// An infinite plane `normal · p = normal · point`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal
    pub normal: Vector3<f32>,
    /// Any point on the plane
    pub point: Vector3<f32>,
}

impl Plane {
    pub fn new(normal: Vector3<f32>, point: Vector3<f32>) -> Self {
        Self {
            normal: normal.normalize(),
            point,
        }
    }

    /// Horizontal plane through `point` (normal = world up)
    pub fn horizontal(point: Vector3<f32>) -> Self {
        Self::new(Vector3::unit_y(), point)
    }

    /// Intersect a ray with the plane.
    ///
    /// Returns `None` if the ray is parallel to the plane or the plane lies
    /// behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vector3<f32>> {
        let denom = ray.direction.dot(self.normal);

        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t < 0.0 || !t.is_finite() {
            return None;
        }

        Some(ray.point_at(t))
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Degenerate box containing a single point
    pub fn from_point(point: Vector3<f32>) -> Self {
        Self::new(point, point)
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut aabb = Self::from_point(Vector3::new(first[0], first[1], first[2]));
        for vertex in vertices.iter().skip(1) {
            aabb.expand_to(Vector3::new(vertex[0], vertex[1], vertex[2]));
        }
        aabb
    }

    /// Grow the box to contain `point`
    pub fn expand_to(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        let mut merged = *self;
        merged.expand_to(other.min);
        merged.expand_to(other.max);
        merged
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn contains(&self, point: Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed_corners: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| {
                let transformed = matrix * Vector4::new(corner.x, corner.y, corner.z, 1.0);
                [
                    transformed.x / transformed.w,
                    transformed.y / transformed.w,
                    transformed.z / transformed.w,
                ]
            })
            .collect();

        Self::from_vertices(&transformed_corners)
    }
}

/// A single ray hit against a mesh node
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The mesh node whose triangles were hit
    pub node: NodeId,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Result of an object picking operation
#[derive(Debug, Clone)]
pub struct PickResult {
    /// Tagged (van or furniture) ancestor of the hit node
    pub target: NodeId,
    /// The kind the target is tagged with
    pub kind: ObjectKind,
    /// The mesh node that was actually hit
    pub hit_node: NodeId,
    /// Distance from camera to intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Object picker for 3D mouse selection
#[derive(Debug, Clone)]
pub struct ObjectPicker {
    /// Ancestor levels walked from a hit looking for a tagged node
    max_ancestor_depth: usize,
}

impl ObjectPicker {
    /// Create a new object picker
    pub fn new(max_ancestor_depth: usize) -> Self {
        Self { max_ancestor_depth }
    }

    /// Convert screen coordinates to a world-space ray
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = screen_size;

        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * mouse_x) / screen_width.max(1.0) - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height.max(1.0); // Flip Y axis

        let view_proj_matrix = camera.projection_matrix() * camera.view_matrix();
        let inv_view_proj = view_proj_matrix
            .invert()
            .unwrap_or_else(Matrix4::identity);

        // Transform near and far points from NDC to world space
        let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_3d = world_near.truncate() / world_near.w;
        let far_3d = world_far.truncate() / world_far.w;

        Ray::new(near_3d, far_3d - near_3d)
    }

    /// Every visible mesh node hit by `ray`, closest first
    pub fn intersect_scene(&self, ray: &Ray, scene: &Scene) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = scene
            .iter()
            .filter(|(id, node)| node.mesh.is_some() && scene.is_visible(*id))
            .filter_map(|(id, node)| {
                scene.mesh_bounds(id)?.intersect_ray(ray)?;

                let world = node.matrix_world();
                let to_world = |p: Vector3<f32>| (world * p.extend(1.0)).truncate();
                node.mesh
                    .as_ref()?
                    .triangles()
                    .filter_map(|[a, b, c]| {
                        ray.intersect_triangle(to_world(a), to_world(b), to_world(c))
                    })
                    .min_by(f32::total_cmp)
                    .map(|distance| RayHit { node: id, distance })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest ancestor (or the node itself) tagged as van or furniture.
    ///
    /// Gives up after `max_ancestor_depth` parent hops.
    pub fn resolve_target(&self, scene: &Scene, node: NodeId) -> Option<(NodeId, ObjectKind)> {
        let mut current = Some(node);
        let mut depth = 0;

        while let Some(id) = current {
            if depth > self.max_ancestor_depth {
                log::warn!(
                    "Pick target walk exceeded {} levels from {:?}",
                    self.max_ancestor_depth,
                    node
                );
                return None;
            }

            let candidate = scene.get(id)?;
            if let Some(kind) = candidate.kind {
                return Some((id, kind));
            }

            current = scene.parent(id);
            depth += 1;
        }

        None
    }

    /// Cast `ray` and return the first hit that resolves to a tagged object
    pub fn pick_with_ray(&self, ray: &Ray, scene: &Scene) -> Option<PickResult> {
        self.intersect_scene(ray, scene).into_iter().find_map(|hit| {
            let (target, kind) = self.resolve_target(scene, hit.node)?;
            Some(PickResult {
                target,
                kind,
                hit_node: hit.node,
                distance: hit.distance,
                intersection_point: ray.point_at(hit.distance),
            })
        })
    }

    /// Pick an object from the scene using mouse coordinates
    pub fn pick_object(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
        scene: &Scene,
    ) -> Option<PickResult> {
        let ray = self.screen_to_ray(screen_pos, screen_size, camera);
        self.pick_with_ray(&ray, scene)
    }
}

impl Default for ObjectPicker {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_box, generate_cube};
    use crate::gfx::scene::{Mesh, SceneNode};

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vector3::new(x, 10.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_plane_intersection() {
        let plane = Plane::horizontal(Vector3::new(3.0, 0.5, -2.0));
        let hit = plane.intersect_ray(&down_ray(1.0, 2.0)).unwrap();
        assert!((hit - Vector3::new(1.0, 0.5, 2.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        let plane = Plane::horizontal(Vector3::zero());

        let parallel = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(plane.intersect_ray(&parallel).is_none());

        let pointing_away = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(plane.intersect_ray(&pointing_away).is_none());
    }

    #[test]
    fn test_ray_segment_distance() {
        let ray = Ray::new(Vector3::new(0.5, 5.0, 0.2), Vector3::new(0.0, -1.0, 0.0));
        let (distance, t) = ray
            .distance_to_segment(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!((distance - 0.2).abs() < 1e-5);
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_triangle_intersection() {
        let a = Vector3::new(-1.0, 0.0, -1.0);
        let b = Vector3::new(1.0, 0.0, -1.0);
        let c = Vector3::new(0.0, 0.0, 1.0);

        let t = down_ray(0.0, 0.0).intersect_triangle(a, b, c).unwrap();
        assert!((t - 10.0).abs() < 1e-5);

        // winding does not matter
        assert!(down_ray(0.0, 0.0).intersect_triangle(a, c, b).is_some());

        assert!(down_ray(0.9, 0.9).intersect_triangle(a, b, c).is_none());

        let behind = Ray::new(Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert!(behind.intersect_triangle(a, b, c).is_none());
    }

    /// A box with its top face (the fifth quad) left out
    fn open_top_shell(width: f32, height: f32, depth: f32) -> Mesh {
        let geometry = generate_box(width, height, depth);
        let indices = geometry
            .indices
            .iter()
            .enumerate()
            .filter(|(i, _)| !(24..30).contains(i))
            .map(|(_, index)| *index)
            .collect();
        Mesh::indexed(geometry.vertices, indices)
    }

    #[test]
    fn test_furniture_inside_open_van_is_pickable() {
        let mut scene = Scene::new();
        let van = scene.add(
            SceneNode::new("van")
                .with_kind(ObjectKind::Van)
                .with_mesh(open_top_shell(4.0, 2.0, 4.0)),
        );
        let bed = scene.add(
            SceneNode::new("bed")
                .with_kind(ObjectKind::Furniture)
                .with_mesh(Mesh::from_geometry(&generate_cube())),
        );

        let picker = ObjectPicker::default();
        let pick = picker.pick_with_ray(&down_ray(0.0, 0.0), &scene).unwrap();
        assert_eq!(pick.target, bed);
        assert!((pick.intersection_point.y - 0.5).abs() < 1e-5);

        // beside the bed the ray falls through to the van floor
        let floor = picker.pick_with_ray(&down_ray(1.5, 1.5), &scene).unwrap();
        assert_eq!(floor.target, van);
        assert!((floor.intersection_point.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounds_hit_alone_is_not_a_pick() {
        let mut scene = Scene::new();
        scene.add(
            SceneNode::new("shell")
                .with_kind(ObjectKind::Van)
                .with_mesh(open_top_shell(4.0, 2.0, 4.0)),
        );
        let picker = ObjectPicker::default();

        // starts inside the box and leaves through the open top
        let up = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(picker.intersect_scene(&up, &scene).is_empty());

        // crosses both side walls; the nearer one counts
        let across = Ray::new(Vector3::new(-5.0, 0.9, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hits = picker.intersect_scene(&across, &scene);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_resolves_tagged_ancestor() {
        let mut scene = Scene::new();
        let bed = scene.add(
            SceneNode::new("bed")
                .with_kind(ObjectKind::Furniture)
                .with_position(Vector3::new(2.0, 0.0, 0.0)),
        );
        let frame = scene.add_child(bed, SceneNode::new("frame")).unwrap();
        let cushion = scene
            .add_child(
                frame,
                SceneNode::new("cushion").with_mesh(Mesh::from_geometry(&generate_cube())),
            )
            .unwrap();

        let picker = ObjectPicker::default();
        let pick = picker.pick_with_ray(&down_ray(2.0, 0.0), &scene).unwrap();

        assert_eq!(pick.target, bed);
        assert_eq!(pick.hit_node, cushion);
        assert_eq!(pick.kind, ObjectKind::Furniture);
        assert!((pick.intersection_point.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_untagged_hits_are_skipped() {
        let mut scene = Scene::new();
        scene.add(
            SceneNode::new("helper")
                .with_mesh(Mesh::from_geometry(&generate_cube()))
                .with_position(Vector3::new(0.0, 2.0, 0.0)),
        );
        let chair = scene.add(
            SceneNode::new("chair")
                .with_kind(ObjectKind::Furniture)
                .with_mesh(Mesh::from_geometry(&generate_cube())),
        );

        let pick = ObjectPicker::default()
            .pick_with_ray(&down_ray(0.0, 0.0), &scene)
            .unwrap();
        assert_eq!(pick.target, chair);
    }

    #[test]
    fn test_ancestor_walk_is_bounded() {
        let mut scene = Scene::new();
        let root = scene.add(SceneNode::new("van").with_kind(ObjectKind::Van));
        let mut parent = root;
        for i in 0..5 {
            parent = scene
                .add_child(parent, SceneNode::new(format!("level {i}")))
                .unwrap();
        }

        assert_eq!(
            ObjectPicker::new(8).resolve_target(&scene, parent),
            Some((root, ObjectKind::Van))
        );
        assert_eq!(ObjectPicker::new(3).resolve_target(&scene, parent), None);
    }

    #[test]
    fn test_hidden_meshes_are_not_pickable() {
        let mut scene = Scene::new();
        let chair = scene.add(
            SceneNode::new("chair")
                .with_kind(ObjectKind::Furniture)
                .with_mesh(Mesh::from_geometry(&generate_cube())),
        );
        scene.get_mut(chair).unwrap().visible = false;

        assert!(ObjectPicker::default()
            .pick_with_ray(&down_ray(0.0, 0.0), &scene)
            .is_none());
    }
}
