use cgmath::{Matrix4, One, Quaternion, SquareMatrix, Vector3};

use crate::gfx::{geometry::GeometryData, material::Material, picking::AABB};

slotmap::new_key_type! {
    /// Generational handle to a node in a [`Scene`](super::Scene).
    ///
    /// Handles go stale when their node is removed; lookups then return `None`.
    pub struct NodeId;
}

/// What a tagged node represents in the van designer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// The van shell itself
    Van,
    /// A placeable piece of furniture
    Furniture,
}

/// Local-space triangle mesh with cached bounds
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<[f32; 3]>,
    indices: Vec<u32>,
    bounds: AABB,
}

impl Mesh {
    /// Non-indexed mesh: every three vertices form a triangle
    pub fn new(vertices: Vec<[f32; 3]>) -> Self {
        let indices = (0..(vertices.len() / 3 * 3) as u32).collect();
        Self::indexed(vertices, indices)
    }

    /// Indices past the end of `vertices` and a trailing partial triangle are dropped
    pub fn indexed(vertices: Vec<[f32; 3]>, mut indices: Vec<u32>) -> Self {
        let bounds = AABB::from_vertices(&vertices);
        indices.truncate(indices.len() / 3 * 3);
        let vertex_count = vertices.len();
        let valid = indices
            .chunks_exact(3)
            .all(|tri| tri.iter().all(|&i| (i as usize) < vertex_count));
        if !valid {
            log::warn!("Mesh has out-of-range indices; dropping bad triangles");
            indices = indices
                .chunks_exact(3)
                .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
                .flatten()
                .copied()
                .collect();
        }
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        Self::indexed(geometry.vertices.clone(), geometry.indices.clone())
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangle corners in local space
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            let corner = |i: u32| Vector3::from(self.vertices[i as usize]);
            [corner(tri[0]), corner(tri[1]), corner(tri[2])]
        })
    }

    /// Bounds in the owning node's local space
    pub fn bounds(&self) -> AABB {
        self.bounds
    }
}

/// A node in the scene graph
///
/// Tagged nodes (`kind` is set) are what picking resolves to; untagged nodes
/// are groups or the meshes nested inside a tagged object.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: Option<ObjectKind>,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub visible: bool,
    /// Y the object holds while it is planar-dragged
    pub locked_height: Option<f32>,
    pub mesh: Option<Mesh>,
    pub material: Option<Material>,
    /// Material stashed by the selection indicator, restored on deselect
    pub(crate) saved_material: Option<Material>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) matrix: Matrix4<f32>,
    pub(crate) matrix_world: Matrix4<f32>,
}

impl SceneNode {
    /// Create an untagged node at the origin with identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            visible: true,
            locked_height: None,
            mesh: None,
            material: None,
            saved_material: None,
            parent: None,
            children: Vec::new(),
            matrix: Matrix4::identity(),
            matrix_world: Matrix4::identity(),
        }
    }

    /// Furniture node with a mesh and default material
    pub fn furniture(name: impl Into<String>, geometry: &GeometryData) -> Self {
        Self::new(name)
            .with_kind(ObjectKind::Furniture)
            .with_mesh(Mesh::from_geometry(geometry))
            .with_material(Material::default())
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn is_furniture(&self) -> bool {
        matches!(self.kind, Some(ObjectKind::Furniture))
    }

    pub fn is_van(&self) -> bool {
        matches!(self.kind, Some(ObjectKind::Van))
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform, valid after the owning scene updated matrices
    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    /// World transform, valid after the owning scene updated matrices
    pub fn matrix_world(&self) -> Matrix4<f32> {
        self.matrix_world
    }

    /// Recompute the local matrix from position, rotation and scale
    pub fn update_matrix(&mut self) {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        self.matrix = t * r * s; // Order matters: T * R * S
    }

    /// Snapshot of the editable transform
    pub fn transform(&self) -> NodeTransform {
        NodeTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub fn set_transform(&mut self, transform: NodeTransform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }
}

/// Position, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}
