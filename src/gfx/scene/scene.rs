use cgmath::{InnerSpace, Matrix4, Quaternion, SquareMatrix, Vector3};
use slotmap::SlotMap;

use crate::gfx::picking::AABB;

use super::object::{NodeId, SceneNode};

/// Scene graph holding the van shell, furniture and their nested meshes
///
/// Nodes live in a generational arena; controllers keep [`NodeId`]s, never
/// references, so a removed node simply stops resolving.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node at the top level and returns its handle
    pub fn add(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = self.nodes.insert(node);
        self.roots.push(id);
        self.update_matrix_world(id);
        id
    }

    /// Adds a node under `parent`; `None` if the parent is not in the scene
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            log::warn!("Cannot add child to missing parent {:?}", parent);
            return None;
        }

        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        self.update_matrix_world(id);
        Some(id)
    }

    /// Removes a node and its whole subtree, returning the removed node
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let subtree = self.descendants(id);
        let parent = self.nodes.get(id)?.parent;

        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let mut removed = None;
        for node_id in subtree {
            let node = self.nodes.remove(node_id);
            if node_id == id {
                removed = node;
            }
        }
        removed
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Mutable access to a node.
    ///
    /// Call [`Scene::update_matrix_world`] after changing its transform.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter()
    }

    /// `id` followed by all of its descendants, depth first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            result.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// A node is visible only if it and all of its ancestors are
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Recomputes local and world matrices for `id` and its subtree
    pub fn update_matrix_world(&mut self, id: NodeId) {
        let parent_world = self
            .parent(id)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.matrix_world)
            .unwrap_or_else(Matrix4::identity);

        let mut stack = vec![(id, parent_world)];
        while let Some((current, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.update_matrix();
            node.matrix_world = parent_world * node.matrix;

            let world = node.matrix_world;
            stack.extend(node.children.iter().map(|child| (*child, world)));
        }
    }

    /// Sets a node's local position and refreshes its matrices
    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.position = position;
        self.update_matrix_world(id);
        true
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vector3<f32>> {
        let world = self.nodes.get(id)?.matrix_world;
        Some(world.w.truncate())
    }

    /// Accumulated rotation of the node and its ancestors
    pub fn world_rotation(&self, id: NodeId) -> Option<Quaternion<f32>> {
        let mut node = self.nodes.get(id)?;
        let mut rotation = node.rotation;
        while let Some(parent) = node.parent.and_then(|parent| self.nodes.get(parent)) {
            rotation = parent.rotation * rotation;
            node = parent;
        }
        Some(rotation.normalize())
    }

    /// Converts a world-space direction into the node's parent space
    pub fn world_to_parent_vector(&self, id: NodeId, vector: Vector3<f32>) -> Vector3<f32> {
        let Some(parent_world) = self
            .parent(id)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.matrix_world)
        else {
            return vector;
        };

        match parent_world.invert() {
            Some(inverse) => (inverse * vector.extend(0.0)).truncate(),
            None => vector,
        }
    }

    /// World-space bounds of a single node's own mesh
    pub fn mesh_bounds(&self, id: NodeId) -> Option<AABB> {
        let node = self.nodes.get(id)?;
        let mesh = node.mesh.as_ref()?;
        Some(mesh.bounds().transform(&node.matrix_world))
    }

    /// World-space bounds of a node and all its descendants.
    ///
    /// A subtree without meshes yields a degenerate box at the node's world
    /// position.
    pub fn bounding_box(&self, id: NodeId) -> Option<AABB> {
        let origin = self.world_position(id)?;

        let bounds = self
            .descendants(id)
            .into_iter()
            .filter_map(|node| self.mesh_bounds(node))
            .reduce(|acc, next| acc.union(&next));

        Some(bounds.unwrap_or_else(|| AABB::from_point(origin)))
    }

    /// Center of [`Scene::bounding_box`]
    pub fn bounding_center(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.bounding_box(id).map(|bounds| bounds.center())
    }
}
