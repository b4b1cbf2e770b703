//! # Edit History
//!
//! Controllers notify a [`History`] exactly once per completed gesture. What
//! the collaborator does with that is its own business: [`NullHistory`]
//! ignores it, [`TransformHistory`] keeps a bounded undo/redo stack of
//! furniture transforms.

use std::collections::VecDeque;

use crate::gfx::scene::{NodeId, NodeTransform, Scene};

/// Receives "a completed edit happened" notifications
pub trait History {
    /// Record the current scene state after a completed gesture
    fn commit(&mut self, scene: &Scene);

    /// Absorb a change made outside any gesture (objects added or removed)
    fn record_baseline(&mut self, _scene: &Scene) {}

    /// Step back one commit; `false` if there is nothing to undo
    fn undo(&mut self, _scene: &mut Scene) -> bool {
        false
    }

    /// Step forward one commit; `false` if there is nothing to redo
    fn redo(&mut self, _scene: &mut Scene) -> bool {
        false
    }
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHistory;

impl History for NullHistory {
    fn commit(&mut self, _scene: &Scene) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeState {
    id: NodeId,
    transform: NodeTransform,
    locked_height: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SceneSnapshot {
    nodes: Vec<NodeState>,
}

impl SceneSnapshot {
    fn capture(scene: &Scene) -> Self {
        let nodes = scene
            .iter()
            .filter(|(_, node)| node.is_furniture())
            .map(|(id, node)| NodeState {
                id,
                transform: node.transform(),
                locked_height: node.locked_height,
            })
            .collect();
        Self { nodes }
    }

    /// Writes the snapshot back; nodes removed since are skipped
    fn restore(&self, scene: &mut Scene) {
        for state in &self.nodes {
            let Some(node) = scene.get_mut(state.id) else {
                continue;
            };
            node.set_transform(state.transform);
            node.locked_height = state.locked_height;
            scene.update_matrix_world(state.id);
        }
    }
}

/// Bounded undo/redo stack of furniture transforms
#[derive(Debug, Clone)]
pub struct TransformHistory {
    states: VecDeque<SceneSnapshot>,
    index: usize,
    capacity: usize,
}

impl TransformHistory {
    /// Keeps up to `capacity` undo steps
    pub fn new(capacity: usize) -> Self {
        Self {
            states: VecDeque::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.states.len()
    }

    /// Number of recorded states (the baseline included)
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.index = 0;
    }
}

impl Default for TransformHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

impl History for TransformHistory {
    fn commit(&mut self, scene: &Scene) {
        if !self.states.is_empty() {
            self.states.truncate(self.index + 1);
        }
        self.states.push_back(SceneSnapshot::capture(scene));

        // one extra slot for the state the oldest undo returns to
        while self.states.len() > self.capacity + 1 {
            self.states.pop_front();
        }
        self.index = self.states.len() - 1;
        log::debug!("History commit ({} states)", self.states.len());
    }

    fn record_baseline(&mut self, scene: &Scene) {
        let snapshot = SceneSnapshot::capture(scene);
        match self.states.get_mut(self.index) {
            Some(current) => *current = snapshot,
            None => {
                self.states.push_back(snapshot);
                self.index = 0;
            }
        }
    }

    fn undo(&mut self, scene: &mut Scene) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        self.states[self.index].restore(scene);
        true
    }

    fn redo(&mut self, scene: &mut Scene) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        self.states[self.index].restore(scene);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{geometry::generate_cube, scene::SceneNode};
    use cgmath::Vector3;

    fn scene_with_chair() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let chair = scene.add(SceneNode::furniture("chair", &generate_cube()));
        (scene, chair)
    }

    #[test]
    fn test_undo_redo_restores_transforms() {
        let (mut scene, chair) = scene_with_chair();
        let mut history = TransformHistory::new(10);
        history.record_baseline(&scene);

        scene.set_position(chair, Vector3::new(2.0, 0.0, 1.0));
        history.commit(&scene);
        assert!(history.can_undo());

        assert!(history.undo(&mut scene));
        assert_eq!(scene.get(chair).unwrap().position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(scene.world_position(chair), Some(Vector3::new(0.0, 0.0, 0.0)));
        assert!(!history.undo(&mut scene));

        assert!(history.redo(&mut scene));
        assert_eq!(scene.get(chair).unwrap().position, Vector3::new(2.0, 0.0, 1.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let (mut scene, chair) = scene_with_chair();
        let mut history = TransformHistory::new(10);
        history.record_baseline(&scene);

        scene.set_position(chair, Vector3::new(1.0, 0.0, 0.0));
        history.commit(&scene);
        scene.set_position(chair, Vector3::new(2.0, 0.0, 0.0));
        history.commit(&scene);

        history.undo(&mut scene);
        scene.set_position(chair, Vector3::new(5.0, 0.0, 0.0));
        history.commit(&scene);

        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_capacity_bounds_undo_depth() {
        let (mut scene, chair) = scene_with_chair();
        let mut history = TransformHistory::new(3);
        history.record_baseline(&scene);

        for step in 1..=6 {
            scene.set_position(chair, Vector3::new(step as f32, 0.0, 0.0));
            history.commit(&scene);
        }

        let mut undone = 0;
        while history.undo(&mut scene) {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(scene.get(chair).unwrap().position.x, 3.0);
    }

    #[test]
    fn test_removed_nodes_are_skipped() {
        let (mut scene, chair) = scene_with_chair();
        let mut history = TransformHistory::new(10);
        history.record_baseline(&scene);
        scene.set_position(chair, Vector3::new(1.0, 0.0, 0.0));
        history.commit(&scene);

        scene.remove(chair);
        assert!(history.undo(&mut scene));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_locked_height_is_restored() {
        let (mut scene, chair) = scene_with_chair();
        scene.get_mut(chair).unwrap().locked_height = Some(0.0);
        let mut history = TransformHistory::new(10);
        history.record_baseline(&scene);

        scene.get_mut(chair).unwrap().locked_height = Some(0.4);
        scene.set_position(chair, Vector3::new(0.0, 0.4, 0.0));
        history.commit(&scene);

        history.undo(&mut scene);
        assert_eq!(scene.get(chair).unwrap().locked_height, Some(0.0));
    }
}
