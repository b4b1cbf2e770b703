//! The currently selected object and its highlight.

use crate::{
    config::SelectionConfig,
    gfx::scene::{NodeId, Scene},
};

/// Explicit selection state owned by the viewport host.
///
/// Selecting an object tints every mesh in its subtree. The original
/// materials are stashed on the nodes and put back on deselect, so a
/// select/deselect pair leaves the scene exactly as it was.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    selected: Option<NodeId>,
    highlight_color: [f32; 3],
    highlight_intensity: f32,
}

impl SelectionSession {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            selected: None,
            highlight_color: config.highlight_color,
            highlight_intensity: config.highlight_intensity,
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected == Some(id)
    }

    /// Selects `id`, deselecting the previous object; returns the previous one
    pub fn select(&mut self, scene: &mut Scene, id: NodeId) -> Option<NodeId> {
        if self.selected == Some(id) {
            return None;
        }
        let previous = self.deselect(scene);

        if !scene.contains(id) {
            log::warn!("Cannot select missing object {:?}", id);
            return previous;
        }

        for node_id in scene.descendants(id) {
            let Some(node) = scene.get_mut(node_id) else {
                continue;
            };
            let Some(material) = node.material.as_ref() else {
                continue;
            };
            let highlighted = material.highlighted(self.highlight_color, self.highlight_intensity);
            if node.saved_material.is_none() {
                node.saved_material = node.material.replace(highlighted);
            } else {
                node.material = Some(highlighted);
            }
        }

        self.selected = Some(id);
        previous
    }

    /// Clears the selection and restores the original materials
    pub fn deselect(&mut self, scene: &mut Scene) -> Option<NodeId> {
        let previous = self.selected.take()?;

        for node_id in scene.descendants(previous) {
            let Some(node) = scene.get_mut(node_id) else {
                continue;
            };
            if let Some(original) = node.saved_material.take() {
                node.material = Some(original);
            }
        }
        Some(previous)
    }
}
