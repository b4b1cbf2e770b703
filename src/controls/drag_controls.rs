//! # Free-Drag Controller
//!
//! Planar dragging of furniture across the van floor. The pointer ray is
//! projected onto a horizontal anchor plane through the object's position at
//! drag start, so an object resting on a raised platform slides at its own
//! height instead of dropping to the ground plane.

use cgmath::Vector3;

use super::traits::{ManipulationContext, ManipulationController};
use crate::{
    error::{ManipulationError, Result},
    gfx::{
        picking::{Plane, Ray},
        scene::{NodeId, Scene},
    },
};

#[derive(Debug, Clone, Copy)]
struct DragSession {
    target: NodeId,
    plane: Plane,
    start_point: Vector3<f32>,
    /// Local position at drag start
    snapshot: Vector3<f32>,
}

/// Drags registered objects over a height-locked anchor plane
#[derive(Debug, Clone)]
pub struct FreeDragController {
    draggable: Vec<NodeId>,
    enabled: bool,
    suspended: bool,
    session: Option<DragSession>,
}

impl Default for FreeDragController {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeDragController {
    pub fn new() -> Self {
        Self {
            draggable: Vec::new(),
            enabled: true,
            suspended: false,
            session: None,
        }
    }

    /// Adds `id` to the draggable set and locks its current height.
    ///
    /// Registering twice keeps a single entry but re-captures the height.
    pub fn register(&mut self, id: NodeId, scene: &mut Scene) -> Result<()> {
        let Some(node) = scene.get_mut(id) else {
            log::warn!("Cannot register missing object {:?} for dragging", id);
            return Err(ManipulationError::ObjectNotFound(id));
        };

        node.locked_height = Some(node.position.y);
        if !self.draggable.contains(&id) {
            self.draggable.push(id);
            log::debug!("Registered '{}' for free drag", node.name);
        }
        Ok(())
    }

    /// Removes `id` from the draggable set, cancelling its drag if running
    pub fn unregister(&mut self, id: NodeId, ctx: &mut ManipulationContext) -> bool {
        if self.drag_target() == Some(id) {
            self.cancel(ctx);
        }

        let before = self.draggable.len();
        self.draggable.retain(|registered| *registered != id);
        before != self.draggable.len()
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.draggable.contains(&id)
    }

    /// Registered objects in registration order
    pub fn draggable(&self) -> &[NodeId] {
        &self.draggable
    }

    pub fn drag_target(&self) -> Option<NodeId> {
        self.session.map(|session| session.target)
    }

    /// Begins dragging `target`.
    ///
    /// Returns `false` when the controller is inactive, the target is not
    /// registered, or `ray` misses the anchor plane.
    pub fn start(&mut self, target: NodeId, ray: &Ray, ctx: &mut ManipulationContext) -> bool {
        if !self.is_active() || self.session.is_some() || !self.is_registered(target) {
            return false;
        }
        let Some(anchor) = ctx.scene.world_position(target) else {
            return false;
        };

        let plane = Plane::horizontal(anchor);
        let Some(start_point) = plane.intersect_ray(ray) else {
            log::debug!("Drag start ray misses the anchor plane");
            return false;
        };
        let Some(node) = ctx.scene.get_mut(target) else {
            return false;
        };
        if node.locked_height.is_none() {
            node.locked_height = Some(node.position.y);
        }

        self.session = Some(DragSession {
            target,
            plane,
            start_point,
            snapshot: node.position,
        });
        log::debug!("Free drag started on '{}'", node.name);
        ctx.begin_gesture();
        true
    }

    /// Moves the target with the pointer; `false` if nothing moved this frame
    pub fn drag(&mut self, ray: &Ray, ctx: &mut ManipulationContext) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if !ctx.scene.contains(session.target) {
            log::warn!("Drag target {:?} left the scene, cancelling", session.target);
            self.cancel(ctx);
            return false;
        }

        let Some(point) = session.plane.intersect_ray(ray) else {
            return false;
        };
        let offset = ctx
            .scene
            .world_to_parent_vector(session.target, point - session.start_point);

        let Some(node) = ctx.scene.get_mut(session.target) else {
            return false;
        };
        let height = *node.locked_height.get_or_insert(session.snapshot.y);
        node.position = Vector3::new(
            session.snapshot.x + offset.x,
            height,
            session.snapshot.z + offset.z,
        );
        ctx.scene.update_matrix_world(session.target);
        true
    }

    /// Completes the drag and commits it to history
    pub fn end(&mut self, ctx: &mut ManipulationContext) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        ctx.end_gesture();
        if ctx.scene.contains(session.target) {
            ctx.history.commit(ctx.scene);
            log::debug!("Free drag ended on {:?}", session.target);
        }
        true
    }

    /// Abandons the drag: the target returns to its start position and
    /// nothing is committed
    pub fn cancel(&mut self, ctx: &mut ManipulationContext) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        if let Some(node) = ctx.scene.get_mut(session.target) {
            node.position = session.snapshot;
            ctx.scene.update_matrix_world(session.target);
        }
        ctx.end_gesture();
        log::debug!("Free drag cancelled on {:?}", session.target);
        true
    }
}

impl ManipulationController for FreeDragController {
    fn name(&self) -> &str {
        "free drag"
    }

    fn enable(&mut self) {
        self.enabled = true;
        if self.suspended {
            log::debug!("Free drag enabled, waiting for the transform gesture to end");
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controls::{
            history::History, traits::AmbientNavigation, PreciseTransformController,
        },
        config::GizmoConfig,
        gfx::{
            geometry::generate_cube,
            scene::{ObjectKind, SceneNode},
        },
    };
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};
    use rand::Rng;

    #[derive(Default)]
    struct Navigation {
        enabled: bool,
    }

    impl AmbientNavigation for Navigation {
        fn set_navigation_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn is_navigation_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[derive(Default)]
    struct CountingHistory {
        commits: usize,
    }

    impl History for CountingHistory {
        fn commit(&mut self, _scene: &Scene) {
            self.commits += 1;
        }
    }

    struct Rig {
        scene: Scene,
        navigation: Navigation,
        peer: PreciseTransformController,
        history: CountingHistory,
        controller: FreeDragController,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                navigation: Navigation { enabled: true },
                peer: PreciseTransformController::new(&GizmoConfig::default()),
                history: CountingHistory::default(),
                controller: FreeDragController::new(),
            }
        }

        fn add(&mut self, position: Vector3<f32>) -> NodeId {
            let id = self
                .scene
                .add(SceneNode::furniture("crate", &generate_cube()).with_position(position));
            self.controller.register(id, &mut self.scene).unwrap();
            id
        }

        fn start(&mut self, id: NodeId, target: Vector3<f32>) -> bool {
            let mut ctx = ManipulationContext {
                scene: &mut self.scene,
                navigation: &mut self.navigation,
                peer: &mut self.peer,
                history: &mut self.history,
            };
            self.controller.start(id, &ray_to(target), &mut ctx)
        }

        fn drag(&mut self, target: Vector3<f32>) -> bool {
            let mut ctx = ManipulationContext {
                scene: &mut self.scene,
                navigation: &mut self.navigation,
                peer: &mut self.peer,
                history: &mut self.history,
            };
            self.controller.drag(&ray_to(target), &mut ctx)
        }

        fn end(&mut self) -> bool {
            let mut ctx = ManipulationContext {
                scene: &mut self.scene,
                navigation: &mut self.navigation,
                peer: &mut self.peer,
                history: &mut self.history,
            };
            self.controller.end(&mut ctx)
        }

        fn position(&self, id: NodeId) -> Vector3<f32> {
            self.scene.get(id).unwrap().position
        }
    }

    fn ray_to(target: Vector3<f32>) -> Ray {
        let eye = Vector3::new(0.0, 10.0, 10.0);
        Ray::new(eye, target - eye)
    }

    fn near(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_drag_follows_plane_offset() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));

        assert!(rig.start(id, Vector3::new(0.0, 0.0, 0.0)));
        assert!(rig.drag(Vector3::new(2.0, 0.0, 3.0)));
        assert!(rig.end());

        assert!(near(rig.position(id), Vector3::new(2.0, 0.0, 3.0)));
        assert_eq!(rig.position(id).y, 0.0);
    }

    #[test]
    fn test_zero_offset_keeps_raised_object_in_place() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(1.0, 0.5, 1.0));
        assert_eq!(rig.scene.get(id).unwrap().locked_height, Some(0.5));

        assert!(rig.start(id, Vector3::new(1.0, 0.5, 1.0)));
        rig.drag(Vector3::new(1.0, 0.5, 1.0));
        rig.end();

        assert!(near(rig.position(id), Vector3::new(1.0, 0.5, 1.0)));
        assert_eq!(rig.position(id).y, 0.5);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.2, 0.0));
        rig.controller.register(id, &mut rig.scene).unwrap();

        assert_eq!(rig.controller.draggable(), &[id]);

        let missing = {
            let other = rig.scene.add(SceneNode::new("gone"));
            rig.scene.remove(other);
            other
        };
        assert_eq!(
            rig.controller.register(missing, &mut rig.scene),
            Err(ManipulationError::ObjectNotFound(missing))
        );
    }

    #[test]
    fn test_height_invariant_under_random_drags() {
        let mut rng = rand::rng();
        let mut rig = Rig::new();
        let heights = [0.0, 0.35, 0.8];
        let ids: Vec<NodeId> = heights
            .iter()
            .map(|y| rig.add(Vector3::new(0.0, *y, 0.0)))
            .collect();

        for _ in 0..50 {
            let index = rng.random_range(0..ids.len());
            let id = ids[index];
            let anchor = rig.scene.world_position(id).unwrap();
            if !rig.start(id, anchor) {
                continue;
            }
            for _ in 0..5 {
                let target = Vector3::new(
                    anchor.x + rng.random_range(-3.0..3.0),
                    anchor.y,
                    anchor.z + rng.random_range(-3.0..3.0),
                );
                rig.drag(target);
            }
            rig.end();

            for (id, height) in ids.iter().zip(heights) {
                let node = rig.scene.get(*id).unwrap();
                assert_eq!(node.locked_height, Some(height));
                assert_eq!(node.position.y, height);
            }
        }
    }

    #[test]
    fn test_gesture_suspends_navigation_and_peer() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));

        rig.start(id, Vector3::new(0.0, 0.0, 0.0));
        assert!(!rig.navigation.enabled);
        assert!(rig.peer.is_suspended());
        assert!(!rig.peer.is_active());
        assert!(rig.controller.is_dragging());

        rig.end();
        assert!(rig.navigation.enabled);
        assert!(!rig.peer.is_suspended());
        assert_eq!(rig.history.commits, 1);
    }

    #[test]
    fn test_moves_do_not_commit() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));

        rig.start(id, Vector3::new(0.0, 0.0, 0.0));
        for step in 0..10 {
            rig.drag(Vector3::new(step as f32 * 0.1, 0.0, 0.0));
        }
        assert_eq!(rig.history.commits, 0);
        rig.end();
        assert_eq!(rig.history.commits, 1);
        assert!(!rig.end());
        assert_eq!(rig.history.commits, 1);
    }

    #[test]
    fn test_disabled_or_suspended_controller_does_not_start() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));

        rig.controller.disable();
        assert!(!rig.start(id, Vector3::new(0.0, 0.0, 0.0)));

        rig.controller.enable();
        rig.controller.suspend();
        assert!(!rig.start(id, Vector3::new(0.0, 0.0, 0.0)));

        rig.controller.resume();
        assert!(rig.start(id, Vector3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_unregistered_object_is_not_dragged() {
        let mut rig = Rig::new();
        let loose = rig
            .scene
            .add(SceneNode::new("loose").with_kind(ObjectKind::Furniture));
        assert!(!rig.start(loose, Vector3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_parallel_ray_skips_frame() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));
        rig.start(id, Vector3::new(0.0, 0.0, 0.0));
        rig.drag(Vector3::new(1.0, 0.0, 0.0));

        let mut ctx = ManipulationContext {
            scene: &mut rig.scene,
            navigation: &mut rig.navigation,
            peer: &mut rig.peer,
            history: &mut rig.history,
        };
        let flat = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(!rig.controller.drag(&flat, &mut ctx));
        assert!(near(rig.position(id), Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_unregister_mid_drag_cancels() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));
        rig.start(id, Vector3::new(0.0, 0.0, 0.0));
        rig.drag(Vector3::new(1.0, 0.0, 1.0));

        let mut ctx = ManipulationContext {
            scene: &mut rig.scene,
            navigation: &mut rig.navigation,
            peer: &mut rig.peer,
            history: &mut rig.history,
        };
        assert!(rig.controller.unregister(id, &mut ctx));
        assert!(!rig.controller.unregister(id, &mut ctx));

        assert!(!rig.controller.is_dragging());
        assert!(near(rig.position(id), Vector3::new(0.0, 0.0, 0.0)));
        assert!(rig.navigation.enabled);
        assert_eq!(rig.history.commits, 0);
    }

    #[test]
    fn test_removed_target_auto_cancels() {
        let mut rig = Rig::new();
        let id = rig.add(Vector3::new(0.0, 0.0, 0.0));
        rig.start(id, Vector3::new(0.0, 0.0, 0.0));
        rig.scene.remove(id);

        assert!(!rig.drag(Vector3::new(1.0, 0.0, 0.0)));
        assert!(!rig.controller.is_dragging());
        assert!(rig.navigation.enabled);
        assert!(!rig.end());
        assert_eq!(rig.history.commits, 0);
    }

    #[test]
    fn test_nested_object_moves_in_parent_space() {
        let mut rig = Rig::new();
        let van = rig.scene.add(
            SceneNode::new("van")
                .with_kind(ObjectKind::Van)
                .with_rotation(Quaternion::from_angle_y(Deg(90.0))),
        );
        let seat = rig
            .scene
            .add_child(van, SceneNode::furniture("seat", &generate_cube()))
            .unwrap();
        rig.controller.register(seat, &mut rig.scene).unwrap();

        rig.start(seat, Vector3::new(0.0, 0.0, 0.0));
        rig.drag(Vector3::new(0.0, 0.0, -1.0));
        rig.end();

        assert!(near(rig.scene.world_position(seat).unwrap(), Vector3::new(0.0, 0.0, -1.0)));
    }
}
