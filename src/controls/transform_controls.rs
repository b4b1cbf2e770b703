//! # Precise-Transform Controller
//!
//! Binds a [`TransformGizmo`] to a proxy handle centered on the selected
//! object's bounding box and forwards proxy edits onto the object. The gizmo
//! pivot is therefore the object's visual center, whatever pivot the model
//! was authored with.
//!
//! ## Forwarding
//!
//! With `c` the proxy center and `base` the object's transform when the proxy
//! was last placed:
//!
//! - translation: `delta = (proxy.position - c) * movement_scale`
//! - rotation: the proxy rotation `q` turns the object about `c`
//! - scale: the proxy scale `s` scales the object in its own axes about `c`;
//!   the gizmo's scale handles are aligned to those axes
//!
//! With `R` the object's world rotation, its world origin becomes
//! `c + delta + q * (R * (s * (R⁻¹ * (base_origin - c))))`.

use std::str::FromStr;

use cgmath::{ElementWise, Quaternion, Vector3};

use super::traits::{ManipulationContext, ManipulationController};
use crate::{
    config::GizmoConfig,
    error::{ManipulationError, Result},
    gfx::{
        gizmos::{GizmoAxis, GizmoEvent, GizmoView, ProxyHandle, TransformGizmo, TransformMode},
        picking::Ray,
        scene::{NodeId, NodeTransform, Scene},
    },
};

/// Object state captured when the proxy was last placed
#[derive(Debug, Clone, Copy)]
struct TransformBase {
    center: Vector3<f32>,
    transform: NodeTransform,
    world_origin: Vector3<f32>,
    world_rotation: Quaternion<f32>,
}

#[derive(Debug, Clone, Copy)]
struct TransformSession {
    object: NodeId,
    base: TransformBase,
}

/// Gizmo-driven translate/rotate/scale of a single attached object
#[derive(Debug, Clone)]
pub struct PreciseTransformController {
    /// `None` when the gizmo failed to initialise; every call is then a no-op
    gizmo: Option<TransformGizmo>,
    enabled: bool,
    suspended: bool,
    movement_scale: f32,
    session: Option<TransformSession>,
    last_valid_position: Option<Vector3<f32>>,
}

impl PreciseTransformController {
    pub fn new(config: &GizmoConfig) -> Self {
        let gizmo = match TransformGizmo::new(config) {
            Ok(gizmo) => Some(gizmo),
            Err(err) => {
                log::error!("Transform gizmo unavailable, transform controls disabled: {}", err);
                None
            }
        };

        let movement_scale = if valid_movement_scale(config.movement_scale) {
            config.movement_scale
        } else {
            log::warn!(
                "Ignoring invalid movement scale {}, using 1.0",
                config.movement_scale
            );
            1.0
        };

        Self {
            gizmo,
            enabled: true,
            suspended: false,
            movement_scale,
            session: None,
            last_valid_position: None,
        }
    }

    /// True if the gizmo failed to initialise
    pub fn is_inert(&self) -> bool {
        self.gizmo.is_none()
    }

    pub fn gizmo(&self) -> Option<&TransformGizmo> {
        self.gizmo.as_ref()
    }

    pub fn proxy(&self) -> Option<&ProxyHandle> {
        self.gizmo.as_ref()?.proxy()
    }

    pub fn mode(&self) -> TransformMode {
        self.gizmo
            .as_ref()
            .map(|gizmo| gizmo.mode())
            .unwrap_or_default()
    }

    pub fn movement_scale(&self) -> f32 {
        self.movement_scale
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_object(&self) -> Option<NodeId> {
        self.session.map(|session| session.object)
    }

    /// Object position at the end of the last completed transform
    pub fn last_valid_position(&self) -> Option<Vector3<f32>> {
        self.last_valid_position
    }

    /// Binds the gizmo to `object` through a proxy at its bounding-box center
    pub fn attach(&mut self, object: NodeId, ctx: &mut ManipulationContext) -> Result<()> {
        if self.gizmo.is_none() {
            return Err(ManipulationError::ControllerInert);
        }
        if !ctx.scene.contains(object) {
            log::warn!("Cannot attach transform controls to missing object {:?}", object);
            return Err(ManipulationError::ObjectNotFound(object));
        }
        if self.session.is_some() {
            self.detach(ctx);
        }

        let Some(node) = ctx.scene.get_mut(object) else {
            return Err(ManipulationError::ObjectNotFound(object));
        };
        if node.locked_height.is_none() {
            node.locked_height = Some(node.position.y);
        }
        let position = node.position;
        log::debug!("Transform controls attached to '{}'", node.name);

        let Some(base) = capture_base(ctx.scene, object) else {
            return Err(ManipulationError::ObjectNotFound(object));
        };
        self.session = Some(TransformSession { object, base });
        self.last_valid_position = Some(position);

        if let Some(gizmo) = self.gizmo.as_mut() {
            gizmo.attach(ProxyHandle::at(base.center));
            gizmo.set_orientation(base.world_rotation);
        }
        self.sync_gizmo_state();
        Ok(())
    }

    /// Unbinds the gizmo; a no-op when nothing is attached.
    ///
    /// A drag in progress is dropped without a history commit.
    pub fn detach(&mut self, ctx: &mut ManipulationContext) {
        let Some(session) = self.session.take() else {
            return;
        };
        let Some(gizmo) = self.gizmo.as_mut() else {
            return;
        };

        if gizmo.cancel_drag() {
            log::debug!("Transform drag abandoned by detach");
            ctx.end_gesture();
        }
        gizmo.detach();
        gizmo.set_visible(false);

        if let Some(node) = ctx.scene.get_mut(session.object) {
            node.locked_height = Some(node.position.y);
            log::debug!("Transform controls detached from '{}'", node.name);
        }
    }

    /// Switches between translate, rotate and scale.
    ///
    /// The proxy is re-centered and the base re-captured, so the object never
    /// moves. Rejected while a handle is being dragged.
    pub fn set_mode(&mut self, mode: TransformMode, scene: &mut Scene) -> Result<()> {
        let Some(gizmo) = self.gizmo.as_mut() else {
            return Err(ManipulationError::ControllerInert);
        };
        if gizmo.is_dragging() {
            log::warn!("Cannot switch to {} mode mid-drag", mode);
            return Err(ManipulationError::GestureInProgress);
        }
        if gizmo.mode() == mode {
            return Ok(());
        }

        gizmo.set_mode(mode);
        log::debug!("Transform mode set to {}", mode);
        self.rebase(scene);
        Ok(())
    }

    /// [`set_mode`](Self::set_mode) from a mode name; unknown names are
    /// reported and leave the mode unchanged
    pub fn set_mode_str(&mut self, mode: &str, scene: &mut Scene) -> Result<()> {
        match TransformMode::from_str(mode) {
            Ok(mode) => self.set_mode(mode, scene),
            Err(err) => {
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Proxy-to-object delta multiplier, used from the next move on
    pub fn set_movement_scale(&mut self, factor: f32) -> Result<()> {
        if !valid_movement_scale(factor) {
            log::warn!("Rejected movement scale {}", factor);
            return Err(ManipulationError::InvalidMovementScale(factor));
        }
        self.movement_scale = factor;
        Ok(())
    }

    pub fn set_size(&mut self, size: f32) -> Result<()> {
        let Some(gizmo) = self.gizmo.as_mut() else {
            return Err(ManipulationError::ControllerInert);
        };
        gizmo.set_size(size).inspect_err(|err| log::warn!("{}", err))
    }

    /// Re-centers an idle proxy on the object's current bounds.
    ///
    /// Call after anything other than the gizmo changed the object.
    pub fn update_controls_position(&mut self, scene: &mut Scene) {
        if self.is_dragging() {
            return;
        }
        self.rebase(scene);
    }

    /// Updates the hovered handle; returns it for cursor feedback
    pub fn pointer_hover(&mut self, ray: &Ray, view: &GizmoView) -> Option<GizmoAxis> {
        if self.session.is_none() || !self.is_active() {
            return None;
        }
        self.gizmo.as_mut()?.hover(ray, view)
    }

    /// Starts a handle drag if `ray` hits one; `true` if the press was claimed
    pub fn pointer_down(
        &mut self,
        ray: &Ray,
        view: &GizmoView,
        ctx: &mut ManipulationContext,
    ) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if !self.is_active() {
            return false;
        }
        if !ctx.scene.contains(session.object) {
            log::warn!("Transform target {:?} left the scene, detaching", session.object);
            self.detach(ctx);
            return false;
        }

        self.rebase(ctx.scene);
        let started = self
            .gizmo
            .as_mut()
            .is_some_and(|gizmo| gizmo.begin_drag(ray, view));
        if started {
            self.pump_events(ctx);
        }
        started
    }

    /// Feeds pointer motion to the dragged handle
    pub fn pointer_move(&mut self, ray: &Ray, ctx: &mut ManipulationContext) -> bool {
        if !self.is_dragging() {
            return false;
        }
        if !self.active_object().is_some_and(|object| ctx.scene.contains(object)) {
            log::warn!("Transform target left the scene mid-drag, detaching");
            self.detach(ctx);
            return false;
        }

        let moved = self
            .gizmo
            .as_mut()
            .is_some_and(|gizmo| gizmo.update_drag(ray));
        if moved {
            self.pump_events(ctx);
        }
        moved
    }

    /// Ends the handle drag; `true` if one was running
    pub fn pointer_up(&mut self, ctx: &mut ManipulationContext) -> bool {
        let ended = self.gizmo.as_mut().is_some_and(|gizmo| gizmo.end_drag());
        if ended {
            self.pump_events(ctx);
        }
        ended
    }

    /// Routes queued gizmo events
    fn pump_events(&mut self, ctx: &mut ManipulationContext) {
        let events = match self.gizmo.as_mut() {
            Some(gizmo) => gizmo.take_events(),
            None => return,
        };

        for event in events {
            match event {
                GizmoEvent::DraggingChanged(true) => self.on_drag_begin(ctx),
                GizmoEvent::DraggingChanged(false) => self.on_drag_end(ctx),
                GizmoEvent::ObjectChange => self.on_object_change(ctx.scene),
            }
        }
    }

    fn on_drag_begin(&mut self, ctx: &mut ManipulationContext) {
        self.rebase(ctx.scene);
        ctx.begin_gesture();
        log::debug!("Transform drag started ({} mode)", self.mode());
    }

    fn on_drag_end(&mut self, ctx: &mut ManipulationContext) {
        ctx.end_gesture();

        let Some(session) = self.session else {
            return;
        };
        let Some(node) = ctx.scene.get_mut(session.object) else {
            return;
        };
        node.locked_height = Some(node.position.y);
        self.last_valid_position = Some(node.position);
        log::debug!("Transform drag ended, '{}' at {:?}", node.name, node.position);

        ctx.history.commit(ctx.scene);
    }

    /// Forwards the proxy state onto the object
    fn on_object_change(&mut self, scene: &mut Scene) {
        let Some(session) = self.session else {
            return;
        };
        let Some(proxy) = self.proxy().copied() else {
            return;
        };

        let base = session.base;
        let rotation = base.world_rotation;
        let delta = (proxy.position - base.center) * self.movement_scale;

        let offset = base.world_origin - base.center;
        let local_offset = rotation.conjugate() * offset;
        let scaled_offset = rotation * local_offset.mul_element_wise(proxy.scale);
        let world_origin = base.center + delta + proxy.rotation * scaled_offset;

        let displacement = scene.world_to_parent_vector(session.object, world_origin - base.world_origin);
        let Some(node) = scene.get_mut(session.object) else {
            return;
        };
        node.position = base.transform.position + displacement;
        node.rotation = proxy.rotation * base.transform.rotation;
        node.scale = base.transform.scale.mul_element_wise(proxy.scale);
        node.locked_height = Some(node.position.y);
        scene.update_matrix_world(session.object);
    }

    /// Places the proxy on the object's current center and re-captures the
    /// base. The change events the placement echoes are dropped, so the
    /// proxy move never reaches the object.
    fn rebase(&mut self, scene: &Scene) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(base) = capture_base(scene, session.object) else {
            return;
        };
        session.base = base;

        let Some(gizmo) = self.gizmo.as_mut() else {
            return;
        };
        gizmo.set_orientation(base.world_rotation);
        gizmo.place_proxy(base.center);
        gizmo.take_events();
    }

    fn sync_gizmo_state(&mut self) {
        let attached = self.session.is_some();
        let (visible, interactive) = (attached && self.enabled, self.enabled && !self.suspended);
        if let Some(gizmo) = self.gizmo.as_mut() {
            gizmo.set_visible(visible);
            gizmo.set_enabled(interactive);
        }
    }
}

impl ManipulationController for PreciseTransformController {
    fn name(&self) -> &str {
        "precise transform"
    }

    fn enable(&mut self) {
        self.enabled = true;
        if self.suspended {
            log::debug!("Transform controls enabled, waiting for the free drag to end");
        }
        self.sync_gizmo_state();
    }

    /// Hides the gizmo; an attachment survives and reappears on `enable`
    fn disable(&mut self) {
        if self.is_dragging() {
            log::warn!("Transform controls disabled mid-drag, the drag continues until release");
        }
        self.enabled = false;
        self.sync_gizmo_state();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_dragging(&self) -> bool {
        self.gizmo.as_ref().is_some_and(|gizmo| gizmo.is_dragging())
    }

    fn suspend(&mut self) {
        self.suspended = true;
        self.sync_gizmo_state();
    }

    fn resume(&mut self) {
        self.suspended = false;
        self.sync_gizmo_state();
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

fn valid_movement_scale(factor: f32) -> bool {
    factor.is_finite() && factor > 0.0
}

fn capture_base(scene: &Scene, object: NodeId) -> Option<TransformBase> {
    let node = scene.get(object)?;
    Some(TransformBase {
        center: scene.bounding_center(object)?,
        transform: node.transform(),
        world_origin: scene.world_position(object)?,
        world_rotation: scene.world_rotation(object)?,
    })
}
