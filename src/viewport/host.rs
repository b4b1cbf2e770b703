use cgmath::Vector3;
use winit::window::CursorIcon;

use super::{
    input::{PointerButton, ViewportInput, ViewportKey},
    selection::SelectionSession,
};
use crate::{
    config::StudioConfig,
    controls::{
        FreeDragController, History, ManipulationContext, ManipulationController,
        PreciseTransformController, TransformHistory,
    },
    error::{ManipulationError, Result},
    gfx::{
        camera::CameraManager,
        gizmos::{GizmoView, TransformMode},
        picking::{ObjectPicker, PickResult, Ray},
        scene::{NodeId, ObjectKind, Scene, SceneNode},
    },
};

/// Distance in front of the camera where new objects are dropped
pub const DEFAULT_PLACEMENT_DISTANCE: f32 = 2.0;

pub type SelectedCallback = Box<dyn FnMut(NodeId, ObjectKind)>;
pub type DeselectedCallback = Box<dyn FnMut()>;

/// Context for a free-drag call: the transform controller is the peer
macro_rules! free_drag_ctx {
    ($host:expr) => {
        ManipulationContext {
            scene: &mut $host.scene,
            navigation: &mut $host.camera.controller,
            peer: &mut $host.transform,
            history: $host.history.as_mut(),
        }
    };
}

/// Context for a transform call: the free-drag controller is the peer
macro_rules! transform_ctx {
    ($host:expr) => {
        ManipulationContext {
            scene: &mut $host.scene,
            navigation: &mut $host.camera.controller,
            peer: &mut $host.free_drag,
            history: $host.history.as_mut(),
        }
    };
}

/// Who owns the primary button between press and release
#[derive(Debug, Clone, Copy)]
enum PressOwner {
    Gizmo,
    /// Pressed on draggable furniture; becomes a drag once the pointer travels
    PendingDrag { target: NodeId, ray: Ray },
    FreeDrag,
    Navigation,
}

#[derive(Debug, Clone, Copy)]
struct PointerPress {
    origin: (f32, f32),
    owner: PressOwner,
}

#[derive(Debug, Clone, Copy, Default)]
struct ModifierState {
    shift: bool,
    control: bool,
}

/// The interactive van viewport.
///
/// Owns the scene, the camera and its navigation, picking, both
/// manipulation controllers, the selection and the history collaborator,
/// and routes input between them. A primary press goes to the first of:
///
/// 1. a transform gizmo handle
/// 2. registered furniture (free drag, once the pointer travels)
/// 3. camera navigation
///
/// A press and release that stays within the click tolerance selects what
/// is under the pointer, or deselects when nothing is.
pub struct ViewportHost {
    config: StudioConfig,
    scene: Scene,
    camera: CameraManager,
    picker: ObjectPicker,
    free_drag: FreeDragController,
    transform: PreciseTransformController,
    selection: SelectionSession,
    history: Box<dyn History>,
    viewport_size: (f32, f32),
    pointer: (f32, f32),
    press: Option<PointerPress>,
    modifiers: ModifierState,
    cursor: CursorIcon,
    on_selected: Option<SelectedCallback>,
    on_deselected: Option<DeselectedCallback>,
}

impl ViewportHost {
    /// Host with a [`TransformHistory`] sized from the config
    pub fn new(config: StudioConfig) -> Self {
        let history = TransformHistory::new(config.history_capacity);
        Self::with_history(config, Box::new(history))
    }

    pub fn with_history(config: StudioConfig, history: Box<dyn History>) -> Self {
        let mut free_drag = FreeDragController::new();
        if !config.free_drag_enabled {
            free_drag.disable();
        }

        let mut host = Self {
            scene: Scene::new(),
            camera: CameraManager::from_config(&config.camera),
            picker: ObjectPicker::new(config.picking.max_ancestor_depth),
            free_drag,
            transform: PreciseTransformController::new(&config.gizmo),
            selection: SelectionSession::new(&config.selection),
            history,
            viewport_size: config.camera.viewport_size,
            pointer: (0.0, 0.0),
            press: None,
            modifiers: ModifierState::default(),
            cursor: CursorIcon::Default,
            on_selected: None,
            on_deselected: None,
            config,
        };
        host.history.record_baseline(&host.scene);
        log::info!(
            "Viewport ready ({}x{})",
            host.viewport_size.0,
            host.viewport_size.1
        );
        host
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access; call [`ViewportHost::frame`] afterwards so the
    /// gizmo follows any moved object
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn free_drag(&self) -> &FreeDragController {
        &self.free_drag
    }

    pub fn transform(&self) -> &PreciseTransformController {
        &self.transform
    }

    pub fn selection(&self) -> &SelectionSession {
        &self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.selected()
    }

    /// Pointer affordance for the window
    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn viewport_size(&self) -> (f32, f32) {
        self.viewport_size
    }

    pub fn on_object_selected(&mut self, callback: impl FnMut(NodeId, ObjectKind) + 'static) {
        self.on_selected = Some(Box::new(callback));
    }

    pub fn on_object_deselected(&mut self, callback: impl FnMut() + 'static) {
        self.on_deselected = Some(Box::new(callback));
    }

    // --- scene management ---

    /// Adds a top-level node; furniture becomes draggable
    pub fn add_to_scene(&mut self, node: SceneNode) -> NodeId {
        let id = self.scene.add(node);
        self.register_furniture(id);
        self.history.record_baseline(&self.scene);
        id
    }

    /// Adds a node under `parent`; furniture becomes draggable
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId> {
        let id = self
            .scene
            .add_child(parent, node)
            .ok_or(ManipulationError::ObjectNotFound(parent))?;
        self.register_furniture(id);
        self.history.record_baseline(&self.scene);
        Ok(id)
    }

    fn register_furniture(&mut self, id: NodeId) {
        let is_furniture = self.scene.get(id).is_some_and(|node| node.is_furniture());
        if is_furniture {
            if let Err(err) = self.free_drag.register(id, &mut self.scene) {
                log::warn!("{}", err);
            }
        }
    }

    /// Removes `id` and its subtree.
    ///
    /// Any gesture, attachment or selection touching the subtree ends first;
    /// a cancelled gesture is not committed to history.
    pub fn remove_from_scene(&mut self, id: NodeId) -> Result<SceneNode> {
        if !self.scene.contains(id) {
            log::warn!("Cannot remove missing object {:?}", id);
            return Err(ManipulationError::ObjectNotFound(id));
        }
        let doomed = self.scene.descendants(id);

        if self
            .free_drag
            .drag_target()
            .is_some_and(|target| doomed.contains(&target))
        {
            self.free_drag.cancel(&mut free_drag_ctx!(self));
            self.press = None;
        }
        for node in &doomed {
            if self.free_drag.is_registered(*node) {
                self.free_drag.unregister(*node, &mut free_drag_ctx!(self));
            }
        }

        if self
            .transform
            .active_object()
            .is_some_and(|object| doomed.contains(&object))
        {
            if self.transform.is_dragging() {
                self.press = None;
            }
            self.transform.detach(&mut transform_ctx!(self));
        }

        if self
            .selection
            .selected()
            .is_some_and(|selected| doomed.contains(&selected))
        {
            self.selection.deselect(&mut self.scene);
            self.notify_deselected();
        }

        let removed = self
            .scene
            .remove(id)
            .ok_or(ManipulationError::ObjectNotFound(id))?;
        self.history.record_baseline(&self.scene);
        log::info!("Removed '{}' from the scene", removed.name);
        Ok(removed)
    }

    /// Removes every top-level object, optionally keeping the van shell
    pub fn clear_scene(&mut self, keep_van: bool) {
        let doomed: Vec<NodeId> = self
            .scene
            .roots()
            .iter()
            .copied()
            .filter(|id| !(keep_van && self.scene.get(*id).is_some_and(|node| node.is_van())))
            .collect();

        for id in doomed {
            if let Err(err) = self.remove_from_scene(id) {
                log::warn!("{}", err);
            }
        }
    }

    // --- controller switches ---

    /// Takes effect once a running transform gesture ends
    pub fn enable_free_drag(&mut self) {
        self.free_drag.enable();
    }

    pub fn disable_free_drag(&mut self) {
        self.free_drag.disable();
    }

    /// Takes effect once a running free drag ends
    pub fn enable_transform(&mut self) {
        self.transform.enable();
    }

    pub fn disable_transform(&mut self) {
        self.transform.disable();
    }

    pub fn set_transform_mode(&mut self, mode: &str) -> Result<()> {
        self.transform.set_mode_str(mode, &mut self.scene)
    }

    pub fn set_movement_scale(&mut self, factor: f32) -> Result<()> {
        self.transform.set_movement_scale(factor)
    }

    pub fn set_gizmo_size(&mut self, size: f32) -> Result<()> {
        self.transform.set_size(size)
    }

    /// Attaches the transform gizmo to `id` without selecting it
    pub fn attach_transform(&mut self, id: NodeId) -> Result<()> {
        self.transform.attach(id, &mut transform_ctx!(self))
    }

    pub fn detach_transform(&mut self) {
        self.transform.detach(&mut transform_ctx!(self));
    }

    // --- selection ---

    pub fn select(&mut self, id: NodeId) -> Result<()> {
        let kind = self
            .scene
            .get(id)
            .and_then(|node| node.kind)
            .ok_or(ManipulationError::ObjectNotFound(id))?;

        self.selection.select(&mut self.scene, id);
        if self.config.selection.attach_on_select {
            match kind {
                ObjectKind::Furniture => {
                    if let Err(err) = self.transform.attach(id, &mut transform_ctx!(self)) {
                        log::warn!("Selected '{:?}' without transform controls: {}", id, err);
                    }
                }
                ObjectKind::Van => self.transform.detach(&mut transform_ctx!(self)),
            }
        }

        log::debug!("Selected {:?} ({:?})", id, kind);
        if let Some(callback) = self.on_selected.as_mut() {
            callback(id, kind);
        }
        Ok(())
    }

    /// Clears the selection; a no-op when nothing is selected
    pub fn deselect(&mut self) {
        if self.selection.deselect(&mut self.scene).is_none() {
            return;
        }
        if self.config.selection.attach_on_select {
            self.transform.detach(&mut transform_ctx!(self));
        }
        self.notify_deselected();
    }

    fn notify_deselected(&mut self) {
        log::debug!("Selection cleared");
        if let Some(callback) = self.on_deselected.as_mut() {
            callback();
        }
    }

    // --- history ---

    pub fn undo(&mut self) -> bool {
        if self.is_manipulating() {
            return false;
        }
        let undone = self.history.undo(&mut self.scene);
        if undone {
            self.transform.update_controls_position(&mut self.scene);
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        if self.is_manipulating() {
            return false;
        }
        let redone = self.history.redo(&mut self.scene);
        if redone {
            self.transform.update_controls_position(&mut self.scene);
        }
        redone
    }

    /// Whether either controller is mid-gesture
    pub fn is_manipulating(&self) -> bool {
        self.free_drag.is_dragging() || self.transform.is_dragging()
    }

    // --- camera ---

    /// Frames the object's bounding box
    pub fn focus_on_object(&mut self, id: NodeId) -> Result<()> {
        let bounds = self
            .scene
            .bounding_box(id)
            .ok_or(ManipulationError::ObjectNotFound(id))?;
        self.camera.camera.focus_on(bounds.center(), bounds.size());
        Ok(())
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Floor point `distance` in front of the camera (Y forced to 0)
    pub fn position_in_front_of_camera(&self, distance: f32) -> Vector3<f32> {
        let camera = &self.camera.camera;
        let mut position = camera.eye + camera.forward() * distance;
        position.y = 0.0;
        position
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport_size = (width as f32, height as f32);
        self.camera.resize(width, height);
    }

    /// Per-frame update: camera damping, then keep the idle gizmo on its object
    pub fn frame(&mut self, dt: f32) {
        self.camera.update(dt);
        self.transform.update_controls_position(&mut self.scene);
    }

    // --- input ---

    pub fn handle_input(&mut self, input: ViewportInput) {
        match input {
            ViewportInput::PointerMoved { x, y } => self.pointer_moved((x, y)),
            ViewportInput::PointerPressed(PointerButton::Primary) => self.pointer_pressed(),
            ViewportInput::PointerReleased(PointerButton::Primary) => self.pointer_released(true),
            ViewportInput::PointerPressed(_) | ViewportInput::PointerReleased(_) => {}
            ViewportInput::PointerLeft => self.pointer_released(false),
            ViewportInput::Wheel(delta) => {
                self.camera.controller.wheel(delta, &mut self.camera.camera);
            }
            ViewportInput::KeyPressed(key) => self.key_pressed(key),
            ViewportInput::ModifiersChanged { shift, control } => {
                self.modifiers = ModifierState { shift, control };
                self.camera.controller.set_shift_held(shift);
            }
            ViewportInput::Resized { width, height } => self.resize(width, height),
        }
    }

    /// World ray under a screen position
    pub fn ray_at(&self, screen_pos: (f32, f32)) -> Ray {
        self.picker
            .screen_to_ray(screen_pos, self.viewport_size, &self.camera.camera)
    }

    /// Tagged object under a screen position
    pub fn pick(&self, screen_pos: (f32, f32)) -> Option<PickResult> {
        self.picker.pick_with_ray(&self.ray_at(screen_pos), &self.scene)
    }

    fn gizmo_view(&self) -> GizmoView {
        GizmoView::from(&self.camera.camera)
    }

    fn pointer_pressed(&mut self) {
        if self.press.is_some() {
            return;
        }
        let ray = self.ray_at(self.pointer);
        let view = self.gizmo_view();

        let owner = if self.transform.pointer_down(&ray, &view, &mut transform_ctx!(self)) {
            PressOwner::Gizmo
        } else {
            match self.draggable_under(&ray) {
                Some(target) => PressOwner::PendingDrag { target, ray },
                None => {
                    self.camera.controller.pointer_pressed(self.pointer);
                    PressOwner::Navigation
                }
            }
        };

        self.press = Some(PointerPress {
            origin: self.pointer,
            owner,
        });
        self.refresh_cursor(&ray);
    }

    /// Registered furniture under the ray, if free drag may start on it
    fn draggable_under(&self, ray: &Ray) -> Option<NodeId> {
        if !self.free_drag.is_active() {
            return None;
        }
        let pick = self.picker.pick_with_ray(ray, &self.scene)?;
        (pick.kind == ObjectKind::Furniture && self.free_drag.is_registered(pick.target))
            .then_some(pick.target)
    }

    fn pointer_moved(&mut self, position: (f32, f32)) {
        self.pointer = position;
        let ray = self.ray_at(position);

        if let Some(PointerPress {
            origin,
            owner: PressOwner::PendingDrag { target, ray: press_ray },
        }) = self.press
        {
            if self.travel_from(origin) > self.config.selection.click_tolerance_px {
                let started = self
                    .free_drag
                    .start(target, &press_ray, &mut free_drag_ctx!(self));
                let owner = if started {
                    PressOwner::FreeDrag
                } else {
                    self.camera.controller.pointer_pressed(origin);
                    PressOwner::Navigation
                };
                self.press = Some(PointerPress { origin, owner });
            }
        }

        if self.transform.is_dragging() {
            self.transform.pointer_move(&ray, &mut transform_ctx!(self));
        } else if self.free_drag.is_dragging() {
            self.free_drag.drag(&ray, &mut free_drag_ctx!(self));
        } else {
            self.camera
                .controller
                .pointer_moved(position, &mut self.camera.camera);
        }

        self.refresh_cursor(&ray);
    }

    fn pointer_released(&mut self, allow_click: bool) {
        let Some(press) = self.press.take() else {
            return;
        };

        match press.owner {
            PressOwner::Gizmo => {
                self.transform.pointer_up(&mut transform_ctx!(self));
            }
            PressOwner::FreeDrag => {
                self.free_drag.end(&mut free_drag_ctx!(self));
            }
            PressOwner::PendingDrag { .. } | PressOwner::Navigation => {}
        }
        self.camera.controller.pointer_released();

        let is_click = allow_click
            && !matches!(press.owner, PressOwner::Gizmo)
            && self.travel_from(press.origin) <= self.config.selection.click_tolerance_px;
        if is_click {
            self.click(self.pointer);
        }

        let ray = self.ray_at(self.pointer);
        self.refresh_cursor(&ray);
    }

    fn click(&mut self, position: (f32, f32)) {
        match self.pick(position) {
            Some(pick) => {
                if let Err(err) = self.select(pick.target) {
                    log::warn!("{}", err);
                }
            }
            None => self.deselect(),
        }
    }

    fn travel_from(&self, origin: (f32, f32)) -> f32 {
        let dx = self.pointer.0 - origin.0;
        let dy = self.pointer.1 - origin.1;
        (dx * dx + dy * dy).sqrt()
    }

    fn key_pressed(&mut self, key: ViewportKey) {
        match key {
            // plain letters only; ctrl chords belong to the shell
            ViewportKey::Character('t') if !self.modifiers.control => {
                self.set_mode_logged(TransformMode::Translate)
            }
            ViewportKey::Character('r') if !self.modifiers.control => {
                self.set_mode_logged(TransformMode::Rotate)
            }
            ViewportKey::Character('s') if !self.modifiers.control => {
                self.set_mode_logged(TransformMode::Scale)
            }
            ViewportKey::Character('d') if !self.modifiers.control => {
                self.free_drag.toggle();
                log::info!(
                    "Free drag {}",
                    if self.free_drag.is_enabled() { "enabled" } else { "disabled" }
                );
            }
            ViewportKey::Character('c') if self.modifiers.shift => self.reset_camera(),
            ViewportKey::Character('z') if self.modifiers.control => {
                if self.modifiers.shift {
                    self.redo();
                } else {
                    self.undo();
                }
            }
            ViewportKey::Character('y') if self.modifiers.control => {
                self.redo();
            }
            ViewportKey::Escape => {
                if self.free_drag.is_dragging() {
                    self.free_drag.cancel(&mut free_drag_ctx!(self));
                    self.press = None;
                } else {
                    self.deselect();
                }
            }
            ViewportKey::Delete | ViewportKey::Backspace => {
                let removable = self
                    .selected()
                    .filter(|id| self.scene.get(*id).is_some_and(|node| node.is_furniture()));
                if let Some(id) = removable {
                    if let Err(err) = self.remove_from_scene(id) {
                        log::warn!("{}", err);
                    }
                }
            }
            ViewportKey::Character(_) => {}
        }
    }

    fn set_mode_logged(&mut self, mode: TransformMode) {
        if self.transform.set_mode(mode, &mut self.scene).is_ok() {
            log::info!("Transform mode: {}", mode);
        }
    }

    fn refresh_cursor(&mut self, ray: &Ray) {
        self.cursor = if self.is_manipulating() {
            CursorIcon::Grabbing
        } else if self.press.is_some() {
            self.cursor
        } else if self
            .transform
            .pointer_hover(ray, &GizmoView::from(&self.camera.camera))
            .is_some()
        {
            CursorIcon::Move
        } else if self.picker.pick_with_ray(ray, &self.scene).is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
    }
}

impl std::fmt::Debug for ViewportHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportHost")
            .field("objects", &self.scene.len())
            .field("selected", &self.selection.selected())
            .field("free_drag", &self.free_drag.is_enabled())
            .field("transform_mode", &self.transform.mode())
            .field("viewport_size", &self.viewport_size)
            .finish()
    }
}
