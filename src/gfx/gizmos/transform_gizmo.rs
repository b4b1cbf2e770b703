//! # Transform Gizmo
//!
//! Axis handles for precise translate/rotate/scale edits. The gizmo never
//! touches scene nodes: it manipulates a [`ProxyHandle`] and reports what
//! happened through a queue of [`GizmoEvent`]s, which the owning controller
//! drains and forwards onto the real object.
//!
//! Translate and rotate handles follow the world axes. Scale handles follow
//! the attached object's orientation, because scale is applied in the
//! object's own axes.

use std::{collections::VecDeque, fmt, str::FromStr};

use cgmath::{InnerSpace, One, Quaternion, Rad, Rotation3, Vector3};

use crate::{
    config::GizmoConfig,
    error::{ManipulationError, Result},
    gfx::{
        camera::OrbitCamera,
        picking::{Plane, Ray},
    },
};

/// World length of a handle per unit of `size` per unit of camera distance
const HANDLE_SCALE: f32 = 0.15;
/// Pick radius of an axis handle, relative to the handle length
const AXIS_PICK_RADIUS: f32 = 0.1;
/// Pick radius of the center handle, relative to the handle length
const CENTER_PICK_RADIUS: f32 = 0.15;
/// Smallest per-axis scale ratio a drag can produce
const MIN_SCALE_RATIO: f32 = 0.01;

/// Which kind of edit the gizmo performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformMode::Translate => "translate",
            TransformMode::Rotate => "rotate",
            TransformMode::Scale => "scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformMode {
    type Err = ManipulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "translate" => Ok(TransformMode::Translate),
            "rotate" => Ok(TransformMode::Rotate),
            "scale" => Ok(TransformMode::Scale),
            _ => Err(ManipulationError::InvalidMode(s.to_string())),
        }
    }
}

/// A handle on the gizmo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// Free translation in the view plane, or uniform scale
    Center,
}

impl GizmoAxis {
    pub const AXES: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// Unit direction of the axis; `None` for the center handle
    pub fn direction(&self) -> Option<Vector3<f32>> {
        match self {
            GizmoAxis::X => Some(Vector3::unit_x()),
            GizmoAxis::Y => Some(Vector3::unit_y()),
            GizmoAxis::Z => Some(Vector3::unit_z()),
            GizmoAxis::Center => None,
        }
    }
}

/// The invisible anchor the gizmo is bound to
///
/// Rotation and scale are relative to the moment the proxy was last placed,
/// so a freshly placed proxy always carries identity rotation and unit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyHandle {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl ProxyHandle {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Notifications produced by the gizmo, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    /// A handle drag started (`true`) or finished (`false`)
    DraggingChanged(bool),
    /// The proxy moved, rotated or scaled
    ObjectChange,
}

/// What the gizmo needs to know about the viewing camera
#[derive(Debug, Clone, Copy)]
pub struct GizmoView {
    pub eye: Vector3<f32>,
    /// Unit view direction
    pub forward: Vector3<f32>,
}

impl From<&OrbitCamera> for GizmoView {
    fn from(camera: &OrbitCamera) -> Self {
        Self {
            eye: camera.eye,
            forward: camera.forward(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    axis: GizmoAxis,
    /// World direction of the dragged handle
    direction: Option<Vector3<f32>>,
    plane: Plane,
    start_point: Vector3<f32>,
    start_proxy: ProxyHandle,
}

/// Translate/rotate/scale gizmo bound to a [`ProxyHandle`]
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    size: f32,
    mode: TransformMode,
    visible: bool,
    enabled: bool,
    proxy: Option<ProxyHandle>,
    orientation: Quaternion<f32>,
    hovered: Option<GizmoAxis>,
    drag: Option<HandleDrag>,
    events: VecDeque<GizmoEvent>,
}

impl TransformGizmo {
    /// Creates a hidden, detached gizmo.
    ///
    /// Fails if the configured size is not a finite positive number.
    pub fn new(config: &GizmoConfig) -> Result<Self> {
        validate_size(config.size)?;

        Ok(Self {
            size: config.size,
            mode: config.mode,
            visible: false,
            enabled: true,
            proxy: None,
            orientation: Quaternion::one(),
            hovered: None,
            drag: None,
            events: VecDeque::new(),
        })
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) -> Result<()> {
        validate_size(size)?;
        self.size = size;
        Ok(())
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
        self.hovered = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.hovered = None;
        }
    }

    /// Whether the handles react to pointer input
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.hovered = None;
        }
    }

    pub fn proxy(&self) -> Option<&ProxyHandle> {
        self.proxy.as_ref()
    }

    /// Binds the gizmo to a new proxy, with world-aligned handles
    pub fn attach(&mut self, proxy: ProxyHandle) {
        self.drag = None;
        self.hovered = None;
        self.orientation = Quaternion::one();
        self.proxy = Some(proxy);
    }

    /// World rotation the scale handles are aligned to
    pub fn orientation(&self) -> Quaternion<f32> {
        self.orientation
    }

    /// Aligns the scale handles with an object rotated by `orientation`.
    ///
    /// A drag already in progress keeps the direction it started with.
    pub fn set_orientation(&mut self, orientation: Quaternion<f32>) {
        self.orientation = orientation.normalize();
    }

    /// Unbinds the gizmo and hands back its proxy
    pub fn detach(&mut self) -> Option<ProxyHandle> {
        self.drag = None;
        self.hovered = None;
        self.events.clear();
        self.proxy.take()
    }

    /// Moves the proxy to `position` with identity rotation and unit scale.
    ///
    /// Mid-drag, the drag continues relative to the new placement.
    pub fn place_proxy(&mut self, position: Vector3<f32>) {
        let Some(proxy) = self.proxy.as_mut() else {
            return;
        };

        *proxy = ProxyHandle::at(position);
        if let Some(drag) = self.drag.as_mut() {
            drag.start_proxy = *proxy;
        }
        self.events.push_back(GizmoEvent::ObjectChange);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The handle being dragged, if any
    pub fn active_axis(&self) -> Option<GizmoAxis> {
        self.drag.map(|drag| drag.axis)
    }

    /// World length of the handles seen from `camera_distance` away
    pub fn handle_length(&self, camera_distance: f32) -> f32 {
        self.size * camera_distance * HANDLE_SCALE
    }

    /// Closest handle under `ray`, if the gizmo is visible and enabled
    pub fn hit_test(&self, ray: &Ray, view: &GizmoView) -> Option<GizmoAxis> {
        if !self.visible || !self.enabled {
            return None;
        }
        let proxy = self.proxy.as_ref()?;
        let origin = proxy.position;
        let length = self.handle_length((view.eye - origin).magnitude());
        let axis_radius = length * AXIS_PICK_RADIUS;

        let mut candidates: Vec<(GizmoAxis, f32)> = Vec::new();

        match self.mode {
            TransformMode::Translate | TransformMode::Scale => {
                // the center handle sits on top of every axis base
                if let Some((distance, _)) = ray.distance_to_segment(origin, origin) {
                    if distance <= length * CENTER_PICK_RADIUS {
                        return Some(GizmoAxis::Center);
                    }
                }

                for axis in GizmoAxis::AXES {
                    let Some(direction) = self.handle_direction(axis) else {
                        continue;
                    };
                    if let Some((distance, t)) =
                        ray.distance_to_segment(origin, origin + direction * length)
                    {
                        if distance <= axis_radius {
                            candidates.push((axis, t));
                        }
                    }
                }
            }
            TransformMode::Rotate => {
                for axis in GizmoAxis::AXES {
                    let Some(direction) = axis.direction() else {
                        continue;
                    };
                    let Some(point) = Plane::new(direction, origin).intersect_ray(ray) else {
                        continue;
                    };
                    if ((point - origin).magnitude() - length).abs() <= axis_radius {
                        candidates.push((axis, (point - ray.origin).magnitude()));
                    }
                }
            }
        }

        candidates
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Updates the hovered handle; returns it
    pub fn hover(&mut self, ray: &Ray, view: &GizmoView) -> Option<GizmoAxis> {
        if self.drag.is_none() {
            self.hovered = self.hit_test(ray, view);
        }
        self.hovered
    }

    /// Starts dragging the handle under `ray`.
    ///
    /// Returns `false` (and queues nothing) if no handle was hit.
    pub fn begin_drag(&mut self, ray: &Ray, view: &GizmoView) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(axis) = self.hit_test(ray, view) else {
            return false;
        };
        let Some(proxy) = self.proxy else {
            return false;
        };

        let direction = self.handle_direction(axis);
        let plane = self.drag_plane(direction, proxy.position, view);
        let Some(start_point) = plane.intersect_ray(ray) else {
            return false;
        };

        self.drag = Some(HandleDrag {
            axis,
            direction,
            plane,
            start_point,
            start_proxy: proxy,
        });
        self.hovered = Some(axis);
        self.events.push_back(GizmoEvent::DraggingChanged(true));
        true
    }

    /// Applies pointer motion to the proxy; `false` if nothing changed
    pub fn update_drag(&mut self, ray: &Ray) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(point) = drag.plane.intersect_ray(ray) else {
            return false;
        };
        let Some(proxy) = self.proxy.as_mut() else {
            return false;
        };

        let start = drag.start_proxy;
        let pivot = start.position;
        match (self.mode, drag.direction) {
            (TransformMode::Translate, Some(direction)) => {
                let along = (point - drag.start_point).dot(direction);
                proxy.position = start.position + direction * along;
            }
            (TransformMode::Translate, None) => {
                proxy.position = start.position + (point - drag.start_point);
            }
            (TransformMode::Rotate, Some(direction)) => {
                let from = drag.start_point - pivot;
                let to = point - pivot;
                let angle = from.cross(to).dot(direction).atan2(from.dot(to));
                proxy.rotation = Quaternion::from_axis_angle(direction, Rad(angle)) * start.rotation;
            }
            (TransformMode::Rotate, None) => return false,
            (TransformMode::Scale, Some(direction)) => {
                let from = (drag.start_point - pivot).dot(direction);
                if from.abs() <= f32::EPSILON {
                    return false;
                }
                let ratio = ((point - pivot).dot(direction) / from).max(MIN_SCALE_RATIO);
                proxy.scale = start.scale;
                match drag.axis {
                    GizmoAxis::X => proxy.scale.x *= ratio,
                    GizmoAxis::Y => proxy.scale.y *= ratio,
                    GizmoAxis::Z => proxy.scale.z *= ratio,
                    GizmoAxis::Center => {}
                }
            }
            (TransformMode::Scale, None) => {
                let from = (drag.start_point - pivot).magnitude();
                if from <= f32::EPSILON {
                    return false;
                }
                let ratio = ((point - pivot).magnitude() / from).max(MIN_SCALE_RATIO);
                proxy.scale = start.scale * ratio;
            }
        }

        self.events.push_back(GizmoEvent::ObjectChange);
        true
    }

    /// Finishes the current drag; `false` if there was none
    pub fn end_drag(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.events.push_back(GizmoEvent::DraggingChanged(false));
        true
    }

    /// Drops the current drag without reporting its end
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Pending events, oldest first
    pub fn take_events(&mut self) -> Vec<GizmoEvent> {
        self.events.drain(..).collect()
    }

    /// World direction of a handle in the current mode
    fn handle_direction(&self, axis: GizmoAxis) -> Option<Vector3<f32>> {
        let direction = axis.direction()?;
        match self.mode {
            TransformMode::Scale => Some(self.orientation * direction),
            TransformMode::Translate | TransformMode::Rotate => Some(direction),
        }
    }

    /// Plane the pointer ray is projected on while dragging a handle
    /// pointing along `direction` (`None` for the center handle)
    fn drag_plane(
        &self,
        direction: Option<Vector3<f32>>,
        origin: Vector3<f32>,
        view: &GizmoView,
    ) -> Plane {
        match (self.mode, direction) {
            (TransformMode::Rotate, Some(direction)) => Plane::new(direction, origin),
            (_, Some(direction)) => {
                // contains the axis and faces the camera as much as possible
                let normal = view.forward - direction * view.forward.dot(direction);
                if normal.magnitude2() > f32::EPSILON {
                    Plane::new(normal, origin)
                } else {
                    Plane::new(any_perpendicular(direction), origin)
                }
            }
            (_, None) => Plane::new(view.forward, origin),
        }
    }
}

fn validate_size(size: f32) -> Result<()> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(ManipulationError::InvalidGizmoSize(size))
    }
}

fn any_perpendicular(direction: Vector3<f32>) -> Vector3<f32> {
    if direction.x.abs() < 0.9 {
        direction.cross(Vector3::unit_x())
    } else {
        direction.cross(Vector3::unit_y())
    }
}
