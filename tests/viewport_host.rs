use std::{cell::Cell, rc::Rc};

use cgmath::{InnerSpace, Vector3, Vector4};
use vanstudio::{controls::AmbientNavigation, gfx::scene::Mesh, prelude::*};
use winit::window::CursorIcon;

const CENTER: (f32, f32) = (600.0, 400.0);

/// Counts commits so tests can check gestures land in history once
struct CountingHistory(Rc<Cell<usize>>);

impl History for CountingHistory {
    fn commit(&mut self, _scene: &Scene) {
        self.0.set(self.0.get() + 1);
    }
}

fn counted_host(config: StudioConfig) -> (ViewportHost, Rc<Cell<usize>>) {
    let commits = Rc::new(Cell::new(0));
    let host = ViewportHost::with_history(config, Box::new(CountingHistory(commits.clone())));
    (host, commits)
}

fn add_bed(host: &mut ViewportHost) -> NodeId {
    host.add_to_scene(SceneNode::furniture("bed", &generate_cube()))
}

/// Van shell with its roof (the fifth quad of the box) left out
fn add_open_van(host: &mut ViewportHost) -> NodeId {
    let geometry = generate_box(6.0, 2.0, 6.0).translated([0.0, 0.5, 0.0]);
    let indices = geometry
        .indices
        .iter()
        .enumerate()
        .filter(|(i, _)| !(24..30).contains(i))
        .map(|(_, index)| *index)
        .collect();
    host.add_to_scene(
        SceneNode::new("van")
            .with_kind(ObjectKind::Van)
            .with_mesh(Mesh::indexed(geometry.vertices, indices)),
    )
}

fn position(host: &ViewportHost, id: NodeId) -> Vector3<f32> {
    host.scene().get(id).unwrap().position
}

/// Screen position of a world point
fn project(host: &ViewportHost, point: Vector3<f32>) -> (f32, f32) {
    let camera = &host.camera().camera;
    let clip = camera.projection_matrix() * camera.view_matrix() * point.extend(1.0);
    let ndc: Vector4<f32> = clip / clip.w;
    let (width, height) = host.viewport_size();
    ((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

fn press_at(host: &mut ViewportHost, at: (f32, f32)) {
    host.handle_input(ViewportInput::PointerMoved { x: at.0, y: at.1 });
    host.handle_input(ViewportInput::PointerPressed(PointerButton::Primary));
}

fn move_to(host: &mut ViewportHost, at: (f32, f32)) {
    host.handle_input(ViewportInput::PointerMoved { x: at.0, y: at.1 });
}

fn release(host: &mut ViewportHost) {
    host.handle_input(ViewportInput::PointerReleased(PointerButton::Primary));
}

fn click_at(host: &mut ViewportHost, at: (f32, f32)) {
    press_at(host, at);
    release(host);
}

#[test]
fn test_origin_projects_to_viewport_center() {
    let host = ViewportHost::new(StudioConfig::default());
    let (x, y) = project(&host, Vector3::new(0.0, 0.0, 0.0));
    assert!((x - CENTER.0).abs() < 0.5);
    assert!((y - CENTER.1).abs() < 0.5);
}

#[test]
fn test_click_selects_and_click_on_empty_space_deselects() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);

    click_at(&mut host, CENTER);
    assert_eq!(host.selected(), Some(bed));
    assert_eq!(host.transform().active_object(), Some(bed));
    assert!(host.transform().gizmo().unwrap().is_visible());

    click_at(&mut host, (10.0, 10.0));
    assert_eq!(host.selected(), None);
    assert!(!host.transform().is_attached());

    // clicks are not gestures
    assert_eq!(commits.get(), 0);
    assert_eq!(position(&host, bed), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_small_jitter_still_counts_as_click() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 2.0, CENTER.1 + 1.0));
    release(&mut host);

    assert_eq!(host.selected(), Some(bed));
    assert!(!host.free_drag().is_dragging());
    assert_eq!(commits.get(), 0);
}

#[test]
fn test_free_drag_through_host() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    assert!(host.free_drag().is_dragging());
    assert!(host.transform().is_suspended());
    assert!(!host.camera().controller.is_navigation_enabled());
    assert_eq!(host.cursor(), CursorIcon::Grabbing);

    move_to(&mut host, (CENTER.0 + 150.0, CENTER.1 + 20.0));
    let moved = position(&host, bed);
    assert_eq!(moved.y, 0.0);
    assert!(Vector3::new(moved.x, 0.0, moved.z).magnitude() > 0.1);

    release(&mut host);
    assert!(!host.free_drag().is_dragging());
    assert!(!host.transform().is_suspended());
    assert!(host.camera().controller.is_navigation_enabled());
    assert_eq!(commits.get(), 1);
    // a drag is not a click
    assert_eq!(host.selected(), None);
}

#[test]
fn test_raised_object_drags_at_its_own_height() {
    let (mut host, _) = counted_host(StudioConfig::default());
    let shelf = host.add_to_scene(
        SceneNode::furniture("shelf", &generate_cube()).with_position(Vector3::new(0.0, 1.2, 0.0)),
    );
    let at = project(&host, Vector3::new(0.0, 1.2, 0.0));

    press_at(&mut host, at);
    for step in 1..=5 {
        move_to(&mut host, (at.0 - 20.0 * step as f32, at.1));
        assert_eq!(position(&host, shelf).y, 1.2);
    }
    release(&mut host);

    assert_eq!(host.scene().get(shelf).unwrap().locked_height, Some(1.2));
    assert!(position(&host, shelf).x.abs() > 0.05);
}

#[test]
fn test_gizmo_drag_through_host() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);
    host.select(bed).unwrap();

    // the center handle sits on the object center and wins over free drag
    press_at(&mut host, CENTER);
    assert!(host.transform().is_dragging());
    assert!(!host.free_drag().is_dragging());
    assert!(host.free_drag().is_suspended());

    move_to(&mut host, (CENTER.0 + 50.0, CENTER.1));
    let moved = position(&host, bed);
    assert!(moved.magnitude() > 0.05);
    let proxy = host.transform().proxy().unwrap().position;
    assert!((proxy - moved).magnitude() < 1e-4);

    release(&mut host);
    assert!(!host.transform().is_dragging());
    assert!(!host.free_drag().is_suspended());
    assert_eq!(commits.get(), 1);
    assert_eq!(host.selected(), Some(bed));
}

#[test]
fn test_disabled_free_drag_orbits_instead() {
    let config = StudioConfig::default().with_free_drag_enabled(false);
    let (mut host, commits) = counted_host(config);
    let bed = add_bed(&mut host);
    let yaw = host.camera().camera.yaw;

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    release(&mut host);
    host.frame(1.0 / 60.0);

    assert_eq!(position(&host, bed), Vector3::new(0.0, 0.0, 0.0));
    assert!((host.camera().camera.yaw - yaw).abs() > 1e-4);
    assert_eq!(commits.get(), 0);
}

#[test]
fn test_removing_drag_target_mid_gesture() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    assert!(host.free_drag().is_dragging());

    host.remove_from_scene(bed).unwrap();
    assert!(!host.free_drag().is_dragging());
    assert!(!host.transform().is_suspended());
    assert!(host.camera().controller.is_navigation_enabled());

    move_to(&mut host, (CENTER.0 + 120.0, CENTER.1));
    release(&mut host);
    assert_eq!(commits.get(), 0);
    assert!(host.scene().is_empty());
}

#[test]
fn test_removing_gizmo_target_mid_gesture() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);
    host.select(bed).unwrap();

    press_at(&mut host, CENTER);
    assert!(host.transform().is_dragging());

    host.remove_from_scene(bed).unwrap();
    assert!(!host.transform().is_attached());
    assert!(!host.free_drag().is_suspended());
    assert_eq!(host.selected(), None);

    release(&mut host);
    assert_eq!(commits.get(), 0);
}

#[test]
fn test_escape_cancels_free_drag() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    let bed = add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    assert_ne!(position(&host, bed), Vector3::new(0.0, 0.0, 0.0));

    host.handle_input(ViewportInput::KeyPressed(ViewportKey::Escape));
    assert!(!host.free_drag().is_dragging());
    assert_eq!(position(&host, bed), Vector3::new(0.0, 0.0, 0.0));

    release(&mut host);
    assert_eq!(commits.get(), 0);
}

#[test]
fn test_pointer_leaving_ends_drag() {
    let (mut host, commits) = counted_host(StudioConfig::default());
    add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    host.handle_input(ViewportInput::PointerLeft);

    assert!(!host.free_drag().is_dragging());
    assert_eq!(commits.get(), 1);
    assert_eq!(host.selected(), None);
}

#[test]
fn test_enable_transform_waits_for_free_drag() {
    let (mut host, _) = counted_host(StudioConfig::default());
    add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    host.disable_transform();
    host.enable_transform();
    assert!(host.transform().is_enabled());
    assert!(!host.transform().is_active());

    release(&mut host);
    assert!(host.transform().is_active());
}

#[test]
fn test_undo_and_redo_keys() {
    let mut host = ViewportHost::new(StudioConfig::default());
    let bed = add_bed(&mut host);

    press_at(&mut host, CENTER);
    move_to(&mut host, (CENTER.0 + 100.0, CENTER.1));
    release(&mut host);
    let moved = position(&host, bed);
    assert_ne!(moved, Vector3::new(0.0, 0.0, 0.0));

    host.handle_input(ViewportInput::ModifiersChanged {
        shift: false,
        control: true,
    });
    host.handle_input(ViewportInput::KeyPressed(ViewportKey::Character('z')));
    assert_eq!(position(&host, bed), Vector3::new(0.0, 0.0, 0.0));

    host.handle_input(ViewportInput::KeyPressed(ViewportKey::Character('y')));
    assert_eq!(position(&host, bed), moved);

    // nothing further to redo
    assert!(!host.redo());
}

#[test]
fn test_delete_key_removes_only_furniture() {
    let mut host = ViewportHost::new(StudioConfig::default());
    let van = host.add_to_scene(
        SceneNode::new("van")
            .with_kind(ObjectKind::Van)
            .with_position(Vector3::new(0.0, -2.0, 0.0)),
    );
    let bed = add_bed(&mut host);

    host.select(bed).unwrap();
    host.handle_input(ViewportInput::KeyPressed(ViewportKey::Delete));
    assert!(!host.scene().contains(bed));
    assert_eq!(host.selected(), None);

    host.select(van).unwrap();
    assert!(!host.transform().is_attached());
    host.handle_input(ViewportInput::KeyPressed(ViewportKey::Backspace));
    assert!(host.scene().contains(van));
    assert_eq!(host.selected(), Some(van));
}

#[test]
fn test_mode_change_via_host() {
    let mut host = ViewportHost::new(StudioConfig::default());
    host.set_transform_mode("Rotate").unwrap();
    assert_eq!(host.transform().mode(), TransformMode::Rotate);
    assert_eq!(
        host.set_transform_mode("shear"),
        Err(ManipulationError::InvalidMode("shear".to_string()))
    );
    assert_eq!(host.transform().mode(), TransformMode::Rotate);

    assert!(host.set_movement_scale(0.0).is_err());
    assert!(host.set_gizmo_size(1.5).is_ok());
}

#[test]
fn test_furniture_inside_van_shell_is_clickable() {
    let mut host = ViewportHost::new(StudioConfig::default());
    let van = add_open_van(&mut host);
    let bed = add_bed(&mut host);

    // the view ray clears the wall and lands on the bed inside the shell
    let bed_top = project(&host, Vector3::new(0.0, 0.5, 0.0));
    click_at(&mut host, bed_top);
    assert_eq!(host.selected(), Some(bed));

    let wall = project(&host, Vector3::new(2.0, -0.5, -2.0));
    click_at(&mut host, wall);
    assert_eq!(host.selected(), Some(van));
}

#[test]
fn test_hover_cursor_follows_what_is_under_the_pointer() {
    let mut host = ViewportHost::new(StudioConfig::default());
    let bed = add_bed(&mut host);
    let van = host.add_to_scene(
        SceneNode::new("van")
            .with_kind(ObjectKind::Van)
            .with_position(Vector3::new(2.0, 0.0, -2.0)),
    );
    host.add_child(van, SceneNode::new("door").with_mesh(Mesh::from_geometry(&generate_cube())))
        .unwrap();

    let p = project(&host, Vector3::new(0.0, 0.5, 0.0));
    move_to(&mut host, p);
    assert_eq!(host.cursor(), CursorIcon::Pointer);

    // untagged mesh nested under the van
    let p = project(&host, Vector3::new(2.0, 0.0, -2.0));
    move_to(&mut host, p);
    assert_eq!(host.cursor(), CursorIcon::Pointer);

    move_to(&mut host, (10.0, 10.0));
    assert_eq!(host.cursor(), CursorIcon::Default);

    // the gizmo's center handle sits over the bed
    host.select(bed).unwrap();
    move_to(&mut host, CENTER);
    assert_eq!(host.cursor(), CursorIcon::Move);
}
