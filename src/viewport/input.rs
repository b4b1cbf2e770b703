//! Window events reduced to what the viewport host reacts to.

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey},
};

/// Pixels of a touchpad scroll that count as one wheel notch
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportKey {
    /// A printable key, lowercased
    Character(char),
    Escape,
    Delete,
    Backspace,
}

/// Input the host understands, independent of the windowing backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportInput {
    /// Pointer position in physical pixels from the top-left corner
    PointerMoved { x: f32, y: f32 },
    PointerPressed(PointerButton),
    PointerReleased(PointerButton),
    /// The pointer left the surface; any gesture ends
    PointerLeft,
    /// Positive scrolls away from the user (zoom in)
    Wheel(f32),
    KeyPressed(ViewportKey),
    ModifiersChanged { shift: bool, control: bool },
    Resized { width: u32, height: u32 },
}

/// Maps a winit window event; `None` for events the host ignores
pub fn translate_window_event(event: &WindowEvent) -> Option<ViewportInput> {
    match event {
        WindowEvent::CursorMoved { position, .. } => Some(ViewportInput::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::CursorLeft { .. } => Some(ViewportInput::PointerLeft),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Middle,
                _ => return None,
            };
            Some(match state {
                ElementState::Pressed => ViewportInput::PointerPressed(button),
                ElementState::Released => ViewportInput::PointerReleased(button),
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let scroll = match delta {
                MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                    *scroll as f32 / PIXELS_PER_LINE
                }
            };
            Some(ViewportInput::Wheel(scroll))
        }
        WindowEvent::ModifiersChanged(modifiers) => {
            let state = modifiers.state();
            Some(ViewportInput::ModifiersChanged {
                shift: state.shift_key(),
                control: state.control_key() || state.super_key(),
            })
        }
        WindowEvent::KeyboardInput { event, .. } => {
            if event.state != ElementState::Pressed || event.repeat {
                return None;
            }
            let key = match &event.logical_key {
                Key::Named(NamedKey::Escape) => ViewportKey::Escape,
                Key::Named(NamedKey::Delete) => ViewportKey::Delete,
                Key::Named(NamedKey::Backspace) => ViewportKey::Backspace,
                Key::Character(text) => ViewportKey::Character(text.chars().next()?.to_ascii_lowercase()),
                _ => return None,
            };
            Some(ViewportInput::KeyPressed(key))
        }
        WindowEvent::Resized(size) => Some(ViewportInput::Resized {
            width: size.width,
            height: size.height,
        }),
        _ => None,
    }
}
