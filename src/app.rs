use anyhow::Context;
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::StudioConfig,
    viewport::{translate_window_event, ViewportHost},
};

/// Called once per frame after the host has updated
pub type FrameCallback = Box<dyn FnMut(&mut ViewportHost, f32)>;

/// Windowed shell around a [`ViewportHost`].
///
/// Owns the winit event loop and window, forwards window events to the host
/// and drives its per-frame update. Drawing is left to the frame callback.
pub struct StudioApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    host: ViewportHost,
    last_frame: Option<Instant>,
    frame_callback: Option<FrameCallback>,
}

impl StudioApp {
    /// Create a new studio application with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(StudioConfig::default())
    }

    pub fn with_config(config: StudioConfig) -> anyhow::Result<Self> {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();

        let event_loop = EventLoop::new().context("failed to create event loop")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                host: ViewportHost::new(config),
                last_frame: None,
                frame_callback: None,
            },
        })
    }

    pub fn host(&self) -> &ViewportHost {
        &self.app_state.host
    }

    /// Scene setup before the loop starts
    pub fn host_mut(&mut self) -> &mut ViewportHost {
        &mut self.app_state.host
    }

    pub fn set_frame_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut ViewportHost, f32) + 'static,
    {
        self.app_state.frame_callback = Some(Box::new(callback));
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated with an error")
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.host.viewport_size();
        let attributes = WindowAttributes::default()
            .with_title("Van Studio")
            .with_inner_size(winit::dpi::PhysicalSize::new(width as u32, height as u32));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                let window = Arc::new(window);
                let size = window.inner_size();
                self.host.resize(size.width, size.height);
                self.window = Some(window);
                self.last_frame = Some(Instant::now());
            }
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = self
                    .last_frame
                    .replace(now)
                    .map_or(0.0, |last| (now - last).as_secs_f32());

                self.host.frame(dt);
                if let Some(callback) = self.frame_callback.as_mut() {
                    callback(&mut self.host, dt);
                }
            }
            event => {
                if let Some(input) = translate_window_event(&event) {
                    self.host.handle_input(input);
                    window.set_cursor(self.host.cursor());
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
