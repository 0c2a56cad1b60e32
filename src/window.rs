//! Windowed frontend.
//!
//! Drives a [`Scene`] from the winit event loop: one `step_frame` per
//! redraw, presented through the [`Blitter`]. Window events arrive
//! strictly between frames, so theme switches and resizes never race the
//! simulation.
//!
//! Keys: `1`-`4` switch themes, `S` writes a PNG snapshot, `Escape`
//! quits.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::clock::FrameClock;
use crate::gfx::Blitter;
use crate::prefs::{JsonPrefs, PrefStore, THEME_KEY};
use crate::scene::Scene;
use crate::theme::Theme;

/// The windowed backdrop application.
pub struct App {
    window: Option<Arc<Window>>,
    blitter: Option<Blitter>,
    scene: Option<Scene>,
    clock: FrameClock,
    /// Theme requested on the command line for this run.
    theme_override: Option<String>,
    /// Switch requested before setup finished; applied once the scene
    /// exists.
    pending_theme: Option<String>,
    frame: Vec<u8>,
}

impl App {
    pub fn new(theme_override: Option<String>) -> Self {
        Self {
            window: None,
            blitter: None,
            scene: None,
            clock: FrameClock::new(),
            theme_override,
            pending_theme: None,
            frame: Vec::new(),
        }
    }

    /// Switch the running scene, or, before setup has produced surfaces,
    /// just persist the preference and remember the request.
    pub fn request_theme(&mut self, name: &str) {
        match self.scene.as_mut() {
            Some(scene) => {
                if let Err(e) = scene.switch_theme(name) {
                    tracing::warn!(error = %e, "theme switch rejected");
                }
            }
            None => {
                if Theme::lookup(name).is_ok() {
                    if let Some(path) = JsonPrefs::default_path() {
                        JsonPrefs::open(path).set(THEME_KEY, name);
                    }
                    self.pending_theme = Some(name.to_string());
                }
            }
        }
    }

    fn build_scene(&self, width: u32, height: u32) -> Option<Scene> {
        let mut builder = Scene::builder(width, height);
        if let Some(path) = JsonPrefs::default_path() {
            builder = builder.with_prefs(JsonPrefs::open(path));
        }
        if let Some(name) = &self.theme_override {
            builder = builder.with_theme(name);
        }
        match builder.build() {
            Ok(scene) => Some(scene),
            Err(e) => {
                tracing::error!(error = %e, "failed to build scene");
                None
            }
        }
    }

    fn update_title(&self) {
        if let (Some(window), Some(scene)) = (&self.window, &self.scene) {
            window.set_title(&format!(
                "nocturne [{}] {:.0} fps",
                scene.theme().name,
                self.clock.fps()
            ));
        }
    }

    fn snapshot(&self) {
        if let Some(scene) = &self.scene {
            let path = std::path::PathBuf::from(format!("nocturne-{}.png", scene.tick()));
            match scene.write_snapshot(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "snapshot written"),
                Err(e) => tracing::warn!(error = %e, "snapshot failed"),
            }
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Digit1 => self.request_theme("default"),
            KeyCode::Digit2 => self.request_theme("swirl"),
            KeyCode::Digit3 => self.request_theme("pipeline"),
            KeyCode::Digit4 => self.request_theme("aurora"),
            KeyCode::KeyS => self.snapshot(),
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(scene), Some(blitter)) = (self.scene.as_mut(), self.blitter.as_mut()) else {
            return;
        };
        scene.step_frame();
        scene.visible_rgba8(&mut self.frame);
        match blitter.present(&self.frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let (w, h) = blitter.size();
                blitter.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("presentation surface out of memory");
                event_loop.exit();
            }
            Err(e) => tracing::warn!(error = %e, "dropped frame"),
        }
        let (_, refreshed) = self.clock.frame();
        if refreshed {
            self.update_title();
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("nocturne")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!(error = %e, "failed to create window");
                event_loop.exit();
                return;
            }
        };

        let blitter = match pollster::block_on(Blitter::new(window.clone())) {
            Ok(blitter) => blitter,
            Err(e) => {
                tracing::error!(error = %e, "failed to set up presentation");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let Some(mut scene) = self.build_scene(size.width, size.height) else {
            event_loop.exit();
            return;
        };
        if let Some(name) = self.pending_theme.take() {
            if let Err(e) = scene.switch_theme(&name) {
                tracing::warn!(error = %e, "pending theme switch rejected");
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.blitter = Some(blitter);
        self.scene = Some(scene);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(blitter) = self.blitter.as_mut() {
                    blitter.resize(size.width, size.height);
                }
                if let Some(scene) = self.scene.as_mut() {
                    scene.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.on_key(event_loop, key),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
