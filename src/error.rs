//! Error types for nocturne.
//!
//! This module provides error types for theme lookup, GPU presentation
//! setup, and launching the windowed frontend.

use std::fmt;

/// A theme name that is not present in the registry.
///
/// Returned by [`crate::theme::Theme::lookup`] and by
/// [`crate::scene::Scene::switch_theme`]. A rejected switch leaves the
/// current scene state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme {
    /// The name that failed to resolve.
    pub name: String,
}

impl UnknownTheme {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme '{}'", self.name)
    }
}

impl std::error::Error for UnknownTheme {}

/// Errors that can occur while setting up GPU presentation.
#[derive(Debug)]
pub enum GfxError {
    /// Failed to create a presentation surface for the window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::SurfaceCreation(e) => write!(f, "failed to create presentation surface: {}", e),
            GfxError::NoAdapter(e) => write!(f, "no compatible GPU adapter found: {}", e),
            GfxError::DeviceCreation(e) => write!(f, "failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::SurfaceCreation(e) => Some(e),
            GfxError::NoAdapter(e) => Some(e),
            GfxError::DeviceCreation(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GfxError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GfxError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GfxError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GfxError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GfxError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GfxError::DeviceCreation(e)
    }
}

/// Errors that can occur when launching the windowed backdrop.
#[derive(Debug)]
pub enum SetupError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU presentation setup failed. Without a surface no rendering is
    /// possible, so this is fatal rather than silently drawing nothing.
    Gfx(GfxError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::EventLoop(e) => write!(f, "failed to create event loop: {}", e),
            SetupError::Window(e) => write!(f, "failed to create window: {}", e),
            SetupError::Gfx(e) => write!(f, "presentation error: {}", e),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::EventLoop(e) => Some(e),
            SetupError::Window(e) => Some(e),
            SetupError::Gfx(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for SetupError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SetupError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SetupError {
    fn from(e: winit::error::OsError) -> Self {
        SetupError::Window(e)
    }
}

impl From<GfxError> for SetupError {
    fn from(e: GfxError) -> Self {
        SetupError::Gfx(e)
    }
}
