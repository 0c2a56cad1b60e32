//! # Nocturne - themeable animated particle backdrops
//!
//! Nocturne simulates a fixed pool of lightweight actors every frame,
//! strokes them onto an offscreen surface, and composites that surface
//! with blur and glow onto a visible one. Four built-in themes change the
//! actor behavior, the record layout, and the compositing recipe.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nocturne::prelude::*;
//!
//! let mut scene = Scene::builder(1280, 720)
//!     .with_theme("swirl")
//!     .build()?;
//!
//! scene.step_frame();
//! let frame = scene.visible(); // composited RGBA surface
//! ```
//!
//! The demo binary drives a scene through a winit window with wgpu
//! presenting the CPU-composited frames; see [`window::App`].
//!
//! ## Themes
//!
//! | Name | Actors | Behavior |
//! |------|--------|----------|
//! | `default` | 700 squares | tumble around the viewport center |
//! | `swirl` | 700 ribbons | follow a drifting noise field |
//! | `pipeline` | 30 pipes | walk a coarse grid, leaving trails |
//! | `aurora` | 500 rays | vertical light bands drifting sideways |
//!
//! ## Core Concepts
//!
//! ### Scenes
//!
//! All state lives in a [`Scene`]: the active theme, the actor pool, the
//! tick counter, the RNG, the shared noise source, and the two raster
//! surfaces. There are no globals; tests build many scenes side by side
//! and step them deterministically with [`Scene::step_frame`].
//!
//! ### Actors
//!
//! Actors are packed records in one flat `f32` buffer
//! ([`pool::ActorPool`]), viewed through a typed `#[repr(C)]` struct per
//! variant. An actor whose age exceeds its lifetime (or that trips its
//! variant's bounds rule) is recycled in place with freshly sampled
//! fields; the pool's size never changes while a theme is active.
//!
//! ### Compositing
//!
//! Actors draw onto the primary surface; the theme's recipe in
//! [`compose`] carries it onto the visible surface with box-chain blurs,
//! brightness gain, and additive or source-over blending.

pub mod behavior;
pub mod clock;
pub mod color;
pub mod compose;
pub mod error;
pub mod flow;
pub mod gfx;
pub mod math;
pub mod pool;
pub mod prefs;
pub mod scene;
pub mod surface;
pub mod theme;
pub mod window;

pub use color::Hsla;
pub use error::{GfxError, SetupError, UnknownTheme};
pub use flow::FlowNoise;
pub use pool::{ActorPool, HaloRecord, PipeRecord, RayRecord, SwirlRecord};
pub use prefs::{JsonPrefs, MemoryPrefs, PrefStore, THEME_KEY};
pub use scene::{Scene, SceneBuilder};
pub use surface::{Blend, Filter, Surface};
pub use theme::{Span, Theme, Variant};

/// Current viewport dimensions and the derived center point.
///
/// Recomputed on every resize notification; the simulation reads it each
/// step instead of caching positions derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub center: glam::Vec2,
}

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use nocturne::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{SetupError, UnknownTheme};
    pub use crate::prefs::{JsonPrefs, MemoryPrefs, PrefStore};
    pub use crate::scene::{Scene, SceneBuilder};
    pub use crate::surface::Surface;
    pub use crate::theme::{Theme, Variant};
    pub use crate::Viewport;
}
