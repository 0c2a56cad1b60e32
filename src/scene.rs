//! The simulation scene: explicit context object and frame driver.
//!
//! A [`Scene`] owns everything one backdrop needs: active theme, actor
//! pool, surface pair, tick counter, RNG, the lazily-built noise source,
//! and the preference store. Nothing is global: tests construct as many
//! independent scenes as they like and step them deterministically.
//!
//! The frame driver is [`Scene::step_frame`]; the host (window loop,
//! test, bench) decides when frames happen.
//!
//! # Example
//!
//! ```ignore
//! let mut scene = Scene::builder(1280, 720)
//!     .with_prefs(JsonPrefs::open(path))
//!     .build()?;
//! loop {
//!     scene.step_frame();
//!     present(scene.visible());
//! }
//! ```

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::behavior;
use crate::compose;
use crate::error::UnknownTheme;
use crate::flow::FlowNoise;
use crate::pool::ActorPool;
use crate::prefs::{MemoryPrefs, PrefStore, THEME_KEY};
use crate::surface::Surface;
use crate::theme::Theme;
use crate::Viewport;

/// Configures and constructs a [`Scene`].
pub struct SceneBuilder {
    width: u32,
    height: u32,
    prefs: Option<Box<dyn PrefStore>>,
    theme_override: Option<String>,
    seed: Option<u64>,
}

impl SceneBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            prefs: None,
            theme_override: None,
            seed: None,
        }
    }

    /// Use this preference store instead of a fresh in-memory one.
    pub fn with_prefs(mut self, prefs: impl PrefStore + 'static) -> Self {
        self.prefs = Some(Box::new(prefs));
        self
    }

    /// Start on a specific theme for this run, ignoring (and not
    /// overwriting) the stored preference. Unknown names fail `build`.
    pub fn with_theme(mut self, name: &str) -> Self {
        self.theme_override = Some(name.to_string());
        self
    }

    /// Seed the RNG for deterministic stepping.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Scene, UnknownTheme> {
        let prefs = self
            .prefs
            .unwrap_or_else(|| Box::new(MemoryPrefs::new()) as Box<dyn PrefStore>);

        let theme = if let Some(name) = &self.theme_override {
            Theme::lookup(name)?
        } else {
            match prefs.get(THEME_KEY) {
                Some(stored) => match Theme::lookup(&stored) {
                    Ok(theme) => theme,
                    Err(_) => {
                        // Stale preference; starting up still has to work.
                        tracing::warn!(%stored, "stored theme unknown, using default");
                        Theme::fallback()
                    }
                },
                None => Theme::fallback(),
            }
        };

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let viewport = Viewport::new(self.width, self.height);

        let noise = if theme.variant.needs_noise() {
            Some(FlowNoise::new(rng.gen()))
        } else {
            None
        };

        let tick = 0;
        let pool = behavior::allocate_pool(theme, viewport, tick, noise.as_ref(), &mut rng);
        tracing::info!(
            theme = theme.name,
            actors = theme.actor_count,
            width = self.width,
            height = self.height,
            "scene ready"
        );

        Ok(Scene {
            theme,
            viewport,
            pool,
            primary: Surface::new(self.width, self.height),
            visible: Surface::new(self.width, self.height),
            tick,
            rng,
            noise,
            prefs,
        })
    }
}

/// One running backdrop simulation.
pub struct Scene {
    theme: &'static Theme,
    viewport: Viewport,
    pool: ActorPool,
    primary: Surface,
    visible: Surface,
    tick: u64,
    rng: SmallRng,
    noise: Option<FlowNoise>,
    prefs: Box<dyn PrefStore>,
}

impl Scene {
    pub fn builder(width: u32, height: u32) -> SceneBuilder {
        SceneBuilder::new(width, height)
    }

    /// Advance the simulation by one frame and composite the result.
    pub fn step_frame(&mut self) {
        self.tick += 1;
        let theme = self.theme;
        compose::prepare(theme, &mut self.primary, &mut self.visible);
        behavior::step_all(
            theme,
            &mut self.pool,
            self.viewport,
            self.tick,
            self.noise.as_ref(),
            &mut self.rng,
            &mut self.primary,
        );
        compose::composite(theme, &self.primary, &mut self.visible);
    }

    /// React to a viewport change. Surfaces are resized (contents
    /// invalidated) and the cached center moves; the pool is deliberately
    /// left alone; actors that end up outside the new bounds recycle
    /// through their normal rules.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.primary.resize(width, height);
        self.visible.resize(width, height);
        tracing::debug!(width, height, "scene resized");
    }

    /// Switch to a registered theme.
    ///
    /// Clears both surfaces, builds the shared noise source if the new
    /// theme is the first to need it, reallocates the pool for the new
    /// record layout, and persists the choice. Switching to the active
    /// theme is not a no-op: the pool is still fully reinitialized.
    /// An unknown name is rejected and the running scene is untouched.
    pub fn switch_theme(&mut self, name: &str) -> Result<(), UnknownTheme> {
        let theme = Theme::lookup(name)?;
        self.primary.clear();
        self.visible.clear();
        if theme.variant.needs_noise() && self.noise.is_none() {
            let seed = self.rng.gen();
            tracing::debug!(seed, "noise source constructed");
            self.noise = Some(FlowNoise::new(seed));
        }
        self.pool =
            behavior::allocate_pool(theme, self.viewport, self.tick, self.noise.as_ref(), &mut self.rng);
        self.theme = theme;
        self.prefs.set(THEME_KEY, name);
        tracing::info!(theme = name, "theme switched");
        Ok(())
    }

    /// The active theme descriptor.
    #[inline]
    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    /// Frames advanced since the scene was built. Monotonic; theme
    /// switches do not reset it.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The actor pool, for inspection.
    #[inline]
    pub fn pool(&self) -> &ActorPool {
        &self.pool
    }

    /// Seed of the shared noise source, if it has been constructed.
    pub fn noise_seed(&self) -> Option<u32> {
        self.noise.as_ref().map(|n| n.seed())
    }

    /// The composited output surface.
    #[inline]
    pub fn visible(&self) -> &Surface {
        &self.visible
    }

    /// Export the composited output as RGBA8.
    pub fn visible_rgba8(&self, out: &mut Vec<u8>) {
        self.visible.to_rgba8(out);
    }

    /// Write the composited output as a PNG snapshot.
    pub fn write_snapshot(&self, path: &std::path::Path) -> image::ImageResult<()> {
        self.visible.write_png(path)
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("theme", &self.theme.name)
            .field("tick", &self.tick)
            .field("actors", &self.pool.count())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Viewport {
    /// Viewport for a given pixel size, with the derived center point.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            center: Vec2::new(0.5 * width as f32, 0.5 * height as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_prefs_uses_default() {
        let scene = Scene::builder(320, 240).with_seed(1).build().unwrap();
        assert_eq!(scene.theme().name, "default");
        assert_eq!(scene.tick(), 0);
        assert_eq!(scene.pool().flat_len(), 6300);
        assert_eq!(scene.noise_seed(), None);
    }

    #[test]
    fn test_builder_rejects_unknown_override() {
        let err = Scene::builder(320, 240).with_theme("plasma").build().unwrap_err();
        assert_eq!(err.name, "plasma");
    }

    #[test]
    fn test_step_advances_tick() {
        let mut scene = Scene::builder(160, 120).with_seed(2).build().unwrap();
        scene.step_frame();
        scene.step_frame();
        assert_eq!(scene.tick(), 2);
    }

    #[test]
    fn test_tick_survives_theme_switch() {
        let mut scene = Scene::builder(160, 120).with_seed(3).build().unwrap();
        for _ in 0..5 {
            scene.step_frame();
        }
        scene.switch_theme("pipeline").unwrap();
        assert_eq!(scene.tick(), 5);
    }

    #[test]
    fn test_viewport_center() {
        let view = Viewport::new(640, 480);
        assert_eq!(view.center, Vec2::new(320.0, 240.0));
    }
}
