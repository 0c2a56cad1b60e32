//! Theme registry.
//!
//! A theme is an immutable parameter set describing one of the four
//! built-in backdrop behaviors. The registry is fixed at compile time and
//! read-only; looking up a name that is not registered fails with
//! [`UnknownTheme`] so callers can decide between falling back to the
//! default theme (at load) and rejecting the request (at an explicit
//! switch).
//!
//! # Example
//!
//! ```ignore
//! let theme = Theme::lookup("swirl")?;
//! assert_eq!(theme.actor_count, 700);
//! ```

use std::f32::consts::TAU;

use crate::color::Hsla;
use crate::error::UnknownTheme;

/// A `base + [0, range)` sampling interval for one actor field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub base: f32,
    pub range: f32,
}

impl Span {
    pub const fn new(base: f32, range: f32) -> Self {
        Self { base, range }
    }

    /// Draw a uniform sample in `[base, base + range)`.
    #[inline]
    pub fn sample(&self, rng: &mut impl rand::Rng) -> f32 {
        self.base + rng.gen::<f32>() * self.range
    }

    /// Whether `v` lies inside the sampling interval.
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.base && v < self.base + self.range
    }
}

/// The closed set of backdrop behaviors, with the parameters that only
/// exist for that behavior.
///
/// One spawn/step/draw rule is implemented per variant; the frame driver
/// selects it once per frame rather than re-branching per field access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant {
    /// Square particles orbiting the viewport center (the `default` theme).
    Halo,
    /// Noise-steered ribbons drifting from a horizontal band.
    Swirl {
        /// Vertical spawn band half-height around the center line.
        range_y: f32,
        /// Multiplier turning a noise sample into whole turns of heading.
        noise_steps: f32,
        x_off: f32,
        y_off: f32,
        z_off: f32,
    },
    /// Grid-turning pipes that accumulate trails.
    Pipeline {
        /// Number of discrete headings; the turn increment is `360° / turn_count`.
        turn_count: u32,
        /// Upper bound for the per-step random turn modulus.
        turn_chance_range: f32,
    },
    /// Horizontally drifting vertical light rays.
    Aurora {
        /// Ray length interval.
        length: Span,
        /// Scale of the noise shift applied to ray anchors.
        noise_strength: f32,
        x_off: f32,
        y_off: f32,
        z_off: f32,
    },
}

impl Variant {
    /// Whether this variant samples the shared noise field.
    pub fn needs_noise(&self) -> bool {
        matches!(self, Variant::Swirl { .. } | Variant::Aurora { .. })
    }
}

/// Immutable configuration for one registered theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Registry name, as used in the preference store.
    pub name: &'static str,
    pub variant: Variant,
    /// Number of live actors while this theme is active.
    pub actor_count: usize,
    /// `f32` fields per actor record; must match the variant's record type.
    pub record_fields: usize,
    /// Lifetime in frames.
    pub ttl: Span,
    /// Per-frame speed multiplier.
    pub speed: Span,
    /// Size, stroke radius, or ray width depending on variant.
    pub size: Span,
    /// Hue interval in degrees.
    pub hue: Span,
    pub background: Hsla,
}

impl Theme {
    /// Flat pool length for this theme: `actor_count * record_fields`.
    #[inline]
    pub fn pool_len(&self) -> usize {
        self.actor_count * self.record_fields
    }

    /// Pipeline turn increment in radians (`360° / turn_count`), derived
    /// once from the descriptor. `None` for non-pipeline variants.
    pub fn turn_angle(&self) -> Option<f32> {
        match self.variant {
            Variant::Pipeline { turn_count, .. } => Some(TAU / turn_count as f32),
            _ => None,
        }
    }

    /// Resolve a registered theme by name.
    pub fn lookup(name: &str) -> Result<&'static Theme, UnknownTheme> {
        REGISTRY
            .iter()
            .copied()
            .find(|t| t.name == name)
            .ok_or_else(|| UnknownTheme::new(name))
    }

    /// The theme used when no valid preference is stored.
    pub fn fallback() -> &'static Theme {
        &HALO
    }

    /// Registered theme names, in registry order.
    pub fn names() -> [&'static str; 4] {
        [HALO.name, SWIRL.name, PIPELINE.name, AURORA.name]
    }
}

static HALO: Theme = Theme {
    name: "default",
    variant: Variant::Halo,
    actor_count: 700,
    record_fields: 9,
    ttl: Span::new(100.0, 500.0),
    speed: Span::new(0.1, 1.0),
    size: Span::new(2.0, 10.0),
    hue: Span::new(10.0, 100.0),
    background: Hsla::new(60.0, 0.5, 0.03, 1.0),
};

static SWIRL: Theme = Theme {
    name: "swirl",
    variant: Variant::Swirl {
        range_y: 100.0,
        noise_steps: 8.0,
        x_off: 0.00125,
        y_off: 0.00125,
        z_off: 0.0005,
    },
    actor_count: 700,
    record_fields: 9,
    ttl: Span::new(50.0, 150.0),
    speed: Span::new(0.1, 2.0),
    size: Span::new(1.0, 4.0),
    hue: Span::new(220.0, 100.0),
    background: Hsla::new(260.0, 0.4, 0.05, 1.0),
};

static PIPELINE: Theme = Theme {
    name: "pipeline",
    variant: Variant::Pipeline {
        turn_count: 8,
        turn_chance_range: 58.0,
    },
    actor_count: 30,
    record_fields: 8,
    ttl: Span::new(100.0, 300.0),
    speed: Span::new(0.5, 1.0),
    size: Span::new(2.0, 4.0),
    hue: Span::new(180.0, 60.0),
    background: Hsla::new(150.0, 0.8, 0.01, 1.0),
};

static AURORA: Theme = Theme {
    name: "aurora",
    variant: Variant::Aurora {
        length: Span::new(200.0, 200.0),
        noise_strength: 100.0,
        x_off: 0.0015,
        y_off: 0.0015,
        z_off: 0.0015,
    },
    actor_count: 500,
    record_fields: 8,
    ttl: Span::new(50.0, 100.0),
    speed: Span::new(0.05, 0.1),
    size: Span::new(10.0, 20.0),
    hue: Span::new(120.0, 60.0),
    background: Hsla::new(220.0, 0.6, 0.03, 1.0),
};

static REGISTRY: [&Theme; 4] = [&HALO, &SWIRL, &PIPELINE, &AURORA];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_lookup_all_registered() {
        for name in Theme::names() {
            let theme = Theme::lookup(name).unwrap();
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let err = Theme::lookup("nebula").unwrap_err();
        assert_eq!(err.name, "nebula");
    }

    #[test]
    fn test_fallback_is_default() {
        assert_eq!(Theme::fallback().name, "default");
        assert_eq!(Theme::fallback().variant, Variant::Halo);
    }

    #[test]
    fn test_pool_lengths() {
        assert_eq!(Theme::lookup("default").unwrap().pool_len(), 700 * 9);
        assert_eq!(Theme::lookup("swirl").unwrap().pool_len(), 700 * 9);
        assert_eq!(Theme::lookup("pipeline").unwrap().pool_len(), 30 * 8);
        assert_eq!(Theme::lookup("aurora").unwrap().pool_len(), 500 * 8);
    }

    #[test]
    fn test_turn_angle_derived() {
        let pipeline = Theme::lookup("pipeline").unwrap();
        let angle = pipeline.turn_angle().unwrap();
        assert!((angle - TAU / 8.0).abs() < 1e-6);
        assert_eq!(Theme::lookup("default").unwrap().turn_angle(), None);
    }

    #[test]
    fn test_span_sampling_stays_in_bounds() {
        let span = Span::new(100.0, 500.0);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = span.sample(&mut rng);
            assert!(span.contains(v), "{} outside [100, 600)", v);
        }
    }

    #[test]
    fn test_noise_requirements() {
        assert!(!Theme::lookup("default").unwrap().variant.needs_noise());
        assert!(Theme::lookup("swirl").unwrap().variant.needs_noise());
        assert!(!Theme::lookup("pipeline").unwrap().variant.needs_noise());
        assert!(Theme::lookup("aurora").unwrap().variant.needs_noise());
    }
}
