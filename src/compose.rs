//! Per-theme frame compositing.
//!
//! Every frame the driver runs two passes around the actor draws: a
//! prepare pass that applies the theme's clearing policy, and a composite
//! pass that carries the primary surface onto the visible one with the
//! theme's post effects.
//!
//! The glow themes (`default`, `swirl`) redraw the primary surface from
//! scratch each frame and stack two brightened blurred copies plus a
//! sharp copy additively. `pipeline` never clears the primary surface, so
//! pipe strokes accumulate into trails; its copies are source-over so the
//! trails darken into the background instead of blooming. `aurora` uses a
//! single wide additive blur.

use crate::surface::{Blend, Filter, Surface};
use crate::theme::{Theme, Variant};

/// Apply the theme's clearing policy before any actor draws.
pub fn prepare(theme: &Theme, primary: &mut Surface, visible: &mut Surface) {
    match theme.variant {
        Variant::Pipeline { .. } => {
            // Trails: leave the primary surface untouched.
        }
        _ => {
            primary.clear();
            visible.fill(theme.background);
        }
    }
}

/// Carry the primary surface onto the visible one.
pub fn composite(theme: &Theme, primary: &Surface, visible: &mut Surface) {
    match theme.variant {
        Variant::Halo | Variant::Swirl { .. } => {
            visible.blit(primary, Blend::Additive, Some(Filter::blur(8.0).brightness(2.0)));
            visible.blit(primary, Blend::Additive, Some(Filter::blur(4.0).brightness(2.0)));
            visible.blit(primary, Blend::Additive, None);
        }
        Variant::Pipeline { .. } => {
            visible.fill(theme.background);
            visible.blit(primary, Blend::Over, Some(Filter::blur(12.0)));
            visible.blit(primary, Blend::Over, None);
        }
        Variant::Aurora { .. } => {
            visible.blit(primary, Blend::Additive, Some(Filter::blur(12.0)));
        }
    }
}
