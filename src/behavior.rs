//! Per-variant actor behavior.
//!
//! Each theme variant contributes three rules: a spawn rule (fill one
//! record with freshly sampled state), a step rule (advance one record by
//! one frame and decide recycling), and a draw rule (emit one stroke onto
//! the primary surface). The frame driver picks the variant's `step_*`
//! loop once per frame; nothing re-branches on the variant inside the
//! per-actor hot path.
//!
//! Recycling is the only way an actor ends: the expired record is
//! re-spawned in place, so pool length never changes while a theme is
//! active.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::color::Hsla;
use crate::flow::FlowNoise;
use crate::math::{fade_in_out, heading, lerp, spread};
use crate::pool::{ActorPool, HaloRecord, PipeRecord, RayRecord, SwirlRecord};
use crate::surface::Surface;
use crate::theme::{Theme, Variant};
use crate::Viewport;

/// Allocate and populate a fresh pool for `theme`.
///
/// `noise` must be present when the variant needs it; the scene
/// constructs the shared source before allocating.
pub fn allocate_pool(
    theme: &Theme,
    view: Viewport,
    tick: u64,
    noise: Option<&FlowNoise>,
    rng: &mut SmallRng,
) -> ActorPool {
    let mut pool = ActorPool::new(theme.actor_count, theme.record_fields);
    match theme.variant {
        Variant::Halo => {
            for i in 0..pool.count() {
                let rec = spawn_halo(theme, view, rng);
                pool.set_record(i, rec);
            }
        }
        Variant::Swirl { .. } => {
            for i in 0..pool.count() {
                let rec = spawn_swirl(theme, view, rng);
                pool.set_record(i, rec);
            }
        }
        Variant::Pipeline { .. } => {
            for i in 0..pool.count() {
                let rec = spawn_pipe(theme, view, rng);
                pool.set_record(i, rec);
            }
        }
        Variant::Aurora { .. } => {
            let noise = noise.expect("aurora requires the shared noise source");
            for i in 0..pool.count() {
                let rec = spawn_ray(theme, view, tick, noise, rng);
                pool.set_record(i, rec);
            }
        }
    }
    pool
}

/// Step every actor of the active theme by one frame, drawing onto
/// `target`.
pub fn step_all(
    theme: &Theme,
    pool: &mut ActorPool,
    view: Viewport,
    tick: u64,
    noise: Option<&FlowNoise>,
    rng: &mut SmallRng,
    target: &mut Surface,
) {
    match theme.variant {
        Variant::Halo => step_halos(theme, pool, view, rng, target),
        Variant::Swirl { .. } => {
            let noise = noise.expect("swirl requires the shared noise source");
            step_swirls(theme, pool, view, tick, noise, rng, target);
        }
        Variant::Pipeline { .. } => step_pipes(theme, pool, view, tick, rng, target),
        Variant::Aurora { .. } => {
            let noise = noise.expect("aurora requires the shared noise source");
            step_rays(theme, pool, view, tick, noise, rng, target);
        }
    }
}

// =============================================================================
// HALO (the `default` theme)
// =============================================================================

/// Fresh halo particle: anywhere in the viewport, initial velocity aimed
/// at the center.
pub fn spawn_halo(theme: &Theme, view: Viewport, rng: &mut SmallRng) -> HaloRecord {
    let x = rng.gen::<f32>() * view.width;
    let y = rng.gen::<f32>() * view.height;
    let theta = heading(Vec2::new(x, y), view.center);
    HaloRecord {
        x,
        y,
        vx: theta.cos() * 6.0,
        vy: theta.sin() * 6.0,
        age: 0.0,
        ttl: theme.ttl.sample(rng),
        speed: theme.speed.sample(rng),
        size: theme.size.sample(rng),
        hue: theme.hue.sample(rng),
    }
}

pub fn step_halos(
    theme: &Theme,
    pool: &mut ActorPool,
    view: Viewport,
    rng: &mut SmallRng,
    target: &mut Surface,
) {
    for i in 0..pool.count() {
        let mut rec = pool.record::<HaloRecord>(i);
        // Re-aim every frame: heading to center plus a fixed bias keeps
        // particles circling instead of collapsing inward.
        let theta = heading(Vec2::new(rec.x, rec.y), view.center) + 0.75 * FRAC_PI_2;
        let vx = lerp(rec.vx, 2.0 * theta.cos(), 0.05);
        let vy = lerp(rec.vy, 2.0 * theta.sin(), 0.05);

        draw_halo(target, &rec, theta);

        rec.x += vx * rec.speed;
        rec.y += vy * rec.speed;
        rec.vx = vx;
        rec.vy = vy;
        rec.age += 1.0;

        // No bounds check: strays drift back or expire.
        if rec.age > rec.ttl {
            rec = spawn_halo(theme, view, rng);
        }
        pool.set_record(i, rec);
    }
}

fn draw_halo(target: &mut Surface, rec: &HaloRecord, theta: f32) {
    let alpha = fade_in_out(rec.age, rec.ttl);
    let color = Hsla::new(rec.hue, 1.0, 0.6, alpha).to_rgba();
    target.stroke_square(Vec2::new(rec.x, rec.y), rec.size, theta, color);
}

// =============================================================================
// SWIRL
// =============================================================================

/// Fresh swirl ribbon: spawned in a horizontal band around the center
/// line, at rest; the noise field shapes its velocity from the first step.
pub fn spawn_swirl(theme: &Theme, view: Viewport, rng: &mut SmallRng) -> SwirlRecord {
    let Variant::Swirl { range_y, .. } = theme.variant else {
        panic!("swirl spawn invoked for non-swirl theme");
    };
    SwirlRecord {
        x: rng.gen::<f32>() * view.width,
        y: view.center.y + spread(rng, range_y),
        vx: 0.0,
        vy: 0.0,
        age: 0.0,
        ttl: theme.ttl.sample(rng),
        speed: theme.speed.sample(rng),
        radius: theme.size.sample(rng),
        hue: theme.hue.sample(rng),
    }
}

pub fn step_swirls(
    theme: &Theme,
    pool: &mut ActorPool,
    view: Viewport,
    tick: u64,
    noise: &FlowNoise,
    rng: &mut SmallRng,
    target: &mut Surface,
) {
    let Variant::Swirl {
        noise_steps,
        x_off,
        y_off,
        z_off,
        ..
    } = theme.variant
    else {
        panic!("swirl step invoked for non-swirl theme");
    };
    for i in 0..pool.count() {
        let mut rec = pool.record::<SwirlRecord>(i);
        let n = noise.sample(rec.x * x_off, rec.y * y_off, tick as f32 * z_off) * noise_steps * TAU;
        let vx = lerp(rec.vx, n.cos(), 0.5);
        let vy = lerp(rec.vy, n.sin(), 0.5);
        let from = Vec2::new(rec.x, rec.y);
        let to = from + Vec2::new(vx, vy) * rec.speed;

        draw_swirl(target, &rec, from, to);

        let out_of_bounds =
            rec.x > view.width || rec.x < 0.0 || rec.y > view.height || rec.y < 0.0;
        rec.x = to.x;
        rec.y = to.y;
        rec.vx = vx;
        rec.vy = vy;
        rec.age += 1.0;

        if out_of_bounds || rec.age > rec.ttl {
            rec = spawn_swirl(theme, view, rng);
        }
        pool.set_record(i, rec);
    }
}

fn draw_swirl(target: &mut Surface, rec: &SwirlRecord, from: Vec2, to: Vec2) {
    let alpha = fade_in_out(rec.age, rec.ttl);
    let color = Hsla::new(rec.hue, 1.0, 0.6, alpha).to_rgba();
    target.stroke_segment(from, to, rec.radius, color);
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Fresh pipe head: somewhere on the center line, heading straight up or
/// straight down.
pub fn spawn_pipe(theme: &Theme, view: Viewport, rng: &mut SmallRng) -> PipeRecord {
    let direction = if rng.gen_bool(0.5) {
        FRAC_PI_2
    } else {
        TAU - FRAC_PI_2
    };
    PipeRecord {
        x: rng.gen::<f32>() * view.width,
        y: view.center.y,
        direction,
        speed: theme.speed.sample(rng),
        age: 0.0,
        ttl: theme.ttl.sample(rng),
        width: theme.size.sample(rng),
        hue: theme.hue.sample(rng),
    }
}

pub fn step_pipes(
    theme: &Theme,
    pool: &mut ActorPool,
    view: Viewport,
    tick: u64,
    rng: &mut SmallRng,
    target: &mut Surface,
) {
    let Variant::Pipeline {
        turn_count,
        turn_chance_range,
    } = theme.variant
    else {
        panic!("pipeline step invoked for non-pipeline theme");
    };
    let turn_amount = TAU / turn_count as f32;

    for i in 0..pool.count() {
        let mut rec = pool.record::<PipeRecord>(i);
        draw_pipe(target, &rec);

        rec.age += 1.0;
        rec.x += rec.direction.cos() * rec.speed;
        rec.y += rec.direction.sin() * rec.speed;

        // Occasional turn: a fresh random modulus per actor per step gates
        // on the tick, and the turn only lands on coarse grid lines. A
        // modulus of zero never fires.
        let modulus = (rng.gen::<f32>() * turn_chance_range).round() as u64;
        let on_grid = (rec.x.round() as i64).rem_euclid(6) == 0
            || (rec.y.round() as i64).rem_euclid(6) == 0;
        if modulus != 0 && tick % modulus == 0 && on_grid {
            let bias = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            rec.direction += turn_amount * bias;
        }

        // Toroidal wrap: pipes never recycle for leaving the viewport.
        if rec.x > view.width {
            rec.x = 0.0;
        }
        if rec.x < 0.0 {
            rec.x = view.width;
        }
        if rec.y > view.height {
            rec.y = 0.0;
        }
        if rec.y < 0.0 {
            rec.y = view.height;
        }

        if rec.age > rec.ttl {
            rec = spawn_pipe(theme, view, rng);
        }
        pool.set_record(i, rec);
    }
}

fn draw_pipe(target: &mut Surface, rec: &PipeRecord) {
    let alpha = fade_in_out(rec.age, rec.ttl) * 0.125;
    let color = Hsla::new(rec.hue, 0.75, 0.5, alpha).to_rgba();
    target.stroke_ring(Vec2::new(rec.x, rec.y), rec.width, color);
}

// =============================================================================
// AURORA
// =============================================================================

/// Fresh aurora ray: a vertical span hanging below the noise-shifted
/// anchor line, drifting horizontally in a direction fixed for its life.
pub fn spawn_ray(
    theme: &Theme,
    view: Viewport,
    tick: u64,
    noise: &FlowNoise,
    rng: &mut SmallRng,
) -> RayRecord {
    let Variant::Aurora {
        length,
        noise_strength,
        x_off,
        y_off,
        z_off,
    } = theme.variant
    else {
        panic!("aurora spawn invoked for non-aurora theme");
    };
    let len = length.sample(rng);
    let x = rng.gen::<f32>() * view.width;
    let mut y1 = view.center.y + noise_strength;
    let mut y2 = y1 - len;
    let n = noise.sample(x * x_off, y1 * y_off, tick as f32 * z_off) * noise_strength;
    y1 += n;
    y2 += n;
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    RayRecord {
        x,
        y1,
        y2,
        age: 0.0,
        ttl: theme.ttl.sample(rng),
        width: theme.size.sample(rng),
        speed: theme.speed.base + rng.gen::<f32>() * theme.speed.range * sign,
        hue: theme.hue.sample(rng),
    }
}

pub fn step_rays(
    theme: &Theme,
    pool: &mut ActorPool,
    view: Viewport,
    tick: u64,
    noise: &FlowNoise,
    rng: &mut SmallRng,
    target: &mut Surface,
) {
    for i in 0..pool.count() {
        let mut rec = pool.record::<RayRecord>(i);
        draw_ray(target, &rec);

        rec.x += rec.speed;
        rec.age += 1.0;

        let out_of_bounds = rec.x < 0.0 || rec.x > view.width;
        if out_of_bounds || rec.age > rec.ttl {
            rec = spawn_ray(theme, view, tick, noise, rng);
        }
        pool.set_record(i, rec);
    }
}

fn draw_ray(target: &mut Surface, rec: &RayRecord) {
    let peak = fade_in_out(rec.age, rec.ttl);
    target.stroke_gradient_ray(
        rec.x,
        rec.y1,
        rec.y2,
        rec.width,
        Hsla::new(rec.hue, 1.0, 0.65, 1.0),
        peak,
    );
}
