//! Particle data and per-tick physics
//!
//! One tick advances a particle independently of all others: wind feeds
//! the horizontal velocity, a sinusoidal term sways the fall, lifetime
//! counts down at a fixed rate. The shared wind scalar itself is a slow
//! random walk clamped to the configured baseline.

use egui::{Color32, Pos2, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::{SnowOptions, SnowflakeShape};

// Physics constants. These are part of the snowfall look and are not
// user-configurable.
pub const WIND_CHANGE_RATE: f32 = 0.02;
pub const WIND_CHANGE_INTERVAL: u32 = 100;
pub const WIND_BLIZZARD_MULTIPLIER: f32 = 2.0;
pub const WIND_INFLUENCE: f32 = 0.01;
pub const LIFETIME_DECAY: f32 = 0.02;
pub const LIFETIME_FLOOR: f32 = 5.0;
pub const ROTATION_SPEED: f32 = 0.01;
pub const WAVE_AMPLITUDE: f32 = 0.1;
pub const WAVE_FREQUENCY: f32 = 0.01;
pub const BOUNDS_MARGIN: f32 = 10.0;
pub const SPAWN_Y_OFFSET: f32 = -10.0;

/// One simulated snowflake.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Pos2,
    pub vel: Vec2,
    /// Remaining lifetime; the particle is removed once this reaches 0.
    pub lifetime: f32,
    pub size: f32,
    pub color: Color32,
    /// Radians; only meaningful for `Flake`, spins while falling.
    pub rotation: f32,
    pub shape: SnowflakeShape,
}

/// Create one particle with randomized attributes, entering from just
/// above the visible area. The caller inserts it and enforces the
/// population cap.
pub fn spawn_particle(
    width: f32,
    options: &SnowOptions,
    current_wind: f32,
    rng: &mut impl Rng,
) -> Particle {
    let shape = options.shapes[rng.gen_range(0..options.shapes.len())];
    let size = rng.gen::<f32>() * (options.max_size - options.min_size) + options.min_size;
    let [r, g, b] = options.colors[rng.gen_range(0..options.colors.len())];

    Particle {
        pos: Pos2::new(rng.gen::<f32>() * width, SPAWN_Y_OFFSET),
        vel: Vec2::new(
            (rng.gen::<f32>() - 0.5) * options.speed + current_wind,
            rng.gen::<f32>() * options.speed + options.gravity,
        ),
        lifetime: rng.gen::<f32>() * options.lifetime + LIFETIME_FLOOR,
        size,
        color: Color32::from_rgb(r, g, b),
        rotation: rng.gen::<f32>() * TAU,
        shape,
    }
}

/// Advance one particle by one tick.
pub fn step_particle(p: &mut Particle, options: &SnowOptions, current_wind: f32) {
    p.vel.x += current_wind * WIND_INFLUENCE;
    p.vel.x = p.vel.x.clamp(-options.speed, options.speed);

    // Sway while falling, on top of the wind-driven drift
    p.pos.x += (p.pos.y * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE + p.vel.x;
    p.pos.y += p.vel.y;

    if p.shape == SnowflakeShape::Flake {
        p.rotation += ROTATION_SPEED;
    }

    p.lifetime -= LIFETIME_DECAY;
}

/// Next value of the shared wind scalar: perturb by a small uniform delta,
/// then clamp back into the configured band.
pub fn wind_change(current_wind: f32, options: &SnowOptions, rng: &mut impl Rng) -> f32 {
    let wind = current_wind + (rng.gen::<f32>() - 0.5) * WIND_CHANGE_RATE;
    let max_wind = if options.blizzard_mode {
        options.wind * WIND_BLIZZARD_MULTIPLIER
    } else {
        options.wind
    };
    wind.clamp(-max_wind, max_wind)
}

/// Whether the particle has left the surface. Exiting through the top is
/// deliberately not checked: particles spawn above the surface and fall.
pub fn is_out_of_bounds(p: &Particle, width: f32, height: f32) -> bool {
    p.pos.y > height + BOUNDS_MARGIN
        || p.pos.x < -BOUNDS_MARGIN
        || p.pos.x > width + BOUNDS_MARGIN
}
