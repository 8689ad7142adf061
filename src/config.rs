//! Configuration for the snowfall system
//!
//! `SnowOptions` is the full active parameter set, `SnowOptionsPatch` is a
//! partial update that shallow-merges into it, and `SnowPreset` supplies
//! the three named configurations.

use serde::{Deserialize, Serialize};

// ============================================================================
// Shapes
// ============================================================================

/// Rendering style of one snowflake.
///
/// Marked non-exhaustive so the renderer keeps a fallback arm; variants
/// added later render as plain discs until given their own drawing code.
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum SnowflakeShape {
    Circle,
    Flake,
}

// ============================================================================
// Blizzard floors
// ============================================================================

// Minimums enforced when blizzard mode is switched on. Values already above
// a floor are left alone.
pub const BLIZZARD_MIN_PARTICLES: usize = 250;
pub const BLIZZARD_MIN_GRAVITY: f32 = 0.15;
pub const BLIZZARD_MIN_WIND: f32 = 0.2;
pub const BLIZZARD_MIN_SPEED: f32 = 1.5;

// ============================================================================
// Options
// ============================================================================

/// Active simulation parameters.
///
/// Precondition: `colors` and `shapes` must be non-empty while particles
/// are being spawned — spawning draws a uniform random element from each
/// and does not defend against an empty set.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct SnowOptions {
    /// Maximum number of simultaneously live particles.
    pub particle_count: usize,
    /// Seeds initial downward velocity; no continuous acceleration.
    pub gravity: f32,
    /// Wind baseline; the wind scalar random-walks within ±this
    /// (doubled in blizzard mode).
    pub wind: f32,
    /// Lifetime baseline; every spawn draws uniform in [5, lifetime + 5).
    pub lifetime: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Speed baseline, also the horizontal velocity clamp.
    pub speed: f32,
    /// Spawn palette, RGB.
    pub colors: Vec<[u8; 3]>,
    /// Shape variants enabled for spawning.
    pub shapes: Vec<SnowflakeShape>,
    pub blizzard_mode: bool,
}

impl Default for SnowOptions {
    fn default() -> Self {
        Self {
            particle_count: 150,
            gravity: 0.1,
            wind: 0.05,
            lifetime: 8.0,
            min_size: 1.0,
            max_size: 5.0,
            speed: 1.0,
            colors: vec![[255, 255, 255], [240, 240, 240], [232, 232, 232]],
            shapes: vec![SnowflakeShape::Circle, SnowflakeShape::Flake],
            blizzard_mode: false,
        }
    }
}

impl SnowOptions {
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let options = serde_json::from_str(&json)?;
        Ok(options)
    }
}

/// Partial options update. Unset fields keep their current value.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct SnowOptionsPatch {
    pub particle_count: Option<usize>,
    pub gravity: Option<f32>,
    pub wind: Option<f32>,
    pub lifetime: Option<f32>,
    pub min_size: Option<f32>,
    pub max_size: Option<f32>,
    pub speed: Option<f32>,
    pub colors: Option<Vec<[u8; 3]>>,
    pub shapes: Option<Vec<SnowflakeShape>>,
    pub blizzard_mode: Option<bool>,
}

impl SnowOptionsPatch {
    /// Shallow-merge the set fields into `options`.
    pub fn apply_to(self, options: &mut SnowOptions) {
        if let Some(v) = self.particle_count {
            options.particle_count = v;
        }
        if let Some(v) = self.gravity {
            options.gravity = v;
        }
        if let Some(v) = self.wind {
            options.wind = v;
        }
        if let Some(v) = self.lifetime {
            options.lifetime = v;
        }
        if let Some(v) = self.min_size {
            options.min_size = v;
        }
        if let Some(v) = self.max_size {
            options.max_size = v;
        }
        if let Some(v) = self.speed {
            options.speed = v;
        }
        if let Some(v) = self.colors {
            options.colors = v;
        }
        if let Some(v) = self.shapes {
            options.shapes = v;
        }
        if let Some(v) = self.blizzard_mode {
            options.blizzard_mode = v;
        }
    }
}

// ============================================================================
// Presets
// ============================================================================

/// Named snowfall configurations. Applying one replaces the options
/// wholesale; only `Blizzard` carries the blizzard flag.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum SnowPreset {
    Light,
    Regular,
    Blizzard,
}

impl SnowPreset {
    pub fn all() -> [SnowPreset; 3] {
        [Self::Light, Self::Regular, Self::Blizzard]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Blizzard => "blizzard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Self::Light),
            "regular" => Some(Self::Regular),
            "blizzard" => Some(Self::Blizzard),
            _ => None,
        }
    }

    pub fn options(&self) -> SnowOptions {
        match self {
            Self::Light => SnowOptions {
                particle_count: 100,
                gravity: 0.05,
                wind: 0.02,
                lifetime: 10.0,
                min_size: 1.0,
                max_size: 3.0,
                speed: 0.7,
                colors: vec![[255, 255, 255], [240, 240, 240], [232, 232, 232]],
                shapes: vec![SnowflakeShape::Circle],
                blizzard_mode: false,
            },
            Self::Regular => SnowOptions::default(),
            Self::Blizzard => SnowOptions {
                particle_count: 300,
                gravity: 0.15,
                wind: 0.2,
                lifetime: 5.0,
                min_size: 1.0,
                max_size: 4.0,
                speed: 2.0,
                colors: vec![[255, 255, 255], [240, 240, 240]],
                shapes: vec![SnowflakeShape::Circle, SnowflakeShape::Flake],
                blizzard_mode: true,
            },
        }
    }
}
