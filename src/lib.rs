//! SnowFX - decorative snowfall particle system
//!
//! Simulates a bounded population of 2D snow particles on a drawable
//! surface: each frame the shared wind drifts, every particle falls and
//! sways, expired or off-screen particles are removed, survivors are
//! redrawn, and the population is topped up to the configured target.
//!
//! The host supplies the two collaborators the system needs: a [`Canvas`]
//! to draw on and a [`FrameScheduler`] that fires a callback once per
//! display refresh. Everything else (presets, blizzard mode, the per-tick
//! loop) lives here.

pub mod config;
pub mod particles;
pub mod render;
pub mod scheduler;
pub mod system;

pub use config::{SnowOptions, SnowOptionsPatch, SnowPreset, SnowflakeShape};
pub use particles::Particle;
pub use render::{BufferCanvas, Canvas, DrawOp};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use system::SnowParticleSystem;
