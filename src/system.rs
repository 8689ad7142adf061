//! Snow particle system
//!
//! Owns the live particle collection, the active options, the shared wind
//! state and the scheduling handle, and runs the fixed per-tick pipeline:
//! wind timer → step + cull every particle → clear → render survivors →
//! top up the population → reschedule.

use rand::RngCore;

use crate::config::{
    SnowOptions, SnowOptionsPatch, SnowPreset, BLIZZARD_MIN_GRAVITY, BLIZZARD_MIN_PARTICLES,
    BLIZZARD_MIN_SPEED, BLIZZARD_MIN_WIND,
};
use crate::particles::{self, Particle, WIND_CHANGE_INTERVAL};
use crate::render::{self, Canvas};
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Particles topped up per tick.
const SPAWN_PER_TICK: usize = 1;
/// Top-up per tick while blizzard mode is active.
const BLIZZARD_SPAWN_PER_TICK: usize = 3;

/// Snowfall simulation over a host-provided surface and frame scheduler.
///
/// Two states: stopped and running. While running, every delivered frame
/// performs one tick and schedules the next one; `stop` cancels the
/// pending frame and clears the particles. All access is expected from a
/// single thread; the host serializes `on_frame` against the mutators.
pub struct SnowParticleSystem<C: Canvas, S: FrameScheduler> {
    canvas: C,
    scheduler: S,
    options: SnowOptions,
    particles: Vec<Particle>,
    current_wind: f32,
    wind_timer: u32,
    pending_frame: Option<FrameHandle>,
    running: bool,
    rng: Box<dyn RngCore>,
}

impl<C: Canvas, S: FrameScheduler> SnowParticleSystem<C, S> {
    pub fn new(canvas: C, scheduler: S) -> Self {
        Self::with_rng(
            canvas,
            scheduler,
            SnowOptionsPatch::default(),
            Box::new(rand::thread_rng()),
        )
    }

    pub fn with_options(canvas: C, scheduler: S, options: SnowOptionsPatch) -> Self {
        Self::with_rng(canvas, scheduler, options, Box::new(rand::thread_rng()))
    }

    /// Construct with an explicit random source, for deterministic runs.
    pub fn with_rng(
        canvas: C,
        scheduler: S,
        options: SnowOptionsPatch,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let mut merged = SnowOptions::default();
        options.apply_to(&mut merged);
        Self {
            canvas,
            scheduler,
            options: merged,
            particles: Vec::new(),
            current_wind: 0.0,
            wind_timer: 0,
            pending_frame: None,
            running: false,
            rng,
        }
    }

    /// Shallow-merge new option values; they apply from the next tick and
    /// never retroactively alter already-live particles.
    pub fn set_options(&mut self, options: SnowOptionsPatch) {
        options.apply_to(&mut self.options);
    }

    /// Replace the options with a named preset and force the blizzard
    /// flag to match it. Unknown names warn and change nothing.
    pub fn use_preset(&mut self, name: &str) {
        let Some(preset) = SnowPreset::from_name(name) else {
            let valid: Vec<&str> = SnowPreset::all().iter().map(|p| p.name()).collect();
            log::warn!("unknown snow preset {name:?}; available: {}", valid.join(", "));
            return;
        };
        self.options = preset.options();
        self.set_blizzard_mode(preset == SnowPreset::Blizzard);
    }

    /// Toggle blizzard mode. Floors for population, gravity, wind and
    /// speed are raised only on the false→true transition; the incoming
    /// flag is compared against the current one before it is overwritten.
    pub fn set_blizzard_mode(&mut self, enabled: bool) {
        let turning_on = enabled && !self.options.blizzard_mode;
        self.options.blizzard_mode = enabled;

        if turning_on {
            let o = &mut self.options;
            o.particle_count = o.particle_count.max(BLIZZARD_MIN_PARTICLES);
            o.gravity = o.gravity.max(BLIZZARD_MIN_GRAVITY);
            o.wind = o.wind.max(BLIZZARD_MIN_WIND);
            o.speed = o.speed.max(BLIZZARD_MIN_SPEED);
        }
    }

    /// Begin running. A system that is already running is stopped first,
    /// so a restart never carries particles over from the previous run.
    pub fn start(&mut self) {
        if self.running {
            self.stop();
        }
        self.running = true;
        self.pending_frame = Some(self.scheduler.schedule());
    }

    /// Cancel the pending frame and drop every particle. Wind state is
    /// preserved; only `reset` clears it.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel(handle);
        }
        self.running = false;
        self.particles.clear();
    }

    /// Drop every particle and zero the wind scalar and its timer,
    /// without touching the running state or scheduling.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.current_wind = 0.0;
        self.wind_timer = 0;
    }

    /// Deliver one scheduled frame. Frames that were cancelled or belong
    /// to a previous run are ignored, so a scheduler that fires after
    /// `stop` cannot resurrect the loop.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        if !self.running || self.pending_frame != Some(handle) {
            return;
        }
        self.pending_frame = None;
        self.tick();
        if self.running {
            self.pending_frame = Some(self.scheduler.schedule());
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn options(&self) -> &SnowOptions {
        &self.options
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn current_wind(&self) -> f32 {
        self.current_wind
    }

    /// The frame the system is waiting on, if any. Hosts route their
    /// scheduler callback back through `on_frame` with this handle.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// One full simulation tick. Every particle is stepped and culled
    /// before anything is drawn, and new particles are spawned only after
    /// drawing, so removals are never rendered and fresh spawns first
    /// appear on the following tick.
    fn tick(&mut self) {
        self.wind_timer += 1;
        if self.wind_timer > WIND_CHANGE_INTERVAL {
            self.wind_timer = 0;
            self.current_wind =
                particles::wind_change(self.current_wind, &self.options, &mut self.rng);
        }

        let width = self.canvas.width();
        let height = self.canvas.height();

        for p in &mut self.particles {
            particles::step_particle(p, &self.options, self.current_wind);
        }
        self.particles
            .retain(|p| p.lifetime > 0.0 && !particles::is_out_of_bounds(p, width, height));

        self.canvas.clear();
        for p in &self.particles {
            render::draw_particle(&mut self.canvas, p);
        }

        let top_up = if self.options.blizzard_mode {
            BLIZZARD_SPAWN_PER_TICK
        } else {
            SPAWN_PER_TICK
        };
        for _ in 0..top_up {
            if self.particles.len() >= self.options.particle_count {
                break;
            }
            let p = particles::spawn_particle(width, &self.options, self.current_wind, &mut self.rng);
            self.particles.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnowflakeShape;
    use crate::render::BufferCanvas;
    use crate::scheduler::ManualScheduler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestSystem = SnowParticleSystem<BufferCanvas, ManualScheduler>;

    fn system_with(options: SnowOptionsPatch, seed: u64) -> TestSystem {
        SnowParticleSystem::with_rng(
            BufferCanvas::new(800.0, 600.0),
            ManualScheduler::new(),
            options,
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn pump(sys: &mut TestSystem, ticks: usize) {
        for _ in 0..ticks {
            let handle = sys.pending_frame().expect("a frame should be scheduled");
            sys.on_frame(handle);
        }
    }

    #[test]
    fn starts_stopped_and_empty() {
        let sys = system_with(SnowOptionsPatch::default(), 1);
        assert!(!sys.is_running());
        assert_eq!(sys.particle_count(), 0);
        assert_eq!(sys.pending_frame(), None);
    }

    #[test]
    fn first_tick_spawns_one_particle() {
        let mut sys = system_with(SnowOptionsPatch::default(), 2);
        sys.start();
        assert!(sys.is_running());
        pump(&mut sys, 1);
        assert_eq!(sys.particle_count(), 1);
    }

    #[test]
    fn blizzard_tops_up_three_per_tick() {
        let patch = SnowOptionsPatch {
            blizzard_mode: Some(true),
            ..Default::default()
        };
        let mut sys = system_with(patch, 3);
        sys.start();
        pump(&mut sys, 2);
        assert_eq!(sys.particle_count(), 6);
    }

    #[test]
    fn population_never_exceeds_target() {
        let patch = SnowOptionsPatch {
            particle_count: Some(10),
            ..Default::default()
        };
        let mut sys = system_with(patch, 4);
        sys.start();
        for _ in 0..50 {
            pump(&mut sys, 1);
            assert!(sys.particle_count() <= 10);
        }
        assert_eq!(sys.particle_count(), 10);
    }

    #[test]
    fn default_run_settles_at_or_under_target() {
        let mut sys = system_with(SnowOptionsPatch::default(), 5);
        sys.start();
        for _ in 0..301 {
            pump(&mut sys, 1);
            assert!(sys.particle_count() <= 150);
        }
    }

    #[test]
    fn stop_clears_particles_and_cancels_the_frame() {
        let mut sys = system_with(SnowOptionsPatch::default(), 6);
        sys.start();
        pump(&mut sys, 5);
        assert!(sys.particle_count() > 0);

        let stale = sys.pending_frame().unwrap();
        sys.stop();
        assert!(!sys.is_running());
        assert_eq!(sys.particle_count(), 0);
        assert_eq!(sys.pending_frame(), None);

        // A frame already queued with the scheduler must not tick
        sys.on_frame(stale);
        assert!(!sys.is_running());
        assert_eq!(sys.particle_count(), 0);
        assert_eq!(sys.pending_frame(), None);
    }

    #[test]
    fn stale_frame_from_current_run_is_ignored() {
        let mut sys = system_with(SnowOptionsPatch::default(), 7);
        sys.start();
        let first = sys.pending_frame().unwrap();
        pump(&mut sys, 1);
        let second = sys.pending_frame().unwrap();
        assert_ne!(first, second);

        sys.on_frame(first);
        assert_eq!(sys.particle_count(), 1);
        assert_eq!(sys.pending_frame(), Some(second));
    }

    #[test]
    fn restart_does_not_accumulate_particles() {
        let mut sys = system_with(SnowOptionsPatch::default(), 8);
        sys.start();
        pump(&mut sys, 10);
        assert_eq!(sys.particle_count(), 10);

        sys.start();
        assert!(sys.is_running());
        assert_eq!(sys.particle_count(), 0);
        pump(&mut sys, 1);
        assert_eq!(sys.particle_count(), 1);
    }

    #[test]
    fn reset_zeroes_wind_and_keeps_running() {
        let mut sys = system_with(SnowOptionsPatch::default(), 9);
        sys.start();
        // Three wind perturbations have fired by now
        pump(&mut sys, 350);
        assert!(sys.current_wind() != 0.0);

        sys.reset();
        assert_eq!(sys.particle_count(), 0);
        assert_eq!(sys.current_wind(), 0.0);
        assert!(sys.is_running());
        assert!(sys.pending_frame().is_some());
    }

    #[test]
    fn stop_preserves_wind_state() {
        let mut sys = system_with(SnowOptionsPatch::default(), 10);
        sys.start();
        pump(&mut sys, 350);
        let wind = sys.current_wind();
        assert!(wind != 0.0);

        sys.stop();
        assert_eq!(sys.current_wind(), wind);
    }

    #[test]
    fn preset_blizzard_sets_flag_and_population() {
        let mut sys = system_with(SnowOptionsPatch::default(), 11);
        sys.use_preset("blizzard");
        assert!(sys.options().blizzard_mode);
        assert!(sys.options().particle_count >= 300);

        sys.use_preset("light");
        assert!(!sys.options().blizzard_mode);
        assert_eq!(sys.options().particle_count, 100);
    }

    #[test]
    fn unknown_preset_is_a_noop() {
        let mut sys = system_with(SnowOptionsPatch::default(), 12);
        sys.start();
        pump(&mut sys, 3);
        let before = sys.options().clone();
        let count = sys.particle_count();

        sys.use_preset("hailstorm");
        assert_eq!(sys.options(), &before);
        assert_eq!(sys.particle_count(), count);
        assert!(sys.is_running());
    }

    #[test]
    fn enabling_blizzard_raises_floors_from_light_base() {
        let mut sys = system_with(SnowOptionsPatch::default(), 13);
        sys.use_preset("light");
        assert_eq!(sys.options().particle_count, 100);

        sys.set_blizzard_mode(true);
        let o = sys.options();
        assert!(o.blizzard_mode);
        assert_eq!(o.particle_count, 250);
        assert!((o.gravity - 0.15).abs() < f32::EPSILON);
        assert!((o.wind - 0.2).abs() < f32::EPSILON);
        assert!((o.speed - 1.5).abs() < f32::EPSILON);
        // Fields without a floor stay at the preset values
        assert!((o.max_size - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn floors_do_not_lower_values_already_above() {
        let patch = SnowOptionsPatch {
            particle_count: Some(400),
            gravity: Some(0.5),
            ..Default::default()
        };
        let mut sys = system_with(patch, 14);
        sys.set_blizzard_mode(true);
        assert_eq!(sys.options().particle_count, 400);
        assert!((sys.options().gravity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn reenabling_blizzard_does_not_reraise_floors() {
        let mut sys = system_with(SnowOptionsPatch::default(), 15);
        sys.set_blizzard_mode(true);
        assert_eq!(sys.options().particle_count, 250);

        sys.set_options(SnowOptionsPatch {
            particle_count: Some(120),
            ..Default::default()
        });
        sys.set_blizzard_mode(true);
        // Already enabled: the raise fires only on the false→true edge
        assert_eq!(sys.options().particle_count, 120);
    }

    #[test]
    fn fresh_spawns_are_not_drawn_until_the_next_tick() {
        let mut sys = system_with(SnowOptionsPatch::default(), 16);
        sys.start();
        pump(&mut sys, 1);
        assert_eq!(sys.particle_count(), 1);
        assert!(sys.canvas().ops().is_empty());

        pump(&mut sys, 1);
        assert!(!sys.canvas().ops().is_empty());
    }

    #[test]
    fn culled_particles_are_never_drawn() {
        // Gravity high enough that every particle falls through the
        // bottom on its first step, so the render phase sees none.
        let patch = SnowOptionsPatch {
            particle_count: Some(1),
            speed: Some(0.0),
            gravity: Some(1000.0),
            shapes: Some(vec![SnowflakeShape::Circle]),
            ..Default::default()
        };
        let mut sys = system_with(patch, 17);
        sys.start();
        for _ in 0..10 {
            pump(&mut sys, 1);
            assert!(sys.canvas().ops().is_empty());
            assert_eq!(sys.particle_count(), 1);
        }
    }

    #[test]
    fn option_changes_apply_from_the_next_tick() {
        let mut sys = system_with(SnowOptionsPatch::default(), 18);
        sys.start();
        pump(&mut sys, 5);
        assert_eq!(sys.particle_count(), 5);

        // Lowering the target stops top-up but keeps live particles
        sys.set_options(SnowOptionsPatch {
            particle_count: Some(0),
            ..Default::default()
        });
        pump(&mut sys, 3);
        assert_eq!(sys.particle_count(), 5);
    }
}
