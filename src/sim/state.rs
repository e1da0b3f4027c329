//! Simulation state and the render/audio-facing queries
//!
//! The star collection is owned here and mutated only by `tick`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::star::{Star, StarKind};
use crate::config::SimConfig;

/// Something that happened during the last frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// Two stars merged; `mass` is the combined mass
    Merge { mass: f32, position: Vec2 },
    /// A star exploded into `fragments` pieces
    Split {
        position: Vec2,
        parent_mass: f32,
        fragments: usize,
    },
}

/// Render-facing view of a star
#[derive(Debug, Clone)]
pub struct StarSnapshot {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: StarKind,
    pub color: [u8; 3],
    /// Oldest first
    pub trail: Vec<Vec2>,
}

impl From<&Star> for StarSnapshot {
    fn from(star: &Star) -> Self {
        let kind = star.kind();
        Self {
            pos: star.pos,
            radius: star.radius(),
            kind,
            color: kind.color(),
            trail: star.trail().collect(),
        }
    }
}

/// Complete simulation state (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) stars: Vec<Star>,
    /// Events produced by the most recent frame
    pub(crate) events: Vec<SimEvent>,
    /// Frames simulated since the last reset
    pub(crate) frame: u64,
}

impl Simulation {
    /// Create a simulation and spawn the initial star field
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut sim = Self::empty(config, seed);
        sim.reset();
        log::info!(
            "Simulation created with seed {} and {} stars",
            seed,
            sim.stars.len()
        );
        sim
    }

    /// Create a simulation with no stars
    pub fn empty(config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            stars: Vec::new(),
            events: Vec::new(),
            frame: 0,
        }
    }

    /// Replace all stars with a fresh field of `initial_particles` stars
    pub fn reset(&mut self) {
        let config = &self.config;
        let speed = config.initial_speed;
        let rng = &mut self.rng;

        self.stars = (0..config.initial_particles)
            .map(|_| {
                let pos = Vec2::new(
                    rng.random_range(0.0..config.width),
                    rng.random_range(0.0..config.height),
                );
                let vel = Vec2::new(
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                );
                Star::new(pos, vel, config.initial_radius, config.trail_length)
            })
            .collect();
        self.events.clear();
        self.frame = 0;
    }

    /// Add a star to the live collection
    pub fn insert_star(&mut self, star: Star) {
        self.stars.push(star);
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Frames simulated since the last reset
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of all star masses
    pub fn total_mass(&self) -> f32 {
        self.stars.iter().map(Star::mass).sum()
    }

    /// Events from the last frame
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Combined masses of the merges in the last frame (for the audio sink)
    pub fn merge_events(&self) -> impl Iterator<Item = f32> + '_ {
        self.events.iter().filter_map(|event| match event {
            SimEvent::Merge { mass, .. } => Some(*mass),
            SimEvent::Split { .. } => None,
        })
    }

    /// Render snapshot of every live star
    pub fn snapshot(&self) -> Vec<StarSnapshot> {
        self.stars.iter().map(StarSnapshot::from).collect()
    }
}
