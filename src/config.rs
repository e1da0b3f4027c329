//! Simulation parameters
//!
//! Defaults mirror `consts`; hosts may supply a partial JSON document to
//! run a scaled world (tests use tiny canvases and few stars).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::mass_for_radius;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Runtime form of the simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Canvas width (pixels)
    pub width: f32,
    /// Canvas height (pixels)
    pub height: f32,
    /// Stars spawned by `Simulation::reset`
    pub initial_particles: usize,
    /// Radius of spawned stars; also the minimum fragment size
    pub initial_radius: f32,
    /// Initial velocity components are uniform in [-initial_speed, initial_speed]
    pub initial_speed: f32,
    /// Radius above which a star splits
    pub split_threshold: f32,
    /// Expected fragments per split (capacity hint only)
    pub split_particles: usize,
    /// Collision-immunity frames given to fragments
    pub split_cooldown: u32,
    /// Trail samples per star
    pub trail_length: usize,
    /// Alpha of the newest trail sample
    pub trail_opacity: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            initial_particles: INITIAL_PARTICLES,
            initial_radius: INITIAL_RADIUS,
            initial_speed: INITIAL_SPEED,
            split_threshold: SPLIT_THRESHOLD,
            split_particles: SPLIT_PARTICLES,
            split_cooldown: SPLIT_COOLDOWN,
            trail_length: TRAIL_LENGTH,
            trail_opacity: TRAIL_OPACITY,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &'static str| {
            Err(ConfigError::Invalid { field, reason })
        };

        if !(self.width > 0.0) {
            return invalid("width", "must be positive");
        }
        if !(self.height > 0.0) {
            return invalid("height", "must be positive");
        }
        if !(self.initial_radius > 0.0) {
            return invalid("initial_radius", "must be positive");
        }
        if !(self.initial_speed >= 0.0) {
            return invalid("initial_speed", "must not be negative");
        }
        if !(self.split_threshold > self.initial_radius) {
            return invalid("split_threshold", "must exceed initial_radius");
        }
        // A star just over the threshold must hold more than two minimum
        // fragments, or it splits into a copy of itself every frame
        if !(self.split_mass() > 2.0 * self.min_fragment_mass()) {
            return invalid("split_threshold", "must exceed initial_radius * sqrt(2)");
        }
        if self.trail_length == 0 {
            return invalid("trail_length", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.trail_opacity) {
            return invalid("trail_opacity", "must be within [0, 1]");
        }
        Ok(())
    }

    /// Smallest fragment mass (a star of `initial_radius`)
    pub fn min_fragment_mass(&self) -> f32 {
        mass_for_radius(self.initial_radius)
    }

    /// Largest carved fragment mass
    pub fn max_fragment_mass(&self) -> f32 {
        mass_for_radius(self.initial_radius * MAX_FRAGMENT_RADIUS_FACTOR)
    }

    /// Mass of a star sitting exactly at the split threshold
    pub fn split_mass(&self) -> f32 {
        mass_for_radius(self.split_threshold)
    }
}
