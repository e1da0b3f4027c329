//! Stardust - drifting, merging and exploding stars
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, merges, splits)
//! - `renderer`: WebGPU rendering of stars and their trails
//! - `audio`: Merge tones (voice model + Web Audio backend)
//! - `config`: Simulation parameters and validation
//! - `settings`: Presentation preferences

pub mod audio;
pub mod config;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Stars spawned at startup
    pub const INITIAL_PARTICLES: usize = 1000;
    /// Radius of every star at startup (and the smallest fragment)
    pub const INITIAL_RADIUS: f32 = 5.0;
    /// Initial velocity components are drawn from [-INITIAL_SPEED, INITIAL_SPEED]
    pub const INITIAL_SPEED: f32 = 2.0;

    /// Stars with a radius above this explode into fragments
    pub const SPLIT_THRESHOLD: f32 = 60.0;
    /// Expected fragment count per split (buffer capacity hint)
    pub const SPLIT_PARTICLES: usize = 50;
    /// Frames a fresh fragment ignores collisions
    pub const SPLIT_COOLDOWN: u32 = 60;
    /// Largest carved fragment, as a multiple of INITIAL_RADIUS
    pub const MAX_FRAGMENT_RADIUS_FACTOR: f32 = 5.0;
    /// Fragment speed for the smallest fragment
    pub const FRAGMENT_SPEED_FAST: f32 = 4.0;
    /// Fragment speed for the largest carved fragment
    pub const FRAGMENT_SPEED_SLOW: f32 = 1.0;

    /// Trail samples kept per star
    pub const TRAIL_LENGTH: usize = 20;
    /// Alpha of the newest trail sample (0-1)
    pub const TRAIL_OPACITY: f32 = 0.5;

    /// Canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Simultaneously sounding merge voices
    pub const MAX_SOUNDS: usize = 3;
    /// Base frequency for the smallest merge (Hz)
    pub const FREQ_HIGH: f32 = 400.0;
    /// Base frequency for a merge at the split threshold (Hz)
    pub const FREQ_LOW: f32 = 100.0;
    /// Amplitude for the smallest merge
    pub const AMP_LOW: f32 = 0.05;
    /// Amplitude for a merge at the split threshold
    pub const AMP_HIGH: f32 = 0.15;
    /// Second oscillator frequency ratio (a perfect fifth)
    pub const HARMONIC_RATIO: f32 = 1.5;
    /// Second oscillator gain relative to the first
    pub const HARMONIC_GAIN: f32 = 0.3;
    /// Fade-in time of a merge tone (seconds)
    pub const ATTACK_SECS: f64 = 0.05;
    /// Time from trigger until the fade-out starts (seconds)
    pub const RELEASE_DELAY_SECS: f64 = 0.1;
    /// Fade-out time (seconds)
    pub const RELEASE_SECS: f64 = 0.1;
    /// Low-pass cutoff applied to both oscillators (Hz)
    pub const FILTER_CUTOFF: f32 = 800.0;
}

/// Wrap a coordinate into [0, extent)
#[inline]
pub fn wrap_coord(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Wrap a position onto the torus [0, width) x [0, height)
#[inline]
pub fn wrap_position(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_coord(pos.x, width), wrap_coord(pos.y, height))
}

/// Linearly map `value` from [in_min, in_max] onto [out_min, out_max] (no clamping)
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Mass of a star with the given radius (mass is area)
#[inline]
pub fn mass_for_radius(radius: f32) -> f32 {
    std::f32::consts::PI * radius * radius
}

/// Radius of a star with the given mass
#[inline]
pub fn radius_for_mass(mass: f32) -> f32 {
    (mass / std::f32::consts::PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_edges() {
        assert_eq!(wrap_coord(600.0, 600.0), 0.0);
        assert_eq!(wrap_coord(-1.0, 600.0), 599.0);
        assert_eq!(wrap_coord(250.0, 600.0), 250.0);
        assert_eq!(wrap_coord(1201.0, 600.0), 1.0);
    }

    #[test]
    fn test_wrap_tiny_negative_stays_in_range() {
        let w = wrap_coord(-1e-9, 600.0);
        assert!((0.0..600.0).contains(&w));
    }

    #[test]
    fn test_map_range_extrapolates() {
        assert_eq!(map_range(5.0, 5.0, 25.0, 4.0, 1.0), 4.0);
        assert_eq!(map_range(25.0, 5.0, 25.0, 4.0, 1.0), 1.0);
        assert!((map_range(45.0, 5.0, 25.0, 4.0, 1.0) - (-2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_mass_radius_inverse() {
        let r = 7.5;
        assert!((radius_for_mass(mass_for_radius(r)) - r).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn wrap_is_idempotent(x in -5000.0f32..5000.0, extent in 1.0f32..2000.0) {
            let once = wrap_coord(x, extent);
            prop_assert!(once >= 0.0 && once < extent);
            prop_assert_eq!(wrap_coord(once, extent), once);
        }
    }
}
