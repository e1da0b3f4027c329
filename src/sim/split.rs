//! Splitting oversized stars into fragments
//!
//! Fragments are carved off one at a time until too little mass is left
//! for two more; the remainder becomes the final fragment. Every fragment
//! starts at the parent's position and flies off in a random direction,
//! smaller fragments faster.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::star::Star;
use crate::config::SimConfig;
use crate::consts::{FRAGMENT_SPEED_FAST, FRAGMENT_SPEED_SLOW, MAX_FRAGMENT_RADIUS_FACTOR};
use crate::{map_range, radius_for_mass};

/// Whether a star is large enough to split
pub fn should_split(star: &Star, config: &SimConfig) -> bool {
    star.radius() > config.split_threshold
}

/// Ejection speed for a fragment of the given radius (unclamped linear map)
pub fn fragment_speed(radius: f32, initial_radius: f32) -> f32 {
    map_range(
        radius,
        initial_radius,
        initial_radius * MAX_FRAGMENT_RADIUS_FACTOR,
        FRAGMENT_SPEED_FAST,
        FRAGMENT_SPEED_SLOW,
    )
}

/// Break `parent` into fragments whose masses sum to the parent's mass.
///
/// Always yields at least one fragment. Every fragment carries the split cooldown.
pub fn split_star<R: Rng>(parent: &Star, config: &SimConfig, rng: &mut R) -> Vec<Star> {
    let min_mass = config.min_fragment_mass();
    let max_mass = config.max_fragment_mass();

    let mut fragments = Vec::with_capacity(config.split_particles);
    let mut remaining = parent.mass();

    while remaining > min_mass * 2.0 {
        // remaining / 2 > min_mass here, so the range is never empty
        let mass = rng.random_range(min_mass..=max_mass.min(remaining * 0.5));
        remaining -= mass;
        fragments.push(spawn_fragment(parent, mass, config, rng));
    }

    fragments.push(spawn_fragment(parent, remaining, config, rng));

    log::debug!(
        "split star of mass {:.1} into {} fragments",
        parent.mass(),
        fragments.len()
    );
    fragments
}

fn spawn_fragment<R: Rng>(parent: &Star, mass: f32, config: &SimConfig, rng: &mut R) -> Star {
    let angle = rng.random_range(0.0..TAU);
    let speed = fragment_speed(radius_for_mass(mass), config.initial_radius);
    let kick = Vec2::new(angle.cos(), angle.sin()) * speed;

    let mut fragment = Star::with_mass(parent.pos, parent.vel + kick, mass, config.trail_length);
    fragment.split_cooldown = config.split_cooldown;
    fragment
}
