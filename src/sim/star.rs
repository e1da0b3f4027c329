//! The star entity and its color classification

use std::collections::VecDeque;

use glam::Vec2;

use crate::{mass_for_radius, radius_for_mass, wrap_position};

/// Color classification of a star, by radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarKind {
    RedDwarf,
    OrangeDwarf,
    YellowStar,
    WhiteStar,
    BlueGiant,
}

/// Tier table, ascending by minimum radius
pub const STAR_TIERS: [(f32, StarKind); 5] = [
    (2.0, StarKind::RedDwarf),
    (8.0, StarKind::OrangeDwarf),
    (15.0, StarKind::YellowStar),
    (30.0, StarKind::WhiteStar),
    (45.0, StarKind::BlueGiant),
];

impl StarKind {
    /// Highest tier whose minimum radius does not exceed `radius`.
    /// Anything below the first threshold is a red dwarf.
    pub fn for_radius(radius: f32) -> Self {
        STAR_TIERS
            .iter()
            .rev()
            .find(|(min_radius, _)| radius >= *min_radius)
            .map(|&(_, kind)| kind)
            .unwrap_or(STAR_TIERS[0].1)
    }

    /// Display color (RGB)
    pub fn color(self) -> [u8; 3] {
        match self {
            StarKind::RedDwarf => [255, 80, 80],
            StarKind::OrangeDwarf => [255, 160, 80],
            StarKind::YellowStar => [255, 255, 180],
            StarKind::WhiteStar => [235, 245, 255],
            StarKind::BlueGiant => [150, 170, 255],
        }
    }
}

/// A star. Mass is its area; radius is always derived from mass.
#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub vel: Vec2,
    mass: f32,
    radius: f32,
    /// Frames left during which this star ignores collisions
    pub split_cooldown: u32,
    /// Past positions for rendering (oldest first)
    trail: VecDeque<Vec2>,
    trail_capacity: usize,
}

impl Star {
    /// Create a star from its radius
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, trail_capacity: usize) -> Self {
        Self::with_mass(pos, vel, mass_for_radius(radius), trail_capacity)
    }

    /// Create a star from its mass
    pub fn with_mass(pos: Vec2, vel: Vec2, mass: f32, trail_capacity: usize) -> Self {
        Self {
            pos,
            vel,
            mass,
            radius: radius_for_mass(mass),
            split_cooldown: 0,
            trail: VecDeque::with_capacity(trail_capacity + 1),
            trail_capacity,
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Replace the mass, keeping the radius in step
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.radius = radius_for_mass(mass);
    }

    /// Whether this star may take part in a merge
    pub fn can_collide(&self) -> bool {
        self.split_cooldown == 0
    }

    pub fn kind(&self) -> StarKind {
        StarKind::for_radius(self.radius)
    }

    /// Trail samples, oldest first
    pub fn trail(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.trail.iter().copied()
    }

    /// Record the current position into the trail, evicting the oldest sample when full
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > self.trail_capacity {
            self.trail.pop_front();
        }
    }

    /// Advance one frame on a `width` x `height` torus
    pub fn advance(&mut self, width: f32, height: f32) {
        self.record_trail();
        self.pos = wrap_position(self.pos + self.vel, width, height);
        self.split_cooldown = self.split_cooldown.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_follows_mass() {
        let mut star = Star::new(Vec2::ZERO, Vec2::ZERO, 5.0, 4);
        assert!((star.mass() - std::f32::consts::PI * 25.0).abs() < 1e-3);

        star.set_mass(157.0);
        let expected = std::f32::consts::PI * star.radius() * star.radius();
        assert!((star.mass() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_tier_lookup() {
        assert_eq!(StarKind::for_radius(0.5), StarKind::RedDwarf);
        assert_eq!(StarKind::for_radius(5.0), StarKind::RedDwarf);
        assert_eq!(StarKind::for_radius(8.0), StarKind::OrangeDwarf);
        assert_eq!(StarKind::for_radius(29.9), StarKind::YellowStar);
        assert_eq!(StarKind::for_radius(30.0), StarKind::WhiteStar);
        assert_eq!(StarKind::for_radius(61.0), StarKind::BlueGiant);
        assert_eq!(StarKind::BlueGiant.color(), [150, 170, 255]);
    }

    #[test]
    fn test_trail_is_bounded_fifo() {
        let mut star = Star::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 5.0, 3);
        for _ in 0..5 {
            star.advance(100.0, 100.0);
        }
        let trail: Vec<Vec2> = star.trail().collect();
        assert_eq!(trail.len(), 3);
        // Samples are pre-integration positions 2, 3, 4
        assert_eq!(trail[0], Vec2::new(2.0, 0.0));
        assert_eq!(trail[2], Vec2::new(4.0, 0.0));
        assert_eq!(star.pos, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_advance_wraps() {
        let mut star = Star::new(Vec2::new(99.5, 0.5), Vec2::new(1.0, -1.0), 5.0, 3);
        star.advance(100.0, 100.0);
        assert!((star.pos.x - 0.5).abs() < 1e-4);
        assert!((star.pos.y - 99.5).abs() < 1e-4);
    }

    #[test]
    fn test_cooldown_counts_down_to_zero() {
        let mut star = Star::new(Vec2::ZERO, Vec2::ZERO, 5.0, 3);
        star.split_cooldown = 2;
        star.advance(100.0, 100.0);
        assert_eq!(star.split_cooldown, 1);
        assert!(!star.can_collide());
        star.advance(100.0, 100.0);
        star.advance(100.0, 100.0);
        assert_eq!(star.split_cooldown, 0);
        assert!(star.can_collide());
    }
}
