//! Shape generation for stars and their trails
//!
//! All positions are canvas pixels; the pipeline maps them to NDC.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, rgba};
use crate::map_range;
use crate::sim::StarSnapshot;

/// Alpha and radius of trail sample `index` out of `len`.
///
/// Sample 0 is the oldest: fully transparent and a quarter of the star's radius.
/// Later samples grow towards `opacity` alpha and the full radius.
pub fn trail_style(index: usize, len: usize, radius: f32, opacity: f32) -> (f32, f32) {
    let i = index as f32;
    let n = len as f32;
    let alpha = map_range(i, 0.0, n, 0.0, opacity);
    let diameter = map_range(i, 0.0, n, radius * 0.5, radius * 2.0);
    (alpha, diameter / 2.0)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a star's afterimage trail (oldest drawn first)
pub fn star_trail(star: &StarSnapshot, opacity: f32, segments: u32) -> Vec<Vertex> {
    let len = star.trail.len();
    let mut vertices = Vec::with_capacity(len * segments as usize * 3);

    for (i, &pos) in star.trail.iter().enumerate() {
        let (alpha, radius) = trail_style(i, len, star.radius, opacity);
        // The oldest sample is invisible
        if alpha <= 0.0 {
            continue;
        }
        vertices.extend(circle(pos, radius, rgba(star.color, alpha), segments));
    }

    vertices
}

/// Generate vertices for a star's opaque disc
pub fn star_disc(star: &StarSnapshot, segments: u32) -> Vec<Vertex> {
    circle(star.pos, star.radius, rgba(star.color, 1.0), segments)
}

/// Disc segment count scaled by on-screen size
pub fn segments_for_radius(radius: f32, detail: f32) -> u32 {
    ((radius * detail).ceil() as u32).clamp(8, 64)
}

/// Build the whole frame: every trail, then every star on top
pub fn scene(stars: &[StarSnapshot], trails: bool, opacity: f32, detail: f32) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    if trails {
        for star in stars {
            let segments = segments_for_radius(star.radius, detail) / 2;
            vertices.extend(star_trail(star, opacity, segments.max(6)));
        }
    }
    for star in stars {
        vertices.extend(star_disc(star, segments_for_radius(star.radius, detail)));
    }

    vertices
}
