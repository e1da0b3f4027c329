//! Per-frame simulation step
//!
//! Stars are visited in reverse index order. Each one is advanced, then tested
//! against every star visited earlier this frame (higher indices), then split if
//! it grew too large. The pass works on a slot array: consumed stars leave an
//! empty slot and fragments wait in a side buffer, and both are committed back
//! into the collection once the pass is over.

use super::collision::{Absorber, resolve_pair};
use super::split::{should_split, split_star};
use super::state::{SimEvent, Simulation};
use super::star::Star;

/// Advance the simulation by one frame
pub fn tick(sim: &mut Simulation) {
    sim.events.clear();
    sim.frame += 1;

    let Simulation {
        config,
        rng,
        stars,
        events,
        ..
    } = sim;

    let mut slots: Vec<Option<Star>> = std::mem::take(stars).into_iter().map(Some).collect();
    let mut spawned: Vec<Star> = Vec::new();

    for i in (0..slots.len()).rev() {
        // Consumed earlier in this pass
        let Some(mut star) = slots[i].take() else {
            continue;
        };
        star.advance(config.width, config.height);

        let mut consumed = false;
        for j in (i + 1..slots.len()).rev() {
            let Some(other) = slots[j].as_mut() else {
                continue;
            };
            let Some(outcome) = resolve_pair(&mut star, other, rng) else {
                continue;
            };

            events.push(SimEvent::Merge {
                mass: outcome.mass,
                position: outcome.position,
            });
            match outcome.absorber {
                Absorber::First => slots[j] = None,
                Absorber::Second => {
                    consumed = true;
                    break;
                }
            }
        }
        if consumed {
            continue;
        }

        if should_split(&star, config) {
            let fragments = split_star(&star, config, rng);
            events.push(SimEvent::Split {
                position: star.pos,
                parent_mass: star.mass(),
                fragments: fragments.len(),
            });
            spawned.extend(fragments);
        } else {
            slots[i] = Some(star);
        }
    }

    // Commit: survivors keep their relative order, fragments go last
    stars.extend(slots.into_iter().flatten());
    stars.append(&mut spawned);

    log::trace!(
        "frame {}: {} stars, {} events",
        sim.frame,
        sim.stars.len(),
        sim.events.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::mass_for_radius;
    use glam::Vec2;

    fn config() -> SimConfig {
        SimConfig {
            initial_particles: 0,
            ..Default::default()
        }
    }

    fn star_at(x: f32, y: f32, radius: f32, vel: Vec2) -> Star {
        Star::new(Vec2::new(x, y), vel, radius, 20)
    }

    #[test]
    fn test_equal_pair_merges_in_one_frame() {
        let mut sim = Simulation::empty(config(), 5);
        let va = Vec2::new(0.5, 0.0);
        let vb = Vec2::new(-0.5, 1.0);
        sim.insert_star(star_at(100.0, 100.0, 5.0, va));
        sim.insert_star(star_at(108.0, 100.0, 5.0, vb));
        let expected_mass = mass_for_radius(5.0) * 2.0;

        tick(&mut sim);

        assert_eq!(sim.star_count(), 1);
        let merged = &sim.stars()[0];
        assert!((merged.mass() - expected_mass).abs() < 1e-3);
        assert!((merged.mass() - 157.0).abs() < 0.2);
        assert!((merged.vel - (va + vb) / 2.0).length() < 1e-5);

        let merges: Vec<f32> = sim.merge_events().collect();
        assert_eq!(merges.len(), 1);
        assert!((merges[0] - expected_mass).abs() < 1e-3);
    }

    #[test]
    fn test_cooldown_stars_pass_through() {
        let mut sim = Simulation::empty(config(), 5);
        let mut a = star_at(100.0, 100.0, 5.0, Vec2::ZERO);
        a.split_cooldown = 3;
        sim.insert_star(a);
        sim.insert_star(star_at(101.0, 100.0, 5.0, Vec2::ZERO));

        tick(&mut sim);
        assert_eq!(sim.star_count(), 2);
        assert_eq!(sim.merge_events().count(), 0);

        let cooldowns: Vec<u32> = sim.stars().iter().map(|s| s.split_cooldown).collect();
        assert_eq!(cooldowns, vec![2, 0]);

        // Cooldown expires after two more frames, then they merge
        tick(&mut sim);
        assert_eq!(sim.star_count(), 2);
        tick(&mut sim);
        assert_eq!(sim.star_count(), 1);
    }

    #[test]
    fn test_absorber_keeps_growing_within_frame() {
        let mut sim = Simulation::empty(config(), 8);
        // A big star overlapping three small ones
        sim.insert_star(star_at(300.0, 300.0, 10.0, Vec2::ZERO));
        sim.insert_star(star_at(306.0, 300.0, 3.0, Vec2::ZERO));
        sim.insert_star(star_at(294.0, 300.0, 3.0, Vec2::ZERO));
        sim.insert_star(star_at(300.0, 306.0, 3.0, Vec2::ZERO));
        let total = sim.total_mass();

        tick(&mut sim);

        assert_eq!(sim.star_count(), 1);
        assert!((sim.total_mass() - total).abs() < 1e-2);
        let masses: Vec<f32> = sim.merge_events().collect();
        assert_eq!(masses.len(), 3);
        assert!(masses.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_consumed_star_is_not_tested_again() {
        let mut sim = Simulation::empty(config(), 2);
        // Index 2 eats index 1 first; index 0 then has to skip the emptied slot
        sim.insert_star(star_at(200.0, 200.0, 2.0, Vec2::ZERO));
        sim.insert_star(star_at(201.0, 200.0, 4.0, Vec2::ZERO));
        sim.insert_star(star_at(199.0, 200.0, 8.0, Vec2::ZERO));
        let total = sim.total_mass();

        tick(&mut sim);

        assert_eq!(sim.star_count(), 1);
        assert_eq!(sim.merge_events().count(), 2);
        assert!((sim.total_mass() - total).abs() < 1e-2);
    }

    #[test]
    fn test_oversized_star_splits_same_frame() {
        let mut sim = Simulation::empty(config(), 21);
        sim.insert_star(star_at(300.0, 300.0, 61.0, Vec2::new(1.0, 0.0)));
        let total = sim.total_mass();

        tick(&mut sim);

        assert!(sim.star_count() > 1);
        assert!((sim.total_mass() - total).abs() < total * 1e-4);
        for fragment in sim.stars() {
            assert!(fragment.radius() <= 25.0 + 1e-3);
            assert_eq!(fragment.split_cooldown, sim.config.split_cooldown);
            // Fragments appear at the parent's post-move position
            assert_eq!(fragment.pos, Vec2::new(301.0, 300.0));
        }
        assert!(matches!(
            sim.events().last(),
            Some(SimEvent::Split { fragments, .. }) if *fragments == sim.star_count()
        ));
    }

    #[test]
    fn test_merge_into_split_keeps_mass() {
        let mut sim = Simulation::empty(config(), 4);
        // Together they cross the threshold
        sim.insert_star(star_at(300.0, 300.0, 50.0, Vec2::ZERO));
        sim.insert_star(star_at(330.0, 300.0, 40.0, Vec2::ZERO));
        let total = sim.total_mass();

        tick(&mut sim);
        assert!((sim.total_mass() - total).abs() < total * 1e-4);
        assert_eq!(sim.merge_events().count(), 1);
    }

    #[test]
    fn test_stars_wrap_around_edges() {
        let mut sim = Simulation::empty(config(), 1);
        sim.insert_star(star_at(599.0, 0.5, 1.0, Vec2::new(2.0, -1.0)));
        tick(&mut sim);
        let pos = sim.stars()[0].pos;
        assert!((pos.x - 1.0).abs() < 1e-4);
        assert!((pos.y - 599.5).abs() < 1e-4);
    }

    #[test]
    fn test_mass_and_radius_stay_consistent() {
        let config = SimConfig {
            width: 150.0,
            height: 150.0,
            initial_particles: 200,
            ..Default::default()
        };
        let mut sim = Simulation::new(config, 777);
        let total = sim.total_mass();

        for _ in 0..300 {
            tick(&mut sim);
            let pi = std::f32::consts::PI;
            for star in sim.stars() {
                assert!(star.mass() > 0.0);
                assert!((star.mass() - pi * star.radius().powi(2)).abs() < star.mass() * 1e-4);
                assert!(star.trail().len() <= sim.config.trail_length);
            }
        }
        assert!((sim.total_mass() - total).abs() < total * 1e-3);
        assert_eq!(sim.frame(), 300);
    }

    #[test]
    fn test_determinism() {
        let config = SimConfig {
            width: 200.0,
            height: 200.0,
            initial_particles: 100,
            ..Default::default()
        };
        let mut a = Simulation::new(config.clone(), 31337);
        let mut b = Simulation::new(config, 31337);
        for _ in 0..100 {
            tick(&mut a);
            tick(&mut b);
        }
        assert_eq!(a.star_count(), b.star_count());
        for (sa, sb) in a.stars().iter().zip(b.stars()) {
            assert_eq!(sa.pos, sb.pos);
            assert_eq!(sa.mass(), sb.mass());
        }
    }
}
