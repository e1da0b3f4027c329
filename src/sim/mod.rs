//! Deterministic simulation module
//!
//! All star physics lives here. This module must be pure and deterministic:
//! - One step per rendered frame
//! - Seeded RNG only
//! - Stable iteration order (reverse index, commit at frame end)
//! - No rendering or platform dependencies

pub mod collision;
pub mod split;
pub mod star;
pub mod state;
pub mod tick;

pub use collision::{Absorber, MergeOutcome, resolve_pair, stars_collide};
pub use split::{fragment_speed, should_split, split_star};
pub use star::{STAR_TIERS, Star, StarKind};
pub use state::{SimEvent, Simulation, StarSnapshot};
pub use tick::tick;
