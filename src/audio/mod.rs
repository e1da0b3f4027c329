//! Audio for merge events
//!
//! Procedurally generated tones - no external files needed!

pub mod voice;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use voice::{Envelope, EnvelopeStage, MergeTone, Voice, VoiceId, VoicePool};
#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;
