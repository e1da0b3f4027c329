//! Merge tone model
//!
//! Target-independent part of the audio sink: how a merge sounds, how a
//! voice's envelope evolves over time, and how many voices may overlap.
//! The Web Audio backend schedules exactly what this model describes.

use std::collections::VecDeque;

use crate::consts::*;
use crate::map_range;

/// A dual-tone merge sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeTone {
    /// Base oscillator frequency (Hz)
    pub frequency: f32,
    /// Base oscillator peak gain
    pub amplitude: f32,
}

impl MergeTone {
    /// Map a combined mass onto pitch and loudness.
    ///
    /// `min_mass` sounds highest and quietest, `max_mass` lowest and loudest.
    /// Masses outside the range are clamped to it.
    pub fn for_mass(mass: f32, min_mass: f32, max_mass: f32) -> Self {
        let mass = mass.clamp(min_mass, max_mass);
        Self {
            frequency: map_range(mass, min_mass, max_mass, FREQ_HIGH, FREQ_LOW),
            amplitude: map_range(mass, min_mass, max_mass, AMP_LOW, AMP_HIGH),
        }
    }

    /// Second oscillator frequency
    pub fn harmonic_frequency(&self) -> f32 {
        self.frequency * HARMONIC_RATIO
    }

    /// Second oscillator peak gain
    pub fn harmonic_amplitude(&self) -> f32 {
        self.amplitude * HARMONIC_GAIN
    }
}

/// Envelope stage of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Silent; the voice is finished
    Idle,
    /// Fading in
    Attack,
    /// Holding peak gain until the release is due
    Sustain,
    /// Fading out
    Release,
}

/// Attack / release timings (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    /// Delay from trigger to the start of the release
    pub release_delay: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: ATTACK_SECS,
            release_delay: RELEASE_DELAY_SECS,
            release: RELEASE_SECS,
        }
    }
}

/// Handle of a voice in a `VoicePool`
pub type VoiceId = u64;

/// One sounding merge tone
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: VoiceId,
    pub tone: MergeTone,
    pub envelope: Envelope,
    /// Trigger time (audio clock seconds)
    pub started_at: f64,
    stage: EnvelopeStage,
    /// Release start, fixed when the voice is triggered or released early
    release_at: f64,
}

impl Voice {
    pub fn new(id: VoiceId, tone: MergeTone, envelope: Envelope, now: f64) -> Self {
        Self {
            id,
            tone,
            envelope,
            started_at: now,
            stage: EnvelopeStage::Attack,
            release_at: now + envelope.release_delay.max(envelope.attack),
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Time at which the voice falls silent
    pub fn ends_at(&self) -> f64 {
        self.release_at + self.envelope.release
    }

    /// Move through the envelope stages up to `now`
    pub fn update(&mut self, now: f64) {
        self.stage = match self.stage {
            EnvelopeStage::Idle => EnvelopeStage::Idle,
            _ if now >= self.ends_at() => EnvelopeStage::Idle,
            _ if now >= self.release_at => EnvelopeStage::Release,
            EnvelopeStage::Attack if now >= self.started_at + self.envelope.attack => {
                EnvelopeStage::Sustain
            }
            stage => stage,
        };
    }

    /// Start the release at `now` if it is not already under way
    pub fn release(&mut self, now: f64) {
        if now < self.release_at {
            self.release_at = now;
            self.update(now);
        }
    }

    /// Gain multiplier (0-1) relative to the tone's peak at `now`
    pub fn level(&self, now: f64) -> f32 {
        let elapsed = now - self.started_at;
        let level = match self.stage {
            EnvelopeStage::Idle => 0.0,
            EnvelopeStage::Attack => elapsed / self.envelope.attack,
            EnvelopeStage::Sustain => 1.0,
            EnvelopeStage::Release => {
                let peak = ((self.release_at - self.started_at) / self.envelope.attack).min(1.0);
                peak * (1.0 - (now - self.release_at) / self.envelope.release)
            }
        };
        level.clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }
}

/// What happened when a voice was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triggered {
    pub started: VoiceId,
    /// Oldest voice cut to make room, if the pool was full
    pub dropped: Option<VoiceId>,
}

/// Bounded set of sounding voices; the oldest is dropped when full
#[derive(Debug, Clone)]
pub struct VoicePool {
    voices: VecDeque<Voice>,
    capacity: usize,
    envelope: Envelope,
    next_id: VoiceId,
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new(MAX_SOUNDS)
    }
}

impl VoicePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            voices: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            envelope: Envelope::default(),
            next_id: 1,
        }
    }

    /// Start a new voice at `now`
    pub fn trigger(&mut self, tone: MergeTone, now: f64) -> Triggered {
        let dropped = if self.voices.len() >= self.capacity {
            self.voices.pop_front().map(|voice| voice.id)
        } else {
            None
        };
        if let Some(id) = dropped {
            log::debug!("Voice cap reached, dropping voice {}", id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.voices.push_back(Voice::new(id, tone, self.envelope, now));

        Triggered {
            started: id,
            dropped,
        }
    }

    /// Advance every voice to `now`; returns the ids that finished
    pub fn update(&mut self, now: f64) -> Vec<VoiceId> {
        for voice in &mut self.voices {
            voice.update(now);
        }
        let finished: Vec<VoiceId> = self
            .voices
            .iter()
            .filter(|voice| voice.is_finished())
            .map(|voice| voice.id)
            .collect();
        self.voices.retain(|voice| !voice.is_finished());
        finished
    }

    /// Release every voice at `now` (e.g. on mute)
    pub fn release_all(&mut self, now: f64) {
        for voice in &mut self.voices {
            voice.release(now);
        }
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
