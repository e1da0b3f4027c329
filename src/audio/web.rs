//! Web Audio backend for merge tones
//!
//! Each merge plays a sine/triangle pair through a shared low-pass filter.
//! Envelopes are scheduled on the audio clock from the `VoicePool` model.

use std::collections::HashMap;

use web_sys::{
    AudioContext, BiquadFilterNode, BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
};

use super::voice::{MergeTone, Voice, VoiceId, VoicePool};
use crate::config::SimConfig;
use crate::consts::FILTER_CUTOFF;

/// Oscillators and gains backing one voice
struct VoiceNodes {
    oscillators: [OscillatorNode; 2],
    gains: [GainNode; 2],
    peaks: [f32; 2],
}

impl VoiceNodes {
    /// Cut the voice now, cancelling its scheduled fade
    fn stop(&self, now: f64) {
        for (osc, gain) in self.oscillators.iter().zip(&self.gains) {
            gain.gain().cancel_scheduled_values(now).ok();
            gain.gain().set_value_at_time(0.0, now).ok();
            osc.stop_with_when(now).ok();
            gain.disconnect().ok();
        }
    }

    /// Reschedule a fade to silence starting at `now`
    fn fade_out(&self, voice: &Voice, now: f64) {
        let level = voice.level(now);
        for ((osc, gain), peak) in self.oscillators.iter().zip(&self.gains).zip(self.peaks) {
            gain.gain().cancel_scheduled_values(now).ok();
            gain.gain().set_value_at_time(peak * level, now).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(0.0, voice.ends_at())
                .ok();
            osc.stop_with_when(voice.ends_at()).ok();
        }
    }
}

/// Audio manager for merge sounds
pub struct AudioManager {
    ctx: Option<AudioContext>,
    filter: Option<BiquadFilterNode>,
    pool: VoicePool,
    nodes: HashMap<VoiceId, VoiceNodes>,
    /// Mass range mapped onto the tone range
    min_mass: f32,
    max_mass: f32,
    master_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(config: &SimConfig) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let filter = ctx.as_ref().and_then(create_filter);

        Self {
            ctx,
            filter,
            pool: VoicePool::default(),
            nodes: HashMap::new(),
            min_mass: config.min_fragment_mass(),
            max_mass: config.split_mass(),
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute; muting fades out whatever is sounding
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if !muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();
        self.pool.release_all(now);
        for voice in self.pool.voices() {
            if let Some(nodes) = self.nodes.get(&voice.id) {
                nodes.fade_out(voice, now);
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play the tone for a merge producing `mass`
    pub fn play_merge(&mut self, mass: f32) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let (Some(ctx), Some(filter)) = (&self.ctx, &self.filter) else {
            return;
        };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let now = ctx.current_time();
        let tone = MergeTone::for_mass(mass, self.min_mass, self.max_mass);
        let triggered = self.pool.trigger(tone, now);

        if let Some(nodes) = triggered.dropped.and_then(|id| self.nodes.remove(&id)) {
            nodes.stop(now);
        }

        let Some(voice) = self.pool.voices().find(|v| v.id == triggered.started) else {
            return;
        };
        if let Some(nodes) = schedule_voice(ctx, filter, voice, vol) {
            self.nodes.insert(voice.id, nodes);
        }
    }

    /// Reap finished voices; call once per frame
    pub fn update(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        for id in self.pool.update(ctx.current_time()) {
            if let Some(nodes) = self.nodes.remove(&id) {
                for gain in &nodes.gains {
                    gain.disconnect().ok();
                }
            }
        }
    }
}

fn create_filter(ctx: &AudioContext) -> Option<BiquadFilterNode> {
    let filter = ctx.create_biquad_filter().ok()?;
    filter.set_type(BiquadFilterType::Lowpass);
    filter.frequency().set_value(FILTER_CUTOFF);
    filter
        .connect_with_audio_node(&ctx.destination())
        .ok()?;
    Some(filter)
}

/// Create an oscillator feeding the filter through its own gain
fn create_osc(
    ctx: &AudioContext,
    filter: &BiquadFilterNode,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(filter).ok()?;

    Some((osc, gain))
}

/// Schedule a voice's full envelope on the audio clock
fn schedule_voice(
    ctx: &AudioContext,
    filter: &BiquadFilterNode,
    voice: &Voice,
    vol: f32,
) -> Option<VoiceNodes> {
    let tone = voice.tone;
    let (base, base_gain) = create_osc(ctx, filter, tone.frequency, OscillatorType::Sine)?;
    let (harmonic, harmonic_gain) =
        create_osc(ctx, filter, tone.harmonic_frequency(), OscillatorType::Triangle)?;

    let t = voice.started_at;
    let attack_end = t + voice.envelope.attack;
    let release_start = t + voice.envelope.release_delay.max(voice.envelope.attack);
    let end = voice.ends_at();
    let peaks = [tone.amplitude * vol, tone.harmonic_amplitude() * vol];

    for ((osc, gain), peak) in [(&base, &base_gain), (&harmonic, &harmonic_gain)]
        .into_iter()
        .zip(peaks)
    {
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(peak, attack_end).ok();
        gain.gain().set_value_at_time(peak, release_start).ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, end).ok();
        osc.start_with_when(t).ok();
        osc.stop_with_when(end).ok();
    }

    Some(VoiceNodes {
        oscillators: [base, harmonic],
        gains: [base_gain, harmonic_gain],
        peaks,
    })
}
