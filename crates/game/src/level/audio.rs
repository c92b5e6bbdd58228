use std::collections::HashMap;

use engine::DefDatabase;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoundCue {
    UiClick,
    InstantPickup,
    CarryPickup,
    CarryDeliver,
    GoldenHorn,
    CannotPickup,
}

impl SoundCue {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SoundCue::UiClick => "ui_click",
            SoundCue::InstantPickup => "instant_pickup",
            SoundCue::CarryPickup => "carry_pickup",
            SoundCue::CarryDeliver => "carry_deliver",
            SoundCue::GoldenHorn => "golden_horn",
            SoundCue::CannotPickup => "cannot_pickup",
        }
    }
}

/// Output seam for everything audible. Voices return their clip length when
/// the sink knows it.
pub(crate) trait AudioSink {
    fn play_cue(&mut self, cue: SoundCue);
    fn play_voice(&mut self, voice: &str) -> Option<f32>;
    fn stop_voice(&mut self);
    fn set_engine_pitch(&mut self, pitch: f32);
    fn stop_engine(&mut self);
}

/// Stands in for a mixer: logs every cue and answers clip lengths from
/// voice-line content.
#[derive(Debug, Default)]
pub(crate) struct TracingAudioSink {
    voice_lengths: HashMap<String, f32>,
    engine_running: bool,
}

impl TracingAudioSink {
    pub(crate) fn from_defs(defs: &DefDatabase) -> Self {
        let voice_lengths = defs
            .voice_lines()
            .iter()
            .filter_map(|line| Some((line.def_name.clone(), line.duration_seconds?)))
            .collect();
        Self {
            voice_lengths,
            engine_running: false,
        }
    }
}

impl AudioSink for TracingAudioSink {
    fn play_cue(&mut self, cue: SoundCue) {
        info!(cue = cue.as_str(), "audio_cue");
    }

    fn play_voice(&mut self, voice: &str) -> Option<f32> {
        let length = self.voice_lengths.get(voice).copied();
        info!(voice, length_seconds = ?length, "audio_voice_started");
        length
    }

    fn stop_voice(&mut self) {
        debug!("audio_voice_stopped");
    }

    fn set_engine_pitch(&mut self, pitch: f32) {
        if !self.engine_running {
            self.engine_running = true;
            info!(pitch, "audio_engine_started");
        }
    }

    fn stop_engine(&mut self) {
        if self.engine_running {
            self.engine_running = false;
            info!("audio_engine_stopped");
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AudioEvent {
    Cue(SoundCue),
    Voice(String),
    StopVoice,
    EnginePitch(f32),
    StopEngine,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingAudioSink {
    pub events: Vec<AudioEvent>,
    pub voice_lengths: HashMap<String, f32>,
}

#[cfg(test)]
impl RecordingAudioSink {
    pub(crate) fn with_voice_length(mut self, voice: &str, seconds: f32) -> Self {
        self.voice_lengths.insert(voice.to_string(), seconds);
        self
    }

    pub(crate) fn cues(&self) -> Vec<SoundCue> {
        self.events
            .iter()
            .filter_map(|event| match event {
                AudioEvent::Cue(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn voices(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                AudioEvent::Voice(voice) => Some(voice.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl AudioSink for RecordingAudioSink {
    fn play_cue(&mut self, cue: SoundCue) {
        self.events.push(AudioEvent::Cue(cue));
    }

    fn play_voice(&mut self, voice: &str) -> Option<f32> {
        self.events.push(AudioEvent::Voice(voice.to_string()));
        self.voice_lengths.get(voice).copied()
    }

    fn stop_voice(&mut self) {
        self.events.push(AudioEvent::StopVoice);
    }

    fn set_engine_pitch(&mut self, pitch: f32) {
        self.events.push(AudioEvent::EnginePitch(pitch));
    }

    fn stop_engine(&mut self) {
        self.events.push(AudioEvent::StopEngine);
    }
}
