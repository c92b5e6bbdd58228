use std::collections::VecDeque;

use engine::VoiceLineDef;
use tracing::{debug, info};

use super::audio::AudioSink;

pub(crate) const FALLBACK_VOICE_SECONDS: f32 = 3.0;
pub(crate) const CAPTION_MAX_CHARS: usize = 48;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NarrationRequest {
    pub voice: String,
    pub caption: String,
}

impl NarrationRequest {
    pub(crate) fn from_voice_line(line: &VoiceLineDef) -> Self {
        Self {
            voice: line.def_name.clone(),
            caption: line.caption.clone(),
        }
    }
}

#[derive(Debug)]
struct Playing {
    request: NarrationRequest,
    caption_lines: Vec<String>,
    remaining_seconds: f32,
}

/// FIFO voice-over playback. At most one request is playing; the next one
/// starts on the same tick the previous one ends.
#[derive(Debug, Default)]
pub(crate) struct NarrationQueue {
    pending: VecDeque<NarrationRequest>,
    playing: Option<Playing>,
}

impl NarrationQueue {
    pub(crate) fn enqueue(&mut self, request: NarrationRequest, audio: &mut dyn AudioSink) {
        debug!(voice = %request.voice, queued = self.pending.len(), "narration_enqueued");
        self.pending.push_back(request);
        if self.playing.is_none() {
            self.start_next(audio);
        }
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, audio: &mut dyn AudioSink) {
        let Some(playing) = self.playing.as_mut() else {
            return;
        };
        playing.remaining_seconds -= dt_seconds;
        if playing.remaining_seconds > 0.0 {
            return;
        }
        if let Some(done) = self.playing.take() {
            info!(voice = %done.request.voice, "narration_finished");
        }
        self.start_next(audio);
    }

    fn start_next(&mut self, audio: &mut dyn AudioSink) {
        let Some(request) = self.pending.pop_front() else {
            return;
        };
        let length = audio
            .play_voice(&request.voice)
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .unwrap_or(FALLBACK_VOICE_SECONDS);
        info!(voice = %request.voice, length_seconds = length, "narration_started");
        self.playing = Some(Playing {
            caption_lines: wrap_caption(&request.caption, CAPTION_MAX_CHARS),
            request,
            remaining_seconds: length,
        });
    }

    pub(crate) fn caption(&self) -> Option<&[String]> {
        self.playing
            .as_ref()
            .map(|playing| playing.caption_lines.as_slice())
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<&NarrationRequest> {
        self.playing.as_ref().map(|playing| &playing.request)
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.playing.is_none() && self.pending.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drops everything without finishing it.
    pub(crate) fn cancel_all(&mut self, audio: &mut dyn AudioSink) {
        if self.is_idle() {
            return;
        }
        let dropped = self.pending.len() + usize::from(self.playing.is_some());
        self.pending.clear();
        self.playing = None;
        audio.stop_voice();
        info!(dropped, "narration_cancelled");
    }
}

/// Greedy word wrap. Words longer than `max_chars` get a line to themselves.
pub(crate) fn wrap_caption(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
