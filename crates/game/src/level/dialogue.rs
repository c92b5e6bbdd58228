use engine::{DialogueDef, Vec2};
use tracing::{debug, info};

use super::audio::AudioSink;

pub(crate) const DEFAULT_LINE_SECONDS: f32 = 3.0;
const PAN_SECONDS: f32 = 0.5;
const FOCUS_HOLD_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Speaking {
        index: usize,
        elapsed: f32,
        duration: f32,
    },
    Pause {
        index: usize,
        remaining: f32,
    },
    PanOut {
        elapsed: f32,
    },
    Hold {
        elapsed: f32,
    },
    PanBack {
        elapsed: f32,
    },
    Done,
}

/// Plays one NPC conversation: each line is voiced and revealed, followed by
/// its pause, then the camera visits the focus point and returns.
#[derive(Debug, Clone)]
pub(crate) struct DialoguePlayer {
    dialogue: DialogueDef,
    home: Vec2,
    stage: Stage,
}

impl DialoguePlayer {
    pub(crate) fn start(dialogue: DialogueDef, home: Vec2, audio: &mut dyn AudioSink) -> Self {
        info!(dialogue = %dialogue.def_name, lines = dialogue.lines.len(), "dialogue_started");
        let mut player = Self {
            dialogue,
            home,
            stage: Stage::Done,
        };
        player.stage = if player.dialogue.lines.is_empty() {
            player.after_lines()
        } else {
            player.begin_line(0, audio)
        };
        player
    }

    fn begin_line(&self, index: usize, audio: &mut dyn AudioSink) -> Stage {
        let duration = self.dialogue.lines[index]
            .voice
            .as_deref()
            .and_then(|voice| audio.play_voice(voice))
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .unwrap_or(DEFAULT_LINE_SECONDS);
        debug!(index, duration_seconds = duration, "dialogue_line_started");
        Stage::Speaking {
            index,
            elapsed: 0.0,
            duration,
        }
    }

    fn after_lines(&self) -> Stage {
        if self.dialogue.camera_focus.is_some() {
            Stage::PanOut { elapsed: 0.0 }
        } else {
            Stage::Done
        }
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, audio: &mut dyn AudioSink) {
        if self.stage == Stage::Done {
            return;
        }
        self.stage = match self.stage {
            Stage::Speaking {
                index,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed + dt_seconds;
                if elapsed >= duration {
                    Stage::Pause {
                        index,
                        remaining: self.dialogue.lines[index].delay_after_seconds,
                    }
                } else {
                    Stage::Speaking {
                        index,
                        elapsed,
                        duration,
                    }
                }
            }
            Stage::Pause { index, remaining } => {
                let remaining = remaining - dt_seconds;
                if remaining > 0.0 {
                    Stage::Pause { index, remaining }
                } else if index + 1 < self.dialogue.lines.len() {
                    self.begin_line(index + 1, audio)
                } else {
                    self.after_lines()
                }
            }
            Stage::PanOut { elapsed } => {
                let elapsed = elapsed + dt_seconds;
                if elapsed >= PAN_SECONDS {
                    Stage::Hold { elapsed: 0.0 }
                } else {
                    Stage::PanOut { elapsed }
                }
            }
            Stage::Hold { elapsed } => {
                let elapsed = elapsed + dt_seconds;
                if elapsed >= FOCUS_HOLD_SECONDS {
                    Stage::PanBack { elapsed: 0.0 }
                } else {
                    Stage::Hold { elapsed }
                }
            }
            Stage::PanBack { elapsed } => {
                let elapsed = elapsed + dt_seconds;
                if elapsed >= PAN_SECONDS {
                    Stage::Done
                } else {
                    Stage::PanBack { elapsed }
                }
            }
            Stage::Done => Stage::Done,
        };
        if self.stage == Stage::Done {
            info!(dialogue = %self.dialogue.def_name, "dialogue_finished");
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Speaker and the part of the line revealed so far.
    pub(crate) fn caption(&self) -> Option<(&str, String)> {
        let Stage::Speaking {
            index,
            elapsed,
            duration,
        } = self.stage
        else {
            return None;
        };
        let line = &self.dialogue.lines[index];
        let total = line.text.chars().count();
        let shown = ((elapsed / duration).clamp(0.0, 1.0) * total as f32).ceil() as usize;
        Some((
            line.speaker.as_str(),
            line.text.chars().take(shown.max(1)).collect(),
        ))
    }

    /// Camera override while panning to the focus point.
    pub(crate) fn camera(&self) -> Option<Vec2> {
        let focus = self.dialogue.camera_focus?;
        match self.stage {
            Stage::PanOut { elapsed } => Some(self.home.lerp(focus, elapsed / PAN_SECONDS)),
            Stage::Hold { .. } => Some(focus),
            Stage::PanBack { elapsed } => Some(focus.lerp(self.home, elapsed / PAN_SECONDS)),
            _ => None,
        }
    }

    pub(crate) fn cancel(&mut self, audio: &mut dyn AudioSink) {
        if matches!(self.stage, Stage::Speaking { .. }) {
            audio.stop_voice();
        }
        if self.stage != Stage::Done {
            info!(dialogue = %self.dialogue.def_name, "dialogue_cancelled");
            self.stage = Stage::Done;
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::DialogueLineDef;

    use super::*;
    use crate::level::audio::RecordingAudioSink;

    fn dialogue(focus: Option<Vec2>) -> DialogueDef {
        DialogueDef {
            def_name: "dialogue.test".to_string(),
            lines: vec![
                DialogueLineDef {
                    speaker: "Gus".to_string(),
                    text: "Hello there".to_string(),
                    voice: Some("voice.hello".to_string()),
                    delay_after_seconds: 0.5,
                },
                DialogueLineDef {
                    speaker: "You".to_string(),
                    text: "Hi".to_string(),
                    voice: None,
                    delay_after_seconds: 1.0,
                },
            ],
            camera_focus: focus,
        }
    }

    fn run(player: &mut DialoguePlayer, audio: &mut RecordingAudioSink, seconds: f32) {
        let ticks = (seconds / 0.05).round() as usize;
        for _ in 0..ticks {
            player.update(0.05, audio);
        }
    }

    #[test]
    fn lines_play_in_order_with_voice_lengths() {
        let mut audio = RecordingAudioSink::default().with_voice_length("voice.hello", 1.0);
        let mut player = DialoguePlayer::start(dialogue(None), Vec2::ZERO, &mut audio);
        assert_eq!(player.caption().map(|(speaker, _)| speaker), Some("Gus"));

        run(&mut player, &mut audio, 1.2);
        assert!(player.caption().is_none());
        run(&mut player, &mut audio, 0.5);
        assert_eq!(player.caption().map(|(speaker, _)| speaker), Some("You"));

        run(&mut player, &mut audio, 4.1);
        assert!(player.is_finished());
        assert_eq!(audio.voices(), vec!["voice.hello".to_string()]);
    }

    #[test]
    fn caption_reveals_progressively() {
        let mut audio = RecordingAudioSink::default().with_voice_length("voice.hello", 1.0);
        let mut player = DialoguePlayer::start(dialogue(None), Vec2::ZERO, &mut audio);
        run(&mut player, &mut audio, 0.5);
        let (_, partial) = player.caption().expect("speaking");
        assert!(partial.len() < "Hello there".len());
        assert!("Hello there".starts_with(&partial));
    }

    #[test]
    fn camera_pans_to_focus_and_back() {
        let focus = Vec2::new(10.0, 0.0);
        let mut audio = RecordingAudioSink::default().with_voice_length("voice.hello", 1.0);
        let mut player = DialoguePlayer::start(dialogue(Some(focus)), Vec2::ZERO, &mut audio);
        let mut ticks = 0;
        while player.camera().is_none() && ticks < 300 {
            player.update(0.05, &mut audio);
            ticks += 1;
        }
        assert!(player.camera().is_some());
        run(&mut player, &mut audio, 0.6);
        assert_eq!(player.camera(), Some(focus));
        run(&mut player, &mut audio, 2.0);
        assert!(player.is_finished());
        assert_eq!(player.camera(), None);
    }

    #[test]
    fn cancel_stops_voice() {
        let mut audio = RecordingAudioSink::default();
        let mut player = DialoguePlayer::start(dialogue(None), Vec2::ZERO, &mut audio);
        player.cancel(&mut audio);
        assert!(player.is_finished());
        assert_eq!(
            audio.events.last(),
            Some(&crate::level::audio::AudioEvent::StopVoice)
        );
    }
}
