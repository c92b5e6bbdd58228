use tracing::info;

use super::audio::AudioSink;

pub(crate) const CONTINUE_PROMPT: &str = "Press E to continue";
const FADE_SECONDS: f32 = 0.5;
const DRIVE_SECONDS: f32 = 3.0;
const ENGINE_SETTLE_SECONDS: f32 = 0.5;
const TYPE_SECONDS_PER_CHAR: f32 = 0.05;
const PROMPT_FADE_SECONDS: f32 = 0.5;
const PROMPT_BLINK_CYCLE_SECONDS: f32 = 0.6;
const ENGINE_PITCH_START: f32 = 0.9;
const ENGINE_PITCH_END: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitStage {
    FadeOut(f32),
    Reveal(f32),
    Drive(f32),
    Settle(f32),
    Typing(f32),
    PromptFade(f32),
    AwaitContinue(f32),
    FadeToBlack(f32),
    Done,
}

/// Level-complete cutscene: fade, truck drive with engine ramp, typed
/// continue prompt, then one advance request after the player confirms.
#[derive(Debug, Clone)]
pub(crate) struct ExitSequence {
    stage: ExitStage,
}

impl Default for ExitSequence {
    fn default() -> Self {
        Self {
            stage: ExitStage::FadeOut(0.0),
        }
    }
}

impl ExitSequence {
    /// Returns true on the single tick the next level should load.
    pub(crate) fn update(
        &mut self,
        dt_seconds: f32,
        interact_pressed: bool,
        audio: &mut dyn AudioSink,
    ) -> bool {
        let (next, advance) = match self.stage {
            ExitStage::FadeOut(t) => (
                step(t + dt_seconds, FADE_SECONDS, ExitStage::FadeOut, ExitStage::Reveal(0.0)),
                false,
            ),
            ExitStage::Reveal(t) => {
                let t = t + dt_seconds;
                if t >= FADE_SECONDS {
                    audio.set_engine_pitch(ENGINE_PITCH_START);
                    (ExitStage::Drive(0.0), false)
                } else {
                    (ExitStage::Reveal(t), false)
                }
            }
            ExitStage::Drive(t) => {
                let t = t + dt_seconds;
                let progress = (t / DRIVE_SECONDS).min(1.0);
                audio.set_engine_pitch(
                    ENGINE_PITCH_START + (ENGINE_PITCH_END - ENGINE_PITCH_START) * progress,
                );
                (
                    step(t, DRIVE_SECONDS, ExitStage::Drive, ExitStage::Settle(0.0)),
                    false,
                )
            }
            ExitStage::Settle(t) => {
                let t = t + dt_seconds;
                if t >= ENGINE_SETTLE_SECONDS {
                    audio.stop_engine();
                    (ExitStage::Typing(0.0), false)
                } else {
                    (ExitStage::Settle(t), false)
                }
            }
            ExitStage::Typing(t) => {
                let typing_seconds =
                    CONTINUE_PROMPT.chars().count() as f32 * TYPE_SECONDS_PER_CHAR;
                let next = ExitStage::PromptFade(0.0);
                (
                    step(t + dt_seconds, typing_seconds, ExitStage::Typing, next),
                    false,
                )
            }
            ExitStage::PromptFade(t) => {
                let next = ExitStage::AwaitContinue(0.0);
                (
                    step(t + dt_seconds, PROMPT_FADE_SECONDS, ExitStage::PromptFade, next),
                    false,
                )
            }
            ExitStage::AwaitContinue(t) => {
                if interact_pressed {
                    info!("level_exit_confirmed");
                    (ExitStage::FadeToBlack(0.0), false)
                } else {
                    let t = (t + dt_seconds) % PROMPT_BLINK_CYCLE_SECONDS;
                    (ExitStage::AwaitContinue(t), false)
                }
            }
            ExitStage::FadeToBlack(t) => {
                let t = t + dt_seconds;
                if t >= FADE_SECONDS {
                    info!("level_advance_requested");
                    (ExitStage::Done, true)
                } else {
                    (ExitStage::FadeToBlack(t), false)
                }
            }
            ExitStage::Done => (ExitStage::Done, false),
        };
        self.stage = next;
        advance
    }

    #[cfg(test)]
    pub(crate) fn can_continue(&self) -> bool {
        matches!(self.stage, ExitStage::AwaitContinue(_))
    }

    pub(crate) fn screen_fade(&self) -> f32 {
        match self.stage {
            ExitStage::FadeOut(t) | ExitStage::FadeToBlack(t) => (t / FADE_SECONDS).min(1.0),
            ExitStage::Reveal(t) => 1.0 - (t / FADE_SECONDS).min(1.0),
            ExitStage::Done => 1.0,
            _ => 0.0,
        }
    }

    pub(crate) fn panel_visible(&self) -> bool {
        !matches!(self.stage, ExitStage::FadeOut(_))
    }

    /// Smoothstepped 0..1 position of the truck along its route.
    pub(crate) fn truck_progress(&self) -> f32 {
        match self.stage {
            ExitStage::FadeOut(_) | ExitStage::Reveal(_) => 0.0,
            ExitStage::Drive(t) => smoothstep((t / DRIVE_SECONDS).min(1.0)),
            _ => 1.0,
        }
    }

    /// Typed portion of the continue prompt with its opacity.
    pub(crate) fn prompt(&self) -> Option<(&'static str, f32)> {
        let full = CONTINUE_PROMPT;
        match self.stage {
            ExitStage::Typing(t) => {
                let typed = ((t / TYPE_SECONDS_PER_CHAR) as usize).min(full.len());
                Some((&full[..typed], 0.0))
            }
            ExitStage::PromptFade(t) => Some((full, (t / PROMPT_FADE_SECONDS).min(1.0))),
            ExitStage::AwaitContinue(t) => {
                let half = PROMPT_BLINK_CYCLE_SECONDS / 2.0;
                let alpha = if t < half { 1.0 - t / half } else { (t - half) / half };
                Some((full, alpha))
            }
            ExitStage::FadeToBlack(_) | ExitStage::Done => Some((full, 1.0)),
            _ => None,
        }
    }
}

fn step(t: f32, duration: f32, stay: fn(f32) -> ExitStage, next: ExitStage) -> ExitStage {
    if t >= duration {
        next
    } else {
        stay(t)
    }
}

fn smoothstep(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::audio::{AudioEvent, RecordingAudioSink};

    const TICK: f32 = 1.0 / 60.0;

    fn run_until_can_continue(exit: &mut ExitSequence, audio: &mut RecordingAudioSink) -> usize {
        let mut ticks = 0;
        while !exit.can_continue() && ticks < 2_000 {
            assert!(!exit.update(TICK, true, audio), "advance before prompt");
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn prompt_completes_before_continue_is_accepted() {
        let mut audio = RecordingAudioSink::default();
        let mut exit = ExitSequence::default();
        let ticks = run_until_can_continue(&mut exit, &mut audio);
        let expected_seconds = 0.5 + 0.5 + 3.0 + 0.5 + 19.0 * 0.05 + 0.5;
        assert!((ticks as f32 * TICK - expected_seconds).abs() < 0.2);
        assert_eq!(exit.prompt().map(|(text, _)| text), Some(CONTINUE_PROMPT));
        assert_eq!(exit.truck_progress(), 1.0);
    }

    #[test]
    fn advance_is_emitted_once_after_interact() {
        let mut audio = RecordingAudioSink::default();
        let mut exit = ExitSequence::default();
        run_until_can_continue(&mut exit, &mut audio);

        for _ in 0..30 {
            assert!(!exit.update(TICK, false, &mut audio));
        }
        assert!(exit.can_continue());

        let mut advances = 0;
        exit.update(TICK, true, &mut audio);
        for _ in 0..120 {
            if exit.update(TICK, true, &mut audio) {
                advances += 1;
            }
        }
        assert_eq!(advances, 1);
        assert_eq!(exit.screen_fade(), 1.0);
    }

    #[test]
    fn engine_pitch_ramps_then_stops() {
        let mut audio = RecordingAudioSink::default();
        let mut exit = ExitSequence::default();
        run_until_can_continue(&mut exit, &mut audio);

        let pitches: Vec<f32> = audio
            .events
            .iter()
            .filter_map(|event| match event {
                AudioEvent::EnginePitch(pitch) => Some(*pitch),
                _ => None,
            })
            .collect();
        assert_eq!(pitches.first().copied(), Some(ENGINE_PITCH_START));
        assert!(pitches.windows(2).all(|pair| pair[1] >= pair[0]));
        assert!((pitches.last().copied().unwrap_or_default() - ENGINE_PITCH_END).abs() < 1e-4);
        assert_eq!(
            audio.events.iter().filter(|e| **e == AudioEvent::StopEngine).count(),
            1
        );
    }

    #[test]
    fn fades_cover_screen_then_reveal_panel() {
        let mut audio = RecordingAudioSink::default();
        let mut exit = ExitSequence::default();
        assert!(!exit.panel_visible());
        for _ in 0..31 {
            exit.update(TICK, false, &mut audio);
        }
        assert!(exit.panel_visible());
        assert!(exit.screen_fade() > 0.9);
    }
}
