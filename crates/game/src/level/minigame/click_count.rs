use super::{MinigameInput, MinigameStatus};

pub(crate) const REQUIRED_CLICKS: u32 = 20;
pub(crate) const TIME_LIMIT_SECONDS: f32 = 5.0;

#[derive(Debug, Clone)]
pub(crate) struct ClickCount {
    clicks: u32,
    remaining_seconds: f32,
}

impl Default for ClickCount {
    fn default() -> Self {
        Self {
            clicks: 0,
            remaining_seconds: TIME_LIMIT_SECONDS,
        }
    }
}

impl ClickCount {
    #[cfg(test)]
    pub(crate) fn clicks(&self) -> u32 {
        self.clicks
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &MinigameInput) -> MinigameStatus {
        if input.pressed {
            self.clicks += 1;
            if self.clicks >= REQUIRED_CLICKS {
                return MinigameStatus::Succeeded;
            }
        }
        self.remaining_seconds -= dt_seconds;
        if self.remaining_seconds <= 0.0 {
            self.remaining_seconds = 0.0;
            return MinigameStatus::Failed;
        }
        MinigameStatus::Active
    }

    pub(crate) fn status_lines(&self) -> Vec<String> {
        vec![
            "Mash E!".to_string(),
            format!("Clicks: {}/{}", self.clicks, REQUIRED_CLICKS),
            format!("{:.2}s", self.remaining_seconds.max(0.0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    fn press() -> MinigameInput {
        MinigameInput {
            pressed: true,
            held: true,
            ..MinigameInput::default()
        }
    }

    #[test]
    fn twenty_presses_in_time_succeed() {
        let mut game = ClickCount::default();
        for _ in 0..REQUIRED_CLICKS - 1 {
            assert_eq!(game.update(TICK, &press()), MinigameStatus::Active);
            assert_eq!(game.update(TICK, &MinigameInput::default()), MinigameStatus::Active);
        }
        assert_eq!(game.clicks(), REQUIRED_CLICKS - 1);
        assert_eq!(game.update(TICK, &press()), MinigameStatus::Succeeded);
    }

    #[test]
    fn expiry_fails_with_clicks_short() {
        let mut game = ClickCount::default();
        game.update(TICK, &press());
        let mut status = MinigameStatus::Active;
        let mut ticks = 0;
        while status == MinigameStatus::Active {
            status = game.update(TICK, &MinigameInput::default());
            ticks += 1;
        }
        assert_eq!(status, MinigameStatus::Failed);
        assert!((299..=301).contains(&ticks), "ticks={ticks}");
        assert_eq!(game.status_lines()[2], "0.00s");
    }
}
