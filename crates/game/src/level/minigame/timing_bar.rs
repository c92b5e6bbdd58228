use super::{MinigameInput, MinigameStatus};

pub(crate) const BAR_HALF_WIDTH: f32 = 300.0;
pub(crate) const LINE_SPEED: f32 = 300.0;
const DEFAULT_ZONE_CENTER: f32 = 150.0;
const DEFAULT_ZONE_WIDTH: f32 = 80.0;
const BAR_TEXT_CELLS: usize = 31;

/// A line sweeps across the bar and bounces at both ends; one press decides.
#[derive(Debug, Clone)]
pub(crate) struct TimingBar {
    line_x: f32,
    moving_right: bool,
    zone_center: f32,
    zone_width: f32,
}

impl Default for TimingBar {
    fn default() -> Self {
        Self::with_zone(DEFAULT_ZONE_CENTER, DEFAULT_ZONE_WIDTH)
    }
}

impl TimingBar {
    pub(crate) fn with_zone(zone_center: f32, zone_width: f32) -> Self {
        Self {
            line_x: -BAR_HALF_WIDTH,
            moving_right: true,
            zone_center,
            zone_width,
        }
    }

    #[cfg(test)]
    pub(crate) fn line_x(&self) -> f32 {
        self.line_x
    }

    pub(crate) fn zone_bounds(&self) -> (f32, f32) {
        let half = self.zone_width / 2.0;
        (self.zone_center - half, self.zone_center + half)
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &MinigameInput) -> MinigameStatus {
        if input.pressed {
            let (min, max) = self.zone_bounds();
            return if (min..=max).contains(&self.line_x) {
                MinigameStatus::Succeeded
            } else {
                MinigameStatus::Failed
            };
        }

        let step = LINE_SPEED * dt_seconds;
        if self.moving_right {
            self.line_x += step;
            if self.line_x >= BAR_HALF_WIDTH {
                self.line_x = BAR_HALF_WIDTH;
                self.moving_right = false;
            }
        } else {
            self.line_x -= step;
            if self.line_x <= -BAR_HALF_WIDTH {
                self.line_x = -BAR_HALF_WIDTH;
                self.moving_right = true;
            }
        }
        MinigameStatus::Active
    }

    pub(crate) fn status_lines(&self) -> Vec<String> {
        let cell_of = |x: f32| {
            let t = (x + BAR_HALF_WIDTH) / (BAR_HALF_WIDTH * 2.0);
            ((t * (BAR_TEXT_CELLS - 1) as f32).round() as usize).min(BAR_TEXT_CELLS - 1)
        };
        let (zone_min, zone_max) = self.zone_bounds();
        let zone = cell_of(zone_min)..=cell_of(zone_max);
        let line = cell_of(self.line_x);
        let bar: String = (0..BAR_TEXT_CELLS)
            .map(|cell| match cell {
                _ if cell == line => '|',
                _ if zone.contains(&cell) => '=',
                _ => '-',
            })
            .collect();
        vec![
            "Stop the line in the zone".to_string(),
            format!("[{bar}]"),
            "Press E".to_string(),
        ]
    }
}
