use engine::{FailZoneDef, InputAction, InputSnapshot, Vec2};
use tracing::{info, warn};

pub(crate) const TIMER_WARNING_SECONDS: f32 = 60.0;
pub(crate) const FAIL_ZONE_DELAY_SECONDS: f32 = 0.5;

/// Countdown for the whole level. Expiry is reported once.
#[derive(Debug, Clone)]
pub(crate) struct LevelTimer {
    remaining_seconds: f32,
    expired: bool,
}

impl LevelTimer {
    pub(crate) fn new(limit_seconds: f32) -> Self {
        Self {
            remaining_seconds: limit_seconds.max(0.0),
            expired: false,
        }
    }

    /// True on the one tick the timer runs out.
    pub(crate) fn update(&mut self, dt_seconds: f32) -> bool {
        if self.expired {
            return false;
        }
        self.remaining_seconds = (self.remaining_seconds - dt_seconds).max(0.0);
        if self.remaining_seconds > 0.0 {
            return false;
        }
        self.expired = true;
        info!("level_timer_expired");
        true
    }

    #[cfg(test)]
    pub(crate) fn remaining_seconds(&self) -> f32 {
        self.remaining_seconds
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.remaining_seconds <= TIMER_WARNING_SECONDS
    }

    pub(crate) fn text(&self) -> String {
        let whole = self.remaining_seconds.floor() as u32;
        format!("Remaining: {:02}:{:02}", whole / 60, whole % 60)
    }
}

/// NPC watch zones. Dormant until the level arms them.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailZones {
    zones: Vec<FailZoneDef>,
    armed: bool,
    dwell_seconds: Option<f32>,
    fired: bool,
}

impl FailZones {
    pub(crate) fn new(zones: Vec<FailZoneDef>) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }

    pub(crate) fn arm(&mut self) {
        if !self.armed && !self.zones.is_empty() {
            self.armed = true;
            info!(zone_count = self.zones.len(), "fail_zones_armed");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, player_position: Vec2) -> bool {
        if !self.armed || self.fired {
            return false;
        }
        let inside = self
            .zones
            .iter()
            .any(|zone| contains(zone, player_position));
        if !inside {
            self.dwell_seconds = None;
            return false;
        }
        let dwell = match self.dwell_seconds {
            None => 0.0,
            Some(elapsed) => elapsed + dt_seconds,
        };
        self.dwell_seconds = Some(dwell);
        if dwell < FAIL_ZONE_DELAY_SECONDS {
            return false;
        }
        self.fired = true;
        warn!("fail_zone_triggered");
        true
    }

    pub(crate) fn reset(&mut self) {
        self.armed = false;
        self.dwell_seconds = None;
        self.fired = false;
    }
}

fn contains(zone: &FailZoneDef, point: Vec2) -> bool {
    (point.x - zone.center.x).abs() <= zone.half_extents.x
        && (point.y - zone.center.y).abs() <= zone.half_extents.y
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailReason {
    TimerExpired,
    MinigameFailed,
    CaughtInZone,
}

impl FailReason {
    pub(crate) fn headline(self) -> &'static str {
        match self {
            FailReason::TimerExpired => "Out of time!",
            FailReason::MinigameFailed => "The golden horn slipped away!",
            FailReason::CaughtInZone => "You were spotted!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailChoice {
    Restart,
    MainMenu,
}

impl FailChoice {
    pub(crate) fn label(self) -> &'static str {
        match self {
            FailChoice::Restart => "Restart level",
            FailChoice::MainMenu => "Main menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailPanelEvent {
    SelectionMoved,
    Chosen(FailChoice),
}

/// Modal level-fail panel. While shown, the level is paused and only this
/// panel reads input.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailPanel {
    shown: Option<FailReason>,
    selected: usize,
}

impl FailPanel {
    pub(crate) const CHOICES: [FailChoice; 2] = [FailChoice::Restart, FailChoice::MainMenu];

    /// Returns false when the panel is already up; the first reason wins.
    pub(crate) fn show(&mut self, reason: FailReason) -> bool {
        if self.shown.is_some() {
            return false;
        }
        warn!(reason = ?reason, "level_failed");
        self.shown = Some(reason);
        self.selected = 0;
        true
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub(crate) fn reason(&self) -> Option<FailReason> {
        self.shown
    }

    pub(crate) fn selected(&self) -> FailChoice {
        Self::CHOICES[self.selected]
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot) -> Option<FailPanelEvent> {
        self.shown?;
        if input.was_pressed(InputAction::Interact) {
            let choice = self.selected();
            info!(choice = choice.label(), "fail_panel_choice");
            return Some(FailPanelEvent::Chosen(choice));
        }
        let step = if input.was_pressed(InputAction::MoveUp) {
            Self::CHOICES.len() - 1
        } else if input.was_pressed(InputAction::MoveDown) {
            1
        } else {
            return None;
        };
        self.selected = (self.selected + step) % Self::CHOICES.len();
        Some(FailPanelEvent::SelectionMoved)
    }

    pub(crate) fn hide(&mut self) {
        self.shown = None;
        self.selected = 0;
    }
}
