use engine::Vec2;
use tracing::{debug, info};

use super::carry::CarrySlot;
use super::collectible::CollectibleId;

const BLINK_FADE_SECONDS: f32 = 0.5;
const BLINK_HOLD_SECONDS: f32 = 0.1;
const BLINK_CYCLE_SECONDS: f32 = 2.0 * (BLINK_FADE_SECONDS + BLINK_HOLD_SECONDS);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateState {
    Idle,
    AwaitingDelivery,
    ReadyToFinish,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateOutcome {
    /// Player is outside the zone; the press belongs to someone else.
    NotInside,
    Delivered(CollectibleId),
    Rejected,
    Finished,
    Ignored,
}

#[derive(Debug, Clone)]
pub(crate) struct DeliveryGate {
    center: Vec2,
    radius: f32,
    state: GateState,
    blink_elapsed: f32,
}

impl DeliveryGate {
    pub(crate) fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            state: GateState::Idle,
            blink_elapsed: 0.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> GateState {
        self.state
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, player_position: Vec2, all_complete: bool) {
        if self.state == GateState::Finished {
            return;
        }
        let inside = player_position.distance(self.center) <= self.radius;
        let next = match (self.state, inside) {
            (_, false) => GateState::Idle,
            (_, true) if all_complete => GateState::ReadyToFinish,
            (_, true) => GateState::AwaitingDelivery,
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "delivery_gate_state_changed");
            self.state = next;
            self.blink_elapsed = 0.0;
        }
        if self.state == GateState::ReadyToFinish {
            self.blink_elapsed = (self.blink_elapsed + dt_seconds) % BLINK_CYCLE_SECONDS;
        }
    }

    /// `all_complete` is read fresh so a press landing on the tick the last
    /// task completes still finishes.
    pub(crate) fn interact(&mut self, all_complete: bool, carry: &mut CarrySlot) -> GateOutcome {
        match self.state {
            GateState::Finished => GateOutcome::Ignored,
            GateState::Idle => GateOutcome::NotInside,
            GateState::AwaitingDelivery | GateState::ReadyToFinish if all_complete => {
                self.state = GateState::Finished;
                info!("level_complete");
                GateOutcome::Finished
            }
            GateState::AwaitingDelivery | GateState::ReadyToFinish => match carry.deliver() {
                Some(item) => GateOutcome::Delivered(item),
                None => GateOutcome::Rejected,
            },
        }
    }

    /// Opacity of the "finish" prompt; `None` while it is hidden.
    pub(crate) fn prompt_alpha(&self) -> Option<f32> {
        if self.state != GateState::ReadyToFinish {
            return None;
        }
        Some(blink_alpha(self.blink_elapsed))
    }
}

fn blink_alpha(t: f32) -> f32 {
    let fade_out_start = BLINK_FADE_SECONDS + BLINK_HOLD_SECONDS;
    let fade_out_end = fade_out_start + BLINK_FADE_SECONDS;
    if t < BLINK_FADE_SECONDS {
        t / BLINK_FADE_SECONDS
    } else if t < fade_out_start {
        1.0
    } else if t < fade_out_end {
        1.0 - (t - fade_out_start) / BLINK_FADE_SECONDS
    } else {
        0.0
    }
}
