use super::collectible::CollectibleId;

pub(crate) const DEFAULT_CARRY_SPEED_MULTIPLIER: f32 = 0.6;

/// One-item hand slot on the player. Speed is derived from occupancy, so the
/// penalty can never stack or linger.
#[derive(Debug, Clone)]
pub(crate) struct CarrySlot {
    carried: Option<CollectibleId>,
    base_speed: f32,
    carry_multiplier: f32,
}

impl CarrySlot {
    pub(crate) fn new(base_speed: f32) -> Self {
        Self {
            carried: None,
            base_speed,
            carry_multiplier: DEFAULT_CARRY_SPEED_MULTIPLIER,
        }
    }

    pub(crate) fn carried(&self) -> Option<CollectibleId> {
        self.carried
    }

    pub(crate) fn is_carrying(&self) -> bool {
        self.carried.is_some()
    }

    pub(crate) fn current_speed(&self) -> f32 {
        if self.is_carrying() {
            self.base_speed * self.carry_multiplier
        } else {
            self.base_speed
        }
    }

    pub(crate) fn try_pick_up(&mut self, item: CollectibleId) -> bool {
        if self.carried.is_some() {
            return false;
        }
        self.carried = Some(item);
        true
    }

    pub(crate) fn deliver(&mut self) -> Option<CollectibleId> {
        self.carried.take()
    }

    /// Loss path; same effect as delivery but named for teardown call sites.
    pub(crate) fn release(&mut self) -> Option<CollectibleId> {
        self.carried.take()
    }
}
