use engine::Vec2;

/// The pointer floats this far above the player.
pub(crate) const ARROW_OFFSET_Y: f32 = 1.2;

const COMPASS: [&str; 8] = ["E", "NE", "N", "NW", "W", "SW", "S", "SE"];

/// Where the delivery point lies as seen from above the player's head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DeliveryHeading {
    /// Counter-clockwise from +x, in `[0, 360)`.
    pub degrees: f32,
    pub distance: f32,
}

impl DeliveryHeading {
    pub(crate) fn from_player(player: Vec2, delivery: Vec2) -> Self {
        let origin = player + Vec2::new(0.0, ARROW_OFFSET_Y);
        let delta = delivery - origin;
        Self {
            degrees: delta.y.atan2(delta.x).to_degrees().rem_euclid(360.0),
            distance: delta.length(),
        }
    }

    pub(crate) fn compass(&self) -> &'static str {
        let sector = ((self.degrees + 22.5) / 45.0).floor() as usize % COMPASS.len();
        COMPASS[sector]
    }

    pub(crate) fn text(&self) -> String {
        format!("Truck: {} {:.0}m", self.compass(), self.distance)
    }
}
