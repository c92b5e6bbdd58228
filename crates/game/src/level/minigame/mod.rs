//! The four golden-horn minigames and the bridge that funnels their outcome
//! back into the level.

mod click_count;
mod drag_pull;
mod drag_sort;
mod timing_bar;

use engine::{InputAction, InputSnapshot, MinigameKind, Vec2};
use tracing::info;

use super::collectible::CollectibleId;
use super::routing::InputRouting;

pub(crate) use click_count::ClickCount;
pub(crate) use drag_pull::DragPull;
pub(crate) use drag_sort::DragSort;
pub(crate) use timing_bar::TimingBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MinigameStatus {
    Active,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MinigamePhase {
    Inactive,
    Active,
    Succeeded,
    Failed,
}

/// Minigame control set: a cursor move vector plus interact edges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MinigameInput {
    pub cursor_move: Vec2,
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl MinigameInput {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            cursor_move: input.move_vector(),
            pressed: input.was_pressed(InputAction::Interact),
            held: input.is_down(InputAction::Interact),
            released: input.was_released(InputAction::Interact),
        }
    }
}

/// Axis-aligned rectangle in minigame panel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PanelRect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl PanelRect {
    pub(crate) const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub(crate) fn overlaps(&self, other: &PanelRect) -> bool {
        (self.center.x - other.center.x).abs() < self.half_extents.x + other.half_extents.x
            && (self.center.y - other.center.y).abs() < self.half_extents.y + other.half_extents.y
    }
}

pub(crate) fn clamp_to_box(point: Vec2, half_extents: Vec2) -> Vec2 {
    Vec2::new(
        point.x.clamp(-half_extents.x, half_extents.x),
        point.y.clamp(-half_extents.y, half_extents.y),
    )
}

#[derive(Debug, Clone)]
pub(crate) enum ActiveMinigame {
    TimingBar(TimingBar),
    ClickCount(ClickCount),
    DragPull(DragPull),
    DragSort(DragSort),
}

impl ActiveMinigame {
    pub(crate) fn start(kind: MinigameKind) -> Self {
        match kind {
            MinigameKind::TimingBar => Self::TimingBar(TimingBar::default()),
            MinigameKind::ClickCount => Self::ClickCount(ClickCount::default()),
            MinigameKind::DragPull => Self::DragPull(DragPull::default()),
            MinigameKind::DragSort => Self::DragSort(DragSort::default()),
        }
    }

    pub(crate) fn kind(&self) -> MinigameKind {
        match self {
            Self::TimingBar(_) => MinigameKind::TimingBar,
            Self::ClickCount(_) => MinigameKind::ClickCount,
            Self::DragPull(_) => MinigameKind::DragPull,
            Self::DragSort(_) => MinigameKind::DragSort,
        }
    }

    fn update(&mut self, dt_seconds: f32, input: &MinigameInput) -> MinigameStatus {
        match self {
            Self::TimingBar(game) => game.update(dt_seconds, input),
            Self::ClickCount(game) => game.update(dt_seconds, input),
            Self::DragPull(game) => game.update(dt_seconds, input),
            Self::DragSort(game) => game.update(dt_seconds, input),
        }
    }

    pub(crate) fn status_lines(&self) -> Vec<String> {
        match self {
            Self::TimingBar(game) => game.status_lines(),
            Self::ClickCount(game) => game.status_lines(),
            Self::DragPull(game) => game.status_lines(),
            Self::DragSort(game) => game.status_lines(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MinigameResolution {
    Succeeded { proxy: CollectibleId },
    Failed { proxy: CollectibleId },
}

#[derive(Debug, Clone)]
struct MinigameSession {
    proxy: CollectibleId,
    game: ActiveMinigame,
}

/// Runs at most one minigame and owns the routing switch around it.
#[derive(Debug, Clone)]
pub(crate) struct MinigameBridge {
    phase: MinigamePhase,
    session: Option<MinigameSession>,
}

impl Default for MinigameBridge {
    fn default() -> Self {
        Self {
            phase: MinigamePhase::Inactive,
            session: None,
        }
    }
}

impl MinigameBridge {
    #[cfg(test)]
    pub(crate) fn phase(&self) -> MinigamePhase {
        self.phase
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase == MinigamePhase::Active
    }

    pub(crate) fn active_game(&self) -> Option<&ActiveMinigame> {
        self.session.as_ref().map(|session| &session.game)
    }

    /// Returns false if another minigame is already running.
    pub(crate) fn enter(
        &mut self,
        kind: MinigameKind,
        proxy: CollectibleId,
        routing: &mut InputRouting,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        self.session = Some(MinigameSession {
            proxy,
            game: ActiveMinigame::start(kind),
        });
        self.phase = MinigamePhase::Active;
        routing.enter_minigame();
        info!(minigame = kind.as_str(), proxy = proxy.0, "minigame_entered");
        true
    }

    /// Advances the running game on unscaled time. Routing goes back to the
    /// character set on either outcome.
    pub(crate) fn update(
        &mut self,
        dt_seconds: f32,
        input: &MinigameInput,
        routing: &mut InputRouting,
    ) -> Option<MinigameResolution> {
        let session = self.session.as_mut()?;
        let status = session.game.update(dt_seconds, input);
        let resolution = match status {
            MinigameStatus::Active => return None,
            MinigameStatus::Succeeded => MinigameResolution::Succeeded {
                proxy: session.proxy,
            },
            MinigameStatus::Failed => MinigameResolution::Failed {
                proxy: session.proxy,
            },
        };
        let kind = session.game.kind();
        self.session = None;
        self.phase = match resolution {
            MinigameResolution::Succeeded { .. } => MinigamePhase::Succeeded,
            MinigameResolution::Failed { .. } => MinigamePhase::Failed,
        };
        routing.exit_minigame();
        info!(minigame = kind.as_str(), phase = ?self.phase, "minigame_resolved");
        Some(resolution)
    }

    /// Drops a running game without reporting anything.
    pub(crate) fn cancel(&mut self, routing: &mut InputRouting) {
        if self.session.take().is_some() {
            routing.exit_minigame();
        }
        self.phase = MinigamePhase::Inactive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press() -> MinigameInput {
        MinigameInput {
            pressed: true,
            held: true,
            ..MinigameInput::default()
        }
    }

    #[test]
    fn enter_switches_routing_and_rejects_second_game() {
        let mut routing = InputRouting::default();
        let mut bridge = MinigameBridge::default();

        assert!(bridge.enter(MinigameKind::ClickCount, CollectibleId(4), &mut routing));
        assert_eq!(routing, InputRouting::Minigame);
        assert!(!bridge.enter(MinigameKind::TimingBar, CollectibleId(5), &mut routing));
        assert_eq!(
            bridge.active_game().map(ActiveMinigame::kind),
            Some(MinigameKind::ClickCount)
        );
    }

    #[test]
    fn timer_expiry_fails_and_restores_routing() {
        let mut routing = InputRouting::default();
        let mut bridge = MinigameBridge::default();
        bridge.enter(MinigameKind::ClickCount, CollectibleId(1), &mut routing);

        let mut resolution = None;
        for _ in 0..400 {
            resolution = bridge.update(1.0 / 60.0, &MinigameInput::default(), &mut routing);
            if resolution.is_some() {
                break;
            }
        }

        assert_eq!(
            resolution,
            Some(MinigameResolution::Failed {
                proxy: CollectibleId(1)
            })
        );
        assert_eq!(bridge.phase(), MinigamePhase::Failed);
        assert_eq!(routing, InputRouting::Character);
    }

    #[test]
    fn success_reports_proxy_once() {
        let mut routing = InputRouting::default();
        let mut bridge = MinigameBridge::default();
        bridge.enter(MinigameKind::ClickCount, CollectibleId(9), &mut routing);

        let mut resolutions = Vec::new();
        for _ in 0..30 {
            resolutions.extend(bridge.update(0.01, &press(), &mut routing));
        }
        assert_eq!(
            resolutions,
            vec![MinigameResolution::Succeeded {
                proxy: CollectibleId(9)
            }]
        );
        assert_eq!(bridge.phase(), MinigamePhase::Succeeded);
    }

    #[test]
    fn cancel_restores_routing_without_resolution() {
        let mut routing = InputRouting::default();
        let mut bridge = MinigameBridge::default();
        bridge.enter(MinigameKind::DragSort, CollectibleId(2), &mut routing);

        bridge.cancel(&mut routing);
        assert_eq!(bridge.phase(), MinigamePhase::Inactive);
        assert_eq!(routing, InputRouting::Character);
        assert!(bridge.update(1.0, &press(), &mut routing).is_none());
    }

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = PanelRect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = PanelRect::new(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
        let c = PanelRect::new(Vec2::new(19.0, 5.0), Vec2::new(10.0, 10.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }
}
