use engine::{CollectibleCategory, EntityId, InteractionDef, MinigameKind, Vec2};

use super::carry::CarrySlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CollectibleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CollectibleKind {
    Instant,
    Carryable,
    GoldenHorn,
    MinigameProxy(MinigameKind),
}

impl CollectibleKind {
    pub(crate) fn from_interaction(interaction: InteractionDef) -> (CollectibleCategory, Self) {
        match interaction {
            InteractionDef::Collectible(CollectibleCategory::InstantTrash) => {
                (CollectibleCategory::InstantTrash, CollectibleKind::Instant)
            }
            InteractionDef::Collectible(CollectibleCategory::CarryTrash) => {
                (CollectibleCategory::CarryTrash, CollectibleKind::Carryable)
            }
            InteractionDef::Collectible(CollectibleCategory::GoldenHorn) => {
                (CollectibleCategory::GoldenHorn, CollectibleKind::GoldenHorn)
            }
            InteractionDef::Minigame(kind) => (
                CollectibleCategory::GoldenHorn,
                CollectibleKind::MinigameProxy(kind),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CollectibleState {
    InWorld,
    Carried,
    /// A minigame proxy whose game is running or has failed.
    Engaged,
    Collected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InteractOutcome {
    Collected(CollectibleCategory),
    PickedUp,
    PickupRejected,
    StartMinigame(MinigameKind),
    Ignored,
}

#[derive(Debug, Clone)]
pub(crate) struct Collectible {
    pub id: CollectibleId,
    pub category: CollectibleCategory,
    pub kind: CollectibleKind,
    pub position: Vec2,
    pub interaction_radius: f32,
    pub state: CollectibleState,
    pub entity: Option<EntityId>,
}

impl Collectible {
    /// Single dispatch point for every collectible flavor.
    pub(crate) fn interact(&mut self, carry: &mut CarrySlot) -> InteractOutcome {
        if self.state != CollectibleState::InWorld {
            return InteractOutcome::Ignored;
        }
        match self.kind {
            CollectibleKind::Instant | CollectibleKind::GoldenHorn => {
                self.state = CollectibleState::Collected;
                InteractOutcome::Collected(self.category)
            }
            CollectibleKind::Carryable => {
                if carry.try_pick_up(self.id) {
                    self.state = CollectibleState::Carried;
                    InteractOutcome::PickedUp
                } else {
                    InteractOutcome::PickupRejected
                }
            }
            CollectibleKind::MinigameProxy(kind) => {
                self.state = CollectibleState::Engaged;
                InteractOutcome::StartMinigame(kind)
            }
        }
    }

    fn in_reach(&self, point: Vec2) -> bool {
        self.state == CollectibleState::InWorld
            && self.position.distance(point) <= self.interaction_radius
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CollectibleSet {
    items: Vec<Collectible>,
}

impl CollectibleSet {
    pub(crate) fn push(
        &mut self,
        interaction: InteractionDef,
        position: Vec2,
        interaction_radius: f32,
        entity: Option<EntityId>,
    ) -> CollectibleId {
        let id = CollectibleId(self.items.len() as u32);
        let (category, kind) = CollectibleKind::from_interaction(interaction);
        self.items.push(Collectible {
            id,
            category,
            kind,
            position,
            interaction_radius,
            state: CollectibleState::InWorld,
            entity,
        });
        id
    }

    pub(crate) fn get(&self, id: CollectibleId) -> Option<&Collectible> {
        self.items.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: CollectibleId) -> Option<&mut Collectible> {
        self.items.get_mut(id.0 as usize)
    }

    /// Closest in-world collectible whose radius covers `point`.
    pub(crate) fn nearest_in_reach(&self, point: Vec2) -> Option<CollectibleId> {
        self.items
            .iter()
            .filter(|item| item.in_reach(point))
            .min_by(|a, b| {
                a.position
                    .distance(point)
                    .total_cmp(&b.position.distance(point))
            })
            .map(|item| item.id)
    }
}
