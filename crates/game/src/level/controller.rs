use engine::{
    CollectibleCategory, DialogueDef, EntityId, InputAction, InputSnapshot, RenderableDesc,
    SceneWorld, Transform, Vec2,
};
use tracing::{debug, info};

use super::arrow::DeliveryHeading;
use super::audio::{AudioSink, SoundCue};
use super::carry::CarrySlot;
use super::collectible::{CollectibleId, CollectibleSet, CollectibleState, InteractOutcome};
use super::delivery::{DeliveryGate, GateOutcome};
use super::dialogue::DialoguePlayer;
use super::exit::ExitSequence;
use super::hazards::{FailChoice, FailPanel, FailPanelEvent, FailReason, FailZones, LevelTimer};
use super::ledger::TaskLedger;
use super::minigame::{MinigameBridge, MinigameInput, MinigameResolution};
use super::narration::NarrationQueue;
use super::pause::{PauseEvent, PauseMenu};
use super::plan::{LevelPlan, Visual};
use super::routing::InputRouting;

const CARRY_OFFSET: Vec2 = Vec2::new(0.0, 0.6);

/// What the level asks of its scene after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LevelSignal {
    Continue,
    Restart,
    Advance(Option<String>),
    QuitToMenu,
    Quit,
}

#[derive(Debug, Clone)]
struct Npc {
    label: String,
    position: Vec2,
    interaction_radius: f32,
    dialogue: Option<DialogueDef>,
}

/// Owns every piece of level state and drives one tick of it. Collaborators
/// receive what they need as `&mut` arguments.
pub(crate) struct LevelController<A: AudioSink> {
    def_name: String,
    label: String,
    next_level: Option<String>,
    audio: A,
    routing: InputRouting,
    player_position: Vec2,
    player_entity: Option<EntityId>,
    carry: CarrySlot,
    collectibles: CollectibleSet,
    ledger: TaskLedger,
    narration: NarrationQueue,
    gate: DeliveryGate,
    bridge: MinigameBridge,
    timer: LevelTimer,
    fail_zones: FailZones,
    fail_panel: FailPanel,
    pause: PauseMenu,
    npcs: Vec<Npc>,
    dialogue: Option<DialoguePlayer>,
    exit: Option<ExitSequence>,
    pending_despawns: Vec<EntityId>,
    plan: LevelPlan,
}

impl<A: AudioSink> LevelController<A> {
    pub(crate) fn new(plan: LevelPlan, audio: A) -> Self {
        let mut collectibles = CollectibleSet::default();
        for placed in &plan.collectibles {
            collectibles.push(
                placed.interaction,
                placed.position,
                placed.interaction_radius,
                None,
            );
        }
        let npcs = plan
            .npcs
            .iter()
            .map(|npc| Npc {
                label: npc.label.clone(),
                position: npc.position,
                interaction_radius: npc.interaction_radius,
                dialogue: npc.dialogue.clone(),
            })
            .collect();
        info!(
            level = %plan.def_name,
            collectibles = plan.collectibles.len(),
            npcs = plan.npcs.len(),
            time_limit_seconds = plan.time_limit_seconds,
            "level_started"
        );
        Self {
            def_name: plan.def_name.clone(),
            label: plan.label.clone(),
            next_level: plan.next_level.clone(),
            audio,
            routing: InputRouting::default(),
            player_position: plan.player_spawn,
            player_entity: None,
            carry: CarrySlot::new(plan.player_speed),
            collectibles,
            ledger: TaskLedger::new(
                &plan.tasks,
                plan.first_trash_line.clone(),
                plan.golden_horn_line.clone(),
            ),
            narration: NarrationQueue::default(),
            gate: DeliveryGate::new(plan.delivery_position, plan.delivery_radius),
            bridge: MinigameBridge::default(),
            timer: LevelTimer::new(plan.time_limit_seconds),
            fail_zones: FailZones::new(plan.fail_zones.clone()),
            fail_panel: FailPanel::default(),
            pause: PauseMenu::default(),
            npcs,
            dialogue: None,
            exit: None,
            pending_despawns: Vec::new(),
            plan,
        }
    }

    /// Spawns the level's entities and records their handles.
    pub(crate) fn spawn_into(&mut self, world: &mut SceneWorld) {
        let plan = &self.plan;
        for prop in &plan.props {
            world.spawn(transform(prop.position), renderable(&prop.visual, "prop"));
        }
        world.spawn(
            transform(plan.delivery_position),
            renderable(&plan.delivery_visual, "delivery"),
        );
        for npc in &plan.npcs {
            world.spawn(transform(npc.position), renderable(&npc.visual, "npc"));
        }
        for (index, placed) in plan.collectibles.iter().enumerate() {
            let entity = world.spawn(
                transform(placed.position),
                renderable(&placed.visual, "collectible"),
            );
            if let Some(item) = self.collectibles.get_mut(CollectibleId(index as u32)) {
                item.entity = Some(entity);
            }
        }
        self.player_entity = Some(world.spawn(
            transform(self.player_position),
            renderable(&plan.player_visual, "player"),
        ));
        world.camera_mut().position = self.player_position;
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &InputSnapshot) -> LevelSignal {
        if self.fail_panel.is_visible() {
            return self.update_fail_panel(input);
        }
        if let Some(event) = self.pause.update(input) {
            self.audio.play_cue(SoundCue::UiClick);
            if event == PauseEvent::QuitChosen {
                return LevelSignal::Quit;
            }
            return LevelSignal::Continue;
        }
        if self.pause.is_open() {
            return LevelSignal::Continue;
        }

        self.narration.update(dt_seconds, &mut self.audio);

        if let Some(exit) = self.exit.as_mut() {
            let interact = input.was_pressed(InputAction::Interact);
            if exit.update(dt_seconds, interact, &mut self.audio) {
                info!(level = %self.def_name, next = ?self.next_level, "level_advance");
                return LevelSignal::Advance(self.next_level.clone());
            }
            return LevelSignal::Continue;
        }

        if self.bridge.is_active() {
            let minigame_input = MinigameInput::from_snapshot(input);
            if let Some(resolution) =
                self.bridge
                    .update(dt_seconds, &minigame_input, &mut self.routing)
            {
                self.apply_minigame_resolution(resolution);
            }
            return LevelSignal::Continue;
        }

        if self.timer.update(dt_seconds) {
            self.fail(FailReason::TimerExpired);
            return LevelSignal::Continue;
        }
        if self.fail_zones.update(dt_seconds, self.player_position) {
            self.fail(FailReason::CaughtInZone);
            return LevelSignal::Continue;
        }

        if let Some(dialogue) = self.dialogue.as_mut() {
            dialogue.update(dt_seconds, &mut self.audio);
            if dialogue.is_finished() {
                self.dialogue = None;
                self.routing.exit_cutscene();
            }
        }

        if self.routing.character_enabled() {
            let direction = input.move_vector();
            self.player_position += direction * (self.carry.current_speed() * dt_seconds);
        }
        self.gate.update(
            dt_seconds,
            self.player_position,
            self.ledger.are_all_tasks_completed(),
        );

        if self.routing.character_enabled() && input.was_pressed(InputAction::Interact) {
            self.interact();
        }
        LevelSignal::Continue
    }

    fn update_fail_panel(&mut self, input: &InputSnapshot) -> LevelSignal {
        match self.fail_panel.update(input) {
            Some(FailPanelEvent::SelectionMoved) => {
                self.audio.play_cue(SoundCue::UiClick);
                LevelSignal::Continue
            }
            Some(FailPanelEvent::Chosen(choice)) => {
                self.audio.play_cue(SoundCue::UiClick);
                match choice {
                    FailChoice::Restart => LevelSignal::Restart,
                    FailChoice::MainMenu => LevelSignal::QuitToMenu,
                }
            }
            None => LevelSignal::Continue,
        }
    }

    fn fail(&mut self, reason: FailReason) {
        if self.fail_panel.show(reason) {
            self.dialogue_cancel();
        }
    }

    fn dialogue_cancel(&mut self) {
        if let Some(mut dialogue) = self.dialogue.take() {
            dialogue.cancel(&mut self.audio);
            self.routing.exit_cutscene();
        }
    }

    /// Delivery zone first, then NPCs, then the nearest collectible.
    fn interact(&mut self) {
        let all_complete = self.ledger.are_all_tasks_completed();
        match self.gate.interact(all_complete, &mut self.carry) {
            GateOutcome::NotInside => {}
            GateOutcome::Delivered(item) => {
                self.audio.play_cue(SoundCue::CarryDeliver);
                self.collect(item);
                self.ledger.report_collected(
                    CollectibleCategory::CarryTrash,
                    true,
                    &mut self.narration,
                    &mut self.audio,
                );
                return;
            }
            GateOutcome::Rejected => {
                self.audio.play_cue(SoundCue::CannotPickup);
                return;
            }
            GateOutcome::Finished => {
                self.routing.enter_cutscene();
                self.exit = Some(ExitSequence::default());
                return;
            }
            GateOutcome::Ignored => return,
        }

        if let Some(dialogue) = self.npc_dialogue_in_reach() {
            self.routing.enter_cutscene();
            self.dialogue = Some(DialoguePlayer::start(
                dialogue,
                self.player_position,
                &mut self.audio,
            ));
            return;
        }

        let Some(id) = self.collectibles.nearest_in_reach(self.player_position) else {
            debug!("interact_nothing_in_reach");
            return;
        };
        let Some(item) = self.collectibles.get_mut(id) else {
            return;
        };
        let outcome = item.interact(&mut self.carry);
        debug!(item = id.0, outcome = ?outcome, "collectible_interacted");
        match outcome {
            InteractOutcome::Collected(category) => {
                self.audio.play_cue(match category {
                    CollectibleCategory::GoldenHorn => SoundCue::GoldenHorn,
                    _ => SoundCue::InstantPickup,
                });
                self.collect(id);
                self.ledger
                    .report_collected(category, false, &mut self.narration, &mut self.audio);
            }
            InteractOutcome::PickedUp => {
                self.audio.play_cue(SoundCue::CarryPickup);
                self.ledger.report_collected(
                    CollectibleCategory::CarryTrash,
                    false,
                    &mut self.narration,
                    &mut self.audio,
                );
            }
            InteractOutcome::PickupRejected => self.audio.play_cue(SoundCue::CannotPickup),
            InteractOutcome::StartMinigame(kind) => {
                self.bridge.enter(kind, id, &mut self.routing);
            }
            InteractOutcome::Ignored => {}
        }
    }

    fn npc_dialogue_in_reach(&self) -> Option<DialogueDef> {
        self.npcs
            .iter()
            .filter(|npc| npc.position.distance(self.player_position) <= npc.interaction_radius)
            .find_map(|npc| {
                debug!(npc = %npc.label, "npc_interacted");
                npc.dialogue.clone()
            })
    }

    fn apply_minigame_resolution(&mut self, resolution: MinigameResolution) {
        match resolution {
            MinigameResolution::Succeeded { proxy } => {
                self.audio.play_cue(SoundCue::GoldenHorn);
                self.collect(proxy);
                self.ledger.report_collected(
                    CollectibleCategory::GoldenHorn,
                    false,
                    &mut self.narration,
                    &mut self.audio,
                );
                self.fail_zones.arm();
            }
            MinigameResolution::Failed { .. } => self.fail(FailReason::MinigameFailed),
        }
    }

    fn collect(&mut self, id: CollectibleId) {
        if let Some(item) = self.collectibles.get_mut(id) {
            item.state = CollectibleState::Collected;
            if let Some(entity) = item.entity.take() {
                self.pending_despawns.push(entity);
            }
        }
    }

    /// Mirrors level state into the scene world: player, carried item,
    /// despawns and camera.
    pub(crate) fn sync_world(&mut self, world: &mut SceneWorld) {
        for entity in self.pending_despawns.drain(..) {
            world.despawn(entity);
        }
        if let Some(player) = self.player_entity.and_then(|id| world.find_entity_mut(id)) {
            player.transform.position = self.player_position;
        }
        let carried_entity = self
            .carry
            .carried()
            .and_then(|id| self.collectibles.get(id))
            .and_then(|item| item.entity);
        if let Some(entity) = carried_entity.and_then(|id| world.find_entity_mut(id)) {
            entity.transform.position = self.player_position + CARRY_OFFSET;
        }
        world.camera_mut().position = self
            .dialogue
            .as_ref()
            .and_then(DialoguePlayer::camera)
            .unwrap_or(self.player_position);
    }

    /// Drops every in-flight timed sequence without running its effects.
    pub(crate) fn teardown(&mut self) {
        self.narration.cancel_all(&mut self.audio);
        self.bridge.cancel(&mut self.routing);
        self.dialogue_cancel();
        self.exit = None;
        self.fail_zones.reset();
        self.fail_panel.hide();
        self.pause.close();
        self.carry.release();
        self.audio.stop_engine();
        self.routing = InputRouting::default();
        self.pending_despawns.clear();
        info!(level = %self.def_name, "level_teardown");
    }

    pub(crate) fn def_name(&self) -> &str {
        &self.def_name
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    #[cfg(test)]
    pub(crate) fn player_position(&self) -> Vec2 {
        self.player_position
    }

    #[cfg(test)]
    pub(crate) fn routing(&self) -> InputRouting {
        self.routing
    }

    pub(crate) fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub(crate) fn carry(&self) -> &CarrySlot {
        &self.carry
    }

    #[cfg(test)]
    pub(crate) fn collectibles(&self) -> &CollectibleSet {
        &self.collectibles
    }

    pub(crate) fn narration(&self) -> &NarrationQueue {
        &self.narration
    }

    pub(crate) fn gate(&self) -> &DeliveryGate {
        &self.gate
    }

    pub(crate) fn bridge(&self) -> &MinigameBridge {
        &self.bridge
    }

    pub(crate) fn timer(&self) -> &LevelTimer {
        &self.timer
    }

    #[cfg(test)]
    pub(crate) fn fail_zones(&self) -> &FailZones {
        &self.fail_zones
    }

    pub(crate) fn fail_panel(&self) -> &FailPanel {
        &self.fail_panel
    }

    pub(crate) fn pause_menu(&self) -> &PauseMenu {
        &self.pause
    }

    pub(crate) fn delivery_heading(&self) -> DeliveryHeading {
        DeliveryHeading::from_player(self.player_position, self.plan.delivery_position)
    }

    pub(crate) fn dialogue(&self) -> Option<&DialoguePlayer> {
        self.dialogue.as_ref()
    }

    pub(crate) fn exit(&self) -> Option<&ExitSequence> {
        self.exit.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn audio(&self) -> &A {
        &self.audio
    }

    #[cfg(test)]
    pub(crate) fn teleport(&mut self, position: Vec2) {
        self.player_position = position;
    }
}

fn transform(position: Vec2) -> Transform {
    Transform { position }
}

fn renderable(visual: &Visual, debug_name: &'static str) -> RenderableDesc {
    RenderableDesc {
        kind: visual.renderable.clone(),
        debug_name,
        tint: visual.tint,
    }
}
