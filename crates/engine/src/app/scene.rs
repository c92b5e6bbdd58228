use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::hud::HudFrame;
use super::input::{ActionEdges, ActionStates, InputAction};
use crate::content::DefDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
    Exit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    edges: ActionEdges,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        edges: ActionEdges,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            edges,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.edges.was_pressed(action)
    }

    pub fn was_released(&self, action: InputAction) -> bool {
        self.edges.was_released(action)
    }

    /// Unit-length (or zero) direction from the movement actions, +y up.
    pub fn move_vector(&self) -> Vec2 {
        let axis = |positive: InputAction, negative: InputAction| -> f32 {
            match (self.is_down(positive), self.is_down(negative)) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            }
        };
        Vec2 {
            x: axis(InputAction::MoveRight, InputAction::MoveLeft),
            y: axis(InputAction::MoveUp, InputAction::MoveDown),
        }
        .normalized_or_zero()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.edges.mark_pressed(action);
        self
    }

    pub fn with_action_released(mut self, action: InputAction) -> Self {
        self.actions.set(action, false);
        self.edges.mark_released(action);
        self
    }

    pub fn with_quit_requested(mut self) -> Self {
        self.quit_requested = true;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn normalized_or_zero(self) -> Vec2 {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Vec2::ZERO;
        }
        Vec2 {
            x: self.x / length,
            y: self.y / length,
        }
    }

    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        self + (target - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Camera2D {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderableKind {
    Placeholder,
    Sprite(String),
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
    /// Fill color used when drawing a placeholder or a missing sprite.
    pub tint: [u8; 4],
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    pub visible: bool,
    applied_spawn_order: u64,
}

impl Entity {
    pub fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    camera: Camera2D,
    hud: HudFrame,
    def_database: Option<DefDatabase>,
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            renderable,
            visible: true,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_spawns.is_empty() {
            for mut entity in self.pending_spawns.drain(..) {
                entity.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                self.entities.push(entity);
            }
        }

        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort();
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.entities
                .retain(|entity| pending.binary_search(&entity.id).is_err());
            self.pending_despawns.clear();
        }
    }

    /// Drops every entity and HUD panel; the content database survives.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.camera = Camera2D::default();
        self.hud.clear();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn hud(&self) -> &HudFrame {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut HudFrame {
        &mut self.hud
    }

    pub fn set_def_database(&mut self, def_database: DefDatabase) {
        self.def_database = Some(def_database);
    }

    pub fn def_database(&self) -> Option<&DefDatabase> {
        self.def_database.as_ref()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn load_if_needed(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    fn unload_if_loaded(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }
}

pub(crate) struct SceneMachine {
    runtimes: Vec<SceneRuntime>,
    active_scene: SceneKey,
}

impl SceneMachine {
    /// Returns `None` when `active_scene` does not index one of `scenes`.
    pub(crate) fn new(scenes: Vec<Box<dyn Scene>>, active_scene: SceneKey) -> Option<Self> {
        if active_scene.0 >= scenes.len() {
            return None;
        }
        let runtimes = scenes
            .into_iter()
            .map(|scene| SceneRuntime {
                scene,
                world: SceneWorld::default(),
                is_loaded: false,
            })
            .collect();
        Some(Self {
            runtimes,
            active_scene,
        })
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn set_def_database_for_all(&mut self, def_database: &DefDatabase) {
        for runtime in &mut self.runtimes {
            runtime.world.set_def_database(def_database.clone());
        }
    }

    pub(crate) fn load_active(&mut self) {
        self.active_runtime_mut().load_if_needed();
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        runtime
            .scene
            .update(fixed_dt_seconds, input, &mut runtime.world)
    }

    pub(crate) fn apply_pending_active(&mut self) {
        self.active_runtime_mut().world.apply_pending();
    }

    pub(crate) fn render_active(&mut self) {
        let runtime = self.active_runtime_mut();
        runtime.scene.render(&runtime.world);
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    #[cfg(test)]
    pub(crate) fn active_world_mut(&mut self) -> &mut SceneWorld {
        &mut self.active_runtime_mut().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    /// Activates `next_scene`, loading it on first visit and keeping its state
    /// on later visits.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene || next_scene.0 >= self.runtimes.len() {
            return false;
        }
        self.runtimes[next_scene.0].load_if_needed();
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let Some(runtime) = self.runtimes.get_mut(next_scene.0) else {
            return false;
        };
        runtime.unload_if_loaded();
        runtime.load_if_needed();
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in &mut self.runtimes {
            runtime.unload_if_loaded();
        }
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        &mut self.runtimes[self.active_scene.0]
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        &self.runtimes[self.active_scene.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SceneKey = SceneKey(0);
    const B: SceneKey = SceneKey(1);

    fn placeholder(debug_name: &'static str) -> RenderableDesc {
        RenderableDesc {
            kind: RenderableKind::Placeholder,
            debug_name,
            tint: [255, 255, 255, 255],
        }
    }

    struct TestScene {
        spawn_count: usize,
        step_x: f32,
    }

    impl TestScene {
        fn boxed(spawn_count: usize, step_x: f32) -> Box<dyn Scene> {
            Box::new(Self {
                spawn_count,
                step_x,
            })
        }
    }

    impl Scene for TestScene {
        fn load(&mut self, world: &mut SceneWorld) {
            for _ in 0..self.spawn_count {
                world.spawn(Transform::default(), placeholder("test"));
            }
            world.apply_pending();
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            world: &mut SceneWorld,
        ) -> SceneCommand {
            if let Some(entity) = world.entities_mut().first_mut() {
                entity.transform.position.x += self.step_x;
            }
            SceneCommand::None
        }

        fn render(&mut self, _world: &SceneWorld) {}

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    fn two_scene_machine() -> SceneMachine {
        SceneMachine::new(vec![TestScene::boxed(2, 1.0), TestScene::boxed(1, 3.0)], A)
            .expect("machine")
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate().0, 0);
        assert_eq!(allocator.allocate().0, 1);
        assert_eq!(allocator.allocate().0, 2);
    }

    #[test]
    fn scene_world_spawn_and_despawn_updates_count() {
        let mut world = SceneWorld::default();
        let id = world.spawn(Transform::default(), placeholder("spawned"));
        world.apply_pending();
        assert_eq!(world.entity_count(), 1);

        world.despawn(id);
        world.apply_pending();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn duplicate_pending_despawns_are_idempotent() {
        let mut world = SceneWorld::default();
        let doomed = world.spawn(Transform::default(), placeholder("doomed"));
        let survivor = world.spawn(
            Transform {
                position: Vec2::new(3.0, 1.0),
            },
            placeholder("survivor"),
        );
        world.apply_pending();

        assert!(world.despawn(doomed));
        assert!(world.despawn(doomed));
        world.apply_pending();

        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(doomed).is_none());
        assert!(world.find_entity(survivor).is_some());
        assert!(!world.despawn(doomed));
    }

    #[test]
    fn despawn_of_pending_spawn_removes_it_on_apply() {
        let mut world = SceneWorld::default();
        let id = world.spawn(Transform::default(), placeholder("short_lived"));
        assert!(world.despawn(id));
        world.apply_pending();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn clear_keeps_def_database_and_drops_hud() {
        let mut world = SceneWorld::default();
        world.set_def_database(DefDatabase::default());
        world.hud_mut().set_screen_fade(0.5);
        world.spawn(Transform::default(), placeholder("x"));
        world.apply_pending();

        world.clear();

        assert!(world.def_database().is_some());
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.hud().screen_fade(), 0.0);
    }

    #[test]
    fn machine_rejects_out_of_range_initial_scene() {
        assert!(SceneMachine::new(vec![TestScene::boxed(1, 0.0)], SceneKey(3)).is_none());
    }

    #[test]
    fn switch_away_and_back_preserves_world_state() {
        let mut machine = two_scene_machine();
        machine.load_active();
        let _ = machine.update_active(1.0 / 60.0, &InputSnapshot::empty());
        let before = machine.active_world().entities()[0].transform.position.x;

        assert!(machine.switch_to(B));
        for _ in 0..10 {
            let _ = machine.update_active(1.0 / 60.0, &InputSnapshot::empty());
        }
        assert!(machine.switch_to(A));

        assert_eq!(machine.active_world().entities()[0].transform.position.x, before);
        assert_eq!(machine.active_world().entity_count(), 2);
    }

    #[test]
    fn switch_to_unknown_or_current_scene_is_rejected() {
        let mut machine = two_scene_machine();
        machine.load_active();
        assert!(!machine.switch_to(A));
        assert!(!machine.switch_to(SceneKey(9)));
        assert_eq!(machine.active_scene(), A);
    }

    #[test]
    fn hard_reset_recreates_target_scene_state() {
        let mut machine = two_scene_machine();
        machine.load_active();
        machine.active_world_mut().entities_mut()[0].transform.position = Vec2::new(9.0, 3.0);

        assert!(machine.hard_reset_to(A));

        assert_eq!(machine.active_world().entity_count(), 2);
        assert_eq!(
            machine.active_world().entities()[0].transform.position,
            Vec2::ZERO
        );
    }

    #[test]
    fn move_vector_is_normalized_and_cancels_opposites() {
        let diagonal = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveRight, true)
            .move_vector();
        assert!((diagonal.length() - 1.0).abs() < 0.0001);

        let cancelled = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true)
            .move_vector();
        assert_eq!(cancelled, Vec2::ZERO);
    }

    #[test]
    fn pressed_builder_sets_edge_and_down_state() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::Interact);
        assert!(snapshot.was_pressed(InputAction::Interact));
        assert!(snapshot.is_down(InputAction::Interact));
        assert!(!snapshot.was_released(InputAction::Interact));
    }
}
