//! Recording collaborators and a small harness for accessory tests.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::accessory::{AccessoryContext, Commands, VisualLedger};
use crate::api::config::{AbilityTunables, TableBounds};
use crate::api::types::{DestroyReason, EntityId};
use crate::ball::{Ball, BallKind, BallView};
use crate::core::physics::PhysicsWorld;
use crate::core::rng::Rng;
use crate::core::schedule::Scheduler;
use crate::host::{
    DamageSink, FeltGrid, Host, NodeId, SceneHost, TextureGenerator, TextureId, TextureParams,
    VisualNode,
};

#[derive(Debug, Default)]
pub struct SceneLog {
    pub added: Vec<(NodeId, VisualNode)>,
    pub removed: Vec<NodeId>,
    pub sunk: Vec<EntityId>,
    pub destroyed: Vec<(EntityId, DestroyReason)>,
}

impl SceneLog {
    /// Nodes added and not yet removed.
    pub fn live_nodes(&self) -> Vec<VisualNode> {
        self.added
            .iter()
            .filter(|(id, _)| !self.removed.contains(id))
            .map(|(_, n)| *n)
            .collect()
    }
}

pub struct RecordingScene {
    log: Rc<RefCell<SceneLog>>,
    next: u32,
}

impl SceneHost for RecordingScene {
    fn add_node(&mut self, node: VisualNode) -> NodeId {
        self.next += 1;
        let id = NodeId(self.next);
        self.log.borrow_mut().added.push((id, node));
        id
    }

    fn remove_node(&mut self, id: NodeId) {
        self.log.borrow_mut().removed.push(id);
    }

    fn ball_sunk(&mut self, ball: EntityId) {
        self.log.borrow_mut().sunk.push(ball);
    }

    fn ball_destroyed(&mut self, ball: EntityId, reason: DestroyReason) {
        self.log.borrow_mut().destroyed.push((ball, reason));
    }
}

#[derive(Debug, Default)]
pub struct DamageLog {
    pub registered: Vec<(EntityId, Option<f32>)>,
    pub unregistered: Vec<EntityId>,
    pub damage: Vec<(EntityId, f32)>,
    pub heals: Vec<(EntityId, f32)>,
    pub immunity: Vec<(EntityId, EntityId, f32)>,
    /// Handed out by the next `take_depleted`.
    pub depleted: Vec<EntityId>,
}

impl DamageLog {
    pub fn damage_to(&self, ball: EntityId) -> f32 {
        self.damage.iter().filter(|(b, _)| *b == ball).map(|(_, a)| a).sum()
    }

    pub fn heal_to(&self, ball: EntityId) -> f32 {
        self.heals.iter().filter(|(b, _)| *b == ball).map(|(_, a)| a).sum()
    }
}

pub struct RecordingDamage {
    log: Rc<RefCell<DamageLog>>,
    tunables: AbilityTunables,
}

impl DamageSink for RecordingDamage {
    fn register_ball(&mut self, ball: EntityId, hp: Option<f32>) {
        self.log.borrow_mut().registered.push((ball, hp));
    }

    fn unregister_ball(&mut self, ball: EntityId) {
        self.log.borrow_mut().unregistered.push(ball);
    }

    fn apply_direct_damage(&mut self, ball: EntityId, amount: f32) {
        self.log.borrow_mut().damage.push((ball, amount));
    }

    fn heal(&mut self, ball: EntityId, amount: f32) {
        self.log.borrow_mut().heals.push((ball, amount));
    }

    fn set_temporary_immunity(&mut self, a: EntityId, b: EntityId, duration: f32) {
        self.log.borrow_mut().immunity.push((a, b, duration));
    }

    fn config(&self) -> &AbilityTunables {
        &self.tunables
    }

    fn take_depleted(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.log.borrow_mut().depleted)
    }
}

pub struct CountingTextures(pub u32);

impl TextureGenerator for CountingTextures {
    fn generate(&mut self, _params: TextureParams) -> TextureId {
        self.0 += 1;
        TextureId(self.0)
    }
}

/// Felt everywhere on the default 1000×500 table.
pub fn felt_table() -> FeltGrid {
    FeltGrid::new(50, 25, 20.0)
}

/// Host wired to recording collaborators, plus handles to their logs.
pub fn recording_host(
    tunables: AbilityTunables,
) -> (Host, Rc<RefCell<SceneLog>>, Rc<RefCell<DamageLog>>) {
    let scene_log = Rc::new(RefCell::new(SceneLog::default()));
    let damage_log = Rc::new(RefCell::new(DamageLog::default()));
    let host = Host::new(Box::new(RecordingDamage { log: damage_log.clone(), tunables }))
        .with_scene(Box::new(RecordingScene { log: scene_log.clone(), next: 0 }))
        .with_felt(Box::new(felt_table()))
        .with_textures(Box::new(CountingTextures(0)));
    (host, scene_log, damage_log)
}

/// Everything an accessory context borrows, owned in one place.
pub struct Rig {
    pub physics: PhysicsWorld,
    pub scheduler: Scheduler,
    pub visuals: VisualLedger,
    pub host: Host,
    pub commands: Commands,
    pub rng: Rng,
    pub table: TableBounds,
    pub balls: Vec<Ball>,
    pub scene_log: Rc<RefCell<SceneLog>>,
    pub damage_log: Rc<RefCell<DamageLog>>,
    next_id: u32,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_tunables(AbilityTunables::default())
    }

    pub fn with_tunables(tunables: AbilityTunables) -> Self {
        let (host, scene_log, damage_log) = recording_host(tunables);
        Self {
            physics: PhysicsWorld::new(),
            scheduler: Scheduler::new(),
            visuals: VisualLedger::default(),
            host,
            commands: Commands::new(),
            rng: Rng::new(1),
            table: TableBounds::default(),
            balls: Vec::new(),
            scene_log,
            damage_log,
            next_id: 1,
        }
    }

    pub fn spawn(&mut self, kind: BallKind, pos: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.balls.push(Ball::create(&mut self.physics, id, kind, pos, 12.0));
        id
    }

    pub fn ball_mut(&mut self, id: EntityId) -> &mut Ball {
        match self.balls.iter_mut().find(|b| b.id == id) {
            Some(b) => b,
            None => panic!("no ball {:?} in rig", id),
        }
    }

    pub fn view(&self, id: EntityId) -> BallView {
        match self.balls.iter().find(|b| b.id == id) {
            Some(b) => b.view(),
            None => panic!("no ball {:?} in rig", id),
        }
    }

    pub fn set_at_rest(&mut self, id: EntityId, at_rest: bool) {
        self.ball_mut(id).rest.at_rest = at_rest;
    }

    pub fn begin_sink(&mut self, id: EntityId) {
        let ball = match self.balls.iter_mut().find(|b| b.id == id) {
            Some(b) => b,
            None => panic!("no ball {:?} in rig", id),
        };
        ball.begin_sink(&mut self.physics);
    }

    pub fn velocity(&self, id: EntityId) -> Vec2 {
        let view = self.view(id);
        self.physics.velocity(&view.body)
    }

    /// Step physics once and resync every ball.
    pub fn step_physics(&mut self) {
        let mut events = Vec::new();
        self.physics.step_into(&mut events);
        for ball in &mut self.balls {
            ball.sync_from_physics(&self.physics);
        }
    }

    /// Run `f` against a context over a fresh snapshot.
    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut AccessoryContext) -> R) -> R {
        let views: Vec<BallView> = self.balls.iter().map(Ball::view).collect();
        let mut ctx = AccessoryContext::new(
            &mut self.physics,
            &mut self.scheduler,
            &mut self.visuals,
            &mut self.host,
            &views,
            &mut self.commands,
            &mut self.rng,
            self.table,
        );
        f(&mut ctx)
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
