//! Composable ball abilities.
//!
//! An accessory is a small state machine attached to one ball. It reacts to
//! per-frame updates, contacts and its own scheduled tasks, and acts on the
//! world only through `AccessoryContext`: forces on other balls, visuals,
//! HP calls and deferred commands. It never sees the host ball's physics
//! body, so it cannot replace it, freeze it or change its collision mask.

pub mod dispatch;
pub mod kinds;
pub mod registry;

pub use registry::{AccessoryManager, AccessoryRegistry};

use std::collections::HashMap;

use glam::Vec2;

use crate::api::config::{AbilityTunables, TableBounds};
use crate::api::types::{DestroyReason, EntityId};
use crate::ball::{BallKind, BallView};
use crate::core::physics::{BodyFingerprint, PhysicsWorld};
use crate::core::rng::Rng;
use crate::core::schedule::{Task, TaskId, TaskKind, Scheduler};
use crate::host::{Host, NodeId, VisualNode};

/// Stable string id an accessory is registered and attached under.
pub type AccessoryId = &'static str;

/// Identity of one attached instance. Never reused, so a task addressed to a
/// detached instance can never reach a later re-attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceToken(pub u64);

/// What an accessory changes about its host ball, declared rather than done.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Capabilities {
    pub prevents_sinking: bool,
    /// Applied to the body by the manager, never by the accessory.
    pub mass_multiplier: Option<f32>,
}

pub trait Accessory {
    fn id(&self) -> AccessoryId;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn on_attach(&mut self, _me: &BallView, _ctx: &mut AccessoryContext) {}

    /// Visuals added through the context are released after this returns.
    fn on_detach(&mut self, _me: &BallView, _ctx: &mut AccessoryContext) {}

    fn update(&mut self, _me: &BallView, _dt: f32, _ctx: &mut AccessoryContext) {}

    /// A contact with `other` started this frame.
    fn on_contact(&mut self, _me: &BallView, _other: &BallView, _ctx: &mut AccessoryContext) {}

    /// A task this instance scheduled fell due.
    fn on_task(&mut self, _me: &BallView, _kind: TaskKind, _ctx: &mut AccessoryContext) {}
}

/// Side effects that would mutate the ball collection. Applied by the world
/// after the current scan finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Spawn { kind: BallKind, pos: Vec2 },
    Destroy { ball: EntityId, reason: DestroyReason },
    Ignite { ball: EntityId, duration: f32 },
}

#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: BallKind, pos: Vec2) {
        self.queue.push(Command::Spawn { kind, pos });
    }

    pub fn destroy(&mut self, ball: EntityId, reason: DestroyReason) {
        self.queue.push(Command::Destroy { ball, reason });
    }

    pub fn ignite(&mut self, ball: EntityId, duration: f32) {
        self.queue.push(Command::Ignite { ball, duration });
    }

    /// Positions of spawns queued but not yet applied.
    pub fn pending_spawns(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.queue.iter().filter_map(|c| match c {
            Command::Spawn { pos, .. } => Some(*pos),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.queue.iter()
    }

    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Which instance owns which visual node.
#[derive(Debug, Default)]
pub struct VisualLedger {
    owned: HashMap<InstanceToken, Vec<NodeId>>,
}

impl VisualLedger {
    fn record(&mut self, owner: InstanceToken, node: NodeId) {
        self.owned.entry(owner).or_default().push(node);
    }

    fn forget(&mut self, owner: InstanceToken, node: NodeId) {
        if let Some(nodes) = self.owned.get_mut(&owner) {
            nodes.retain(|n| *n != node);
        }
    }

    /// Remove every node still owned by `owner` from the scene.
    pub fn release(&mut self, owner: InstanceToken, host: &mut Host) -> usize {
        let nodes = self.owned.remove(&owner).unwrap_or_default();
        for node in &nodes {
            host.remove_node(*node);
        }
        nodes.len()
    }

    pub fn owned_by(&self, owner: InstanceToken) -> &[NodeId] {
        self.owned.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everything an accessory hook may touch.
///
/// `balls` is a snapshot taken before the scan; it does not change while
/// accessories run, and balls queued through `commands` appear next frame.
pub struct AccessoryContext<'a> {
    physics: &'a mut PhysicsWorld,
    scheduler: &'a mut Scheduler,
    visuals: &'a mut VisualLedger,
    owner: InstanceToken,
    pub host: &'a mut Host,
    pub balls: &'a [BallView],
    pub commands: &'a mut Commands,
    pub rng: &'a mut Rng,
    pub table: TableBounds,
}

impl<'a> AccessoryContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        physics: &'a mut PhysicsWorld,
        scheduler: &'a mut Scheduler,
        visuals: &'a mut VisualLedger,
        host: &'a mut Host,
        balls: &'a [BallView],
        commands: &'a mut Commands,
        rng: &'a mut Rng,
        table: TableBounds,
    ) -> Self {
        Self {
            physics,
            scheduler,
            visuals,
            owner: InstanceToken(0),
            host,
            balls,
            commands,
            rng,
            table,
        }
    }

    /// Live tunables. Read at the moment of acting, never cached.
    pub fn tunables(&self) -> &AbilityTunables {
        self.host.tunables()
    }

    /// Seconds of simulated time.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn ball(&self, id: EntityId) -> Option<&BallView> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Snapshot balls other than `me` that are still in play.
    pub fn others(&self, me: EntityId) -> impl Iterator<Item = &'a BallView> + 'a {
        let balls: &'a [BallView] = self.balls;
        balls.iter().filter(move |b| b.id != me && !b.sinking)
    }

    pub fn apply_impulse(&mut self, target: &BallView, impulse: Vec2) {
        if target.sinking {
            return;
        }
        self.physics.apply_impulse(&target.body, impulse);
    }

    /// Current velocity straight from the physics proxy.
    pub fn velocity(&self, target: &BallView) -> Vec2 {
        self.physics.velocity(&target.body)
    }

    /// Add a visual owned by the calling instance.
    pub fn add_visual(&mut self, node: VisualNode) -> Option<NodeId> {
        let id = self.host.add_node(node)?;
        self.visuals.record(self.owner, id);
        Some(id)
    }

    /// Add a one-shot visual that comes down after `flash_lifetime`.
    pub fn add_flash(&mut self, ball: EntityId, node: VisualNode) -> Option<NodeId> {
        let id = self.add_visual(node)?;
        let lifetime = self.tunables().flash_lifetime;
        self.schedule(ball, lifetime, TaskKind::ExpireVisual(id));
        Some(id)
    }

    pub fn remove_visual(&mut self, id: NodeId) {
        self.visuals.forget(self.owner, id);
        self.host.remove_node(id);
    }

    /// Schedule `kind` for the calling instance, `delay` seconds from now.
    pub fn schedule(&mut self, ball: EntityId, delay: f32, kind: TaskKind) -> TaskId {
        self.scheduler.schedule(
            delay,
            Task::Accessory {
                ball,
                token: self.owner,
                kind,
            },
        )
    }

    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn owner(&self) -> InstanceToken {
        self.owner
    }

    fn set_owner(&mut self, owner: InstanceToken) {
        self.owner = owner;
    }

    fn fingerprint(&self, view: &BallView) -> BodyFingerprint {
        self.physics.fingerprint(&view.body)
    }
}
