//! The table simulation: balls, their accessories and the per-frame step.
//!
//! `World` owns every piece of state and is advanced by `step(dt)` at a
//! fixed rate. Collaborators (scene, felt lookup, HP, textures) come in
//! through the `Host` bundle.

use glam::Vec2;

use crate::accessory::{AccessoryContext, AccessoryManager, AccessoryRegistry, Command, Commands, VisualLedger};
use crate::api::config::SimConfig;
use crate::api::types::{event_kinds, DestroyReason, EntityId, GameEvent};
use crate::ball::support::should_sink;
use crate::ball::{Ball, BallKind, BallPhysics, BallView};
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsWorld};
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::core::schedule::{Scheduler, Task};
use crate::extensions::{Easing, Tween, TweenState};
use crate::host::{Host, VisualNode};
use crate::input::queue::InputEvent;

/// Completion tag on the sink shrink tween.
const SINK_DONE: u32 = 1;

/// Cushions carry this id. The scene never hands it out.
const CUSHION: EntityId = EntityId(0);
const CUSHION_THICKNESS: f32 = 20.0;

/// Builds an `AccessoryContext` from disjoint `World` fields so the
/// manager and registry stay borrowable alongside it.
macro_rules! accessory_ctx {
    ($world:expr, $views:expr) => {
        AccessoryContext::new(
            &mut $world.physics,
            &mut $world.scheduler,
            &mut $world.visuals,
            &mut $world.host,
            $views,
            &mut $world.commands,
            &mut $world.rng,
            $world.config.table,
        )
    };
}

pub struct World {
    scene: Scene,
    physics: PhysicsWorld,
    registry: AccessoryRegistry,
    manager: AccessoryManager,
    scheduler: Scheduler,
    tweens: TweenState,
    visuals: VisualLedger,
    commands: Commands,
    host: Host,
    config: SimConfig,
    rng: Rng,
    next_id: u32,
    selected: Option<EntityId>,
    events: Vec<GameEvent>,
    collisions: Vec<CollisionPair>,
    warned_no_felt: bool,
}

impl World {
    pub fn new(config: SimConfig, host: Host) -> Self {
        Self::with_registry(config, host, AccessoryRegistry::with_builtins())
    }

    pub fn with_registry(config: SimConfig, host: Host, registry: AccessoryRegistry) -> Self {
        let mut world = Self {
            scene: Scene::new(),
            physics: PhysicsWorld::new(),
            registry,
            manager: AccessoryManager::new(),
            scheduler: Scheduler::new(),
            tweens: TweenState::new(),
            visuals: VisualLedger::default(),
            commands: Commands::new(),
            host,
            config,
            rng: Rng::default(),
            next_id: 1,
            selected: None,
            events: Vec::new(),
            collisions: Vec::new(),
            warned_no_felt: false,
        };
        world.build_cushions();
        world
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::new(seed);
        self
    }

    fn build_cushions(&mut self) {
        let min = self.config.table.min();
        let max = self.config.table.max();
        let size = max - min;
        let t = CUSHION_THICKNESS;
        let material = ColliderMaterial {
            restitution: self.config.restitution,
            friction: self.config.friction,
            density: 1.0,
        };
        let rails = [
            (Vec2::new(min.x + size.x * 0.5, min.y - t * 0.5), Vec2::new(size.x * 0.5 + t, t * 0.5)),
            (Vec2::new(min.x + size.x * 0.5, max.y + t * 0.5), Vec2::new(size.x * 0.5 + t, t * 0.5)),
            (Vec2::new(min.x - t * 0.5, min.y + size.y * 0.5), Vec2::new(t * 0.5, size.y * 0.5)),
            (Vec2::new(max.x + t * 0.5, min.y + size.y * 0.5), Vec2::new(t * 0.5, size.y * 0.5)),
        ];
        for (center, half) in rails {
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid { half_width: half.x, half_height: half.y })
                .with_position(center);
            self.physics.create_body(CUSHION, &desc, material);
        }
    }

    // -- accessors --

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn ball(&self, id: EntityId) -> Option<&Ball> {
        self.scene.get(id)
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn manager(&self) -> &AccessoryManager {
        &self.manager
    }

    pub fn registry_mut(&mut self) -> &mut AccessoryRegistry {
        &mut self.registry
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Replace the frame config. Settings screens call this on close.
    pub fn set_config(&mut self, config: SimConfig) {
        self.config = config;
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> Vec<BallView> {
        self.scene.iter().map(Ball::view).collect()
    }

    // -- lifecycle --

    /// Add a ball, register its HP and attach its profile accessories.
    pub fn spawn_ball(&mut self, kind: BallKind, pos: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let params = BallPhysics::from_config(&self.config);
        let ball = Ball::create_with(&mut self.physics, id, kind, pos, &params);
        self.scene.spawn(ball);

        let profile = kind.profile();
        self.host.damage.register_ball(id, profile.hp);
        for accessory in profile.accessories {
            self.attach(id, accessory);
        }
        log::debug!("spawned {:?} {:?} at {:?}", kind, id, pos);
        id
    }

    /// Remove a ball and everything hanging off it. False if it was already gone.
    pub fn destroy_ball(&mut self, id: EntityId, reason: DestroyReason) -> bool {
        let Some(view) = self.scene.get(id).map(Ball::view) else {
            return false;
        };
        let views = self.snapshot();
        {
            let mut ctx = accessory_ctx!(self, &views);
            self.manager.cleanup(&view, &mut ctx);
        }
        self.scheduler.cancel_ball(id);
        self.tweens.remove_entity(id);

        let Some(ball) = self.scene.despawn(id) else {
            return false;
        };
        if let Some(node) = ball.flames {
            self.host.remove_node(node);
        }
        self.physics.remove_body(ball.body());
        self.host.damage.unregister_ball(id);
        self.host.notify_destroyed(id, reason);
        if self.selected == Some(id) {
            self.selected = None;
        }

        let event = match reason {
            DestroyReason::Sunk => GameEvent::new(event_kinds::BALL_SUNK, id.0 as f32, 0.0, 0.0),
            _ => GameEvent::new(event_kinds::BALL_DESTROYED, id.0 as f32, reason.code(), 0.0),
        };
        self.events.push(event);
        log::debug!("ball {:?} destroyed ({:?})", id, reason);
        true
    }

    /// Remove every ball.
    pub fn clear_table(&mut self) {
        for id in self.scene.ids() {
            self.destroy_ball(id, DestroyReason::Removed);
        }
        self.commands.drain();
    }

    pub fn attach(&mut self, ball: EntityId, accessory: &str) -> bool {
        let Some(view) = self.scene.get(ball).map(Ball::view) else {
            log::warn!("attach '{}' to missing ball {:?}", accessory, ball);
            return false;
        };
        let views = self.snapshot();
        let mut ctx = accessory_ctx!(self, &views);
        self.manager.attach(&self.registry, accessory, &view, &mut ctx)
    }

    pub fn detach(&mut self, ball: EntityId, accessory: &str) -> bool {
        let Some(view) = self.scene.get(ball).map(Ball::view) else {
            return false;
        };
        let views = self.snapshot();
        let mut ctx = accessory_ctx!(self, &views);
        self.manager.detach(accessory, &view, &mut ctx)
    }

    /// Start the one-way sink: freeze the ball and animate it out. The
    /// destroy follows when the animation completes. False if the ball is
    /// missing or already sinking.
    pub fn trigger_sink(&mut self, id: EntityId) -> bool {
        let Some(ball) = self.scene.get_mut(id) else {
            return false;
        };
        if !ball.begin_sink(&mut self.physics) {
            return false;
        }
        let duration = self.config.sink.animation_duration;
        self.tweens
            .add(id, Tween::scale(1.0, 0.0, duration, Easing::QuadIn).with_on_complete(SINK_DONE));
        self.tweens.add(id, Tween::fade_out(duration, Easing::QuadIn));
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("ball {:?} sinking", id);
        true
    }

    /// The HP subsystem reports `id` at zero.
    pub fn notify_hp_depleted(&mut self, id: EntityId) -> bool {
        self.destroy_ball(id, DestroyReason::HpDepleted)
    }

    /// Choose the ball aim input applies to.
    pub fn select(&mut self, id: EntityId) -> bool {
        match self.scene.get(id) {
            Some(ball) if !ball.is_sinking() => {
                self.selected = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if let InputEvent::Select { id } = event {
            self.select(EntityId(id));
            return;
        }
        if let InputEvent::Custom { kind, .. } = event {
            log::trace!("ignoring custom input {}", kind);
            return;
        }

        let Some(id) = self.selected else {
            log::trace!("aim input with no ball selected");
            return;
        };
        let Some(ball) = self.scene.get_mut(id) else {
            self.selected = None;
            return;
        };
        if ball.is_sinking() {
            return;
        }

        let shot = &self.config.shot;
        match event {
            InputEvent::AimBegin { x, y } => {
                ball.aim.begin();
                ball.aim.update(ball.pos, ball.rotation, Vec2::new(x, y), shot);
            }
            InputEvent::AimMove { x, y } => {
                ball.aim.update(ball.pos, ball.rotation, Vec2::new(x, y), shot);
            }
            InputEvent::AimEnd { x, y } => {
                ball.aim.update(ball.pos, ball.rotation, Vec2::new(x, y), shot);
                if let Some(impulse) = ball.aim.end(shot) {
                    self.scheduler.schedule(shot.snap_delay, Task::ApplyShot { ball: id, impulse });
                }
            }
            InputEvent::AimCancel => ball.aim.cancel(),
            InputEvent::Select { .. } | InputEvent::Custom { .. } => {}
        }
    }

    // -- frame --

    /// Advance the simulation by `dt` seconds. Physics integrates the same
    /// `dt` the timers see.
    pub fn step(&mut self, dt: f32) {
        self.physics.set_dt(dt);
        self.collisions.clear();
        self.physics.step_into(&mut self.collisions);
        for ball in self.scene.iter_mut() {
            if !ball.is_sinking() {
                ball.sync_from_physics(&self.physics);
            }
        }

        self.run_due_tasks(dt);
        self.update_balls(dt);

        let views = self.snapshot();
        for view in views.iter().filter(|v| !v.sinking) {
            let mut ctx = accessory_ctx!(self, &views);
            self.manager.update(view, dt, &mut ctx);
        }

        let contacts: Vec<(EntityId, EntityId)> = self
            .collisions
            .iter()
            .filter(|c| c.started)
            .map(|c| (c.entity_a, c.entity_b))
            .collect();
        self.dispatch_contacts(&contacts, &views);

        self.apply_commands();

        self.tweens.tick(dt, &mut self.scene);
        let completed: Vec<_> = self.tweens.drain_completed().collect();
        for done in completed {
            if done.tag == SINK_DONE {
                self.host.notify_sunk(done.entity);
                self.destroy_ball(done.entity, DestroyReason::Sunk);
            }
        }

        for id in self.host.damage.take_depleted() {
            self.notify_hp_depleted(id);
        }
    }

    fn run_due_tasks(&mut self, dt: f32) {
        for due in self.scheduler.advance(dt) {
            match due.task {
                Task::ApplyShot { ball, impulse } => {
                    let Some(b) = self.scene.get_mut(ball) else {
                        log::trace!("shot for removed ball {:?} dropped", ball);
                        continue;
                    };
                    if b.is_sinking() {
                        continue;
                    }
                    self.physics.apply_impulse(b.body(), impulse);
                    b.aim.shot_landed();
                    b.rest.reset();
                    self.events.push(GameEvent::new(
                        event_kinds::SHOT_FIRED,
                        ball.0 as f32,
                        impulse.length(),
                        0.0,
                    ));
                }
                Task::Accessory { ball, token, kind } => {
                    let Some(view) = self.scene.get(ball).map(Ball::view) else {
                        continue;
                    };
                    let views = self.snapshot();
                    let mut ctx = accessory_ctx!(self, &views);
                    self.manager.deliver(&view, token, kind, &mut ctx);
                }
            }
        }
    }

    fn update_balls(&mut self, dt: f32) {
        let mut to_sink = Vec::new();
        let felt = self.host.felt();
        if felt.is_none() && !self.warned_no_felt {
            log::warn!("no felt lookup attached, pocket sinking disabled");
            self.warned_no_felt = true;
        }

        let mut burn_damage = Vec::new();
        let mut extinguished = Vec::new();
        for ball in self.scene.iter_mut() {
            if ball.is_sinking() {
                continue;
            }
            ball.update_rest(&mut self.physics, dt, &self.config.rest);

            let was_burning = ball.is_burning();
            let ticks = ball.tick_burn(dt, self.config.burn_tick_interval);
            if ticks > 0 {
                burn_damage.push((ball.id, ticks as f32 * self.config.burn_tick_damage));
            }
            if was_burning && !ball.is_burning() {
                if let Some(node) = ball.flames.take() {
                    extinguished.push(node);
                }
            }

            if let Some(felt) = felt {
                let fraction = ball.unsupported_fraction(felt, &self.config.sink);
                let prevents = self.manager.prevents_sinking(ball.id);
                if should_sink(fraction, ball.speed(), prevents, &self.config.sink) {
                    to_sink.push(ball.id);
                }
            }
        }

        for (id, amount) in burn_damage {
            self.host.damage.apply_direct_damage(id, amount);
        }
        for node in extinguished {
            self.host.remove_node(node);
        }
        let epsilon = self.config.texture_speed_epsilon;
        for ball in self.scene.iter_mut() {
            ball.refresh_texture(&mut self.host, epsilon);
        }
        for id in to_sink {
            self.trigger_sink(id);
        }
    }

    fn dispatch_contacts(&mut self, pairs: &[(EntityId, EntityId)], views: &[BallView]) {
        for &(a, b) in pairs {
            let (Some(va), Some(vb)) = (
                views.iter().find(|v| v.id == a),
                views.iter().find(|v| v.id == b),
            ) else {
                continue;
            };
            let mut ctx = accessory_ctx!(self, views);
            self.manager.contact(va, vb, &mut ctx);
            self.manager.contact(vb, va, &mut ctx);
        }
    }

    /// Run contact hooks for `a` touching `b` outside the physics step.
    pub fn notify_contact(&mut self, a: EntityId, b: EntityId) {
        let views = self.snapshot();
        self.dispatch_contacts(&[(a, b)], &views);
    }

    /// Apply what accessories queued: removals, then ignitions, then spawns.
    pub fn apply_commands(&mut self) {
        let queued = self.commands.drain();
        for cmd in &queued {
            if let Command::Destroy { ball, reason } = *cmd {
                self.destroy_ball(ball, reason);
            }
        }
        for cmd in &queued {
            if let Command::Ignite { ball, duration } = *cmd {
                let Some(b) = self.scene.get_mut(ball) else {
                    continue;
                };
                if b.is_sinking() {
                    continue;
                }
                if b.ignite(duration) {
                    b.flames = self.host.add_node(VisualNode::Flames { owner: ball });
                }
            }
        }
        for cmd in &queued {
            if let Command::Spawn { kind, pos } = *cmd {
                let id = self.spawn_ball(kind, pos);
                self.events
                    .push(GameEvent::new(event_kinds::BALL_SPAWNED, id.0 as f32, pos.x, pos.y));
            }
        }
    }
}
