pub mod aim;
pub mod kind;
pub mod rest;
pub mod support;

use glam::Vec2;

use crate::api::config::{RestConfig, SimConfig, SinkConfig};
use crate::api::types::EntityId;
use crate::core::physics::{BodyDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
use crate::core::time::Interval;
use crate::host::{FeltProvider, Host, NodeId, TextureId, TextureParams};

pub use aim::{AimPhase, AimState};
pub use kind::{BallKind, BallProfile, BallShape};
pub use rest::{RestDetector, RestTick};

/// One-way sink lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkState {
    #[default]
    NotSinking,
    /// Frozen and animating out. Never leaves this state.
    Active,
}

/// Damage-over-time status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnStatus {
    pub remaining: f32,
    ticker: Interval,
}

/// Body parameters for a new ball.
#[derive(Debug, Clone, Copy)]
pub struct BallPhysics {
    pub radius: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub material: ColliderMaterial,
}

impl BallPhysics {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            radius: cfg.ball_radius,
            linear_damping: cfg.linear_damping,
            angular_damping: cfg.angular_damping,
            material: ColliderMaterial {
                restitution: cfg.restitution,
                friction: cfg.friction,
                density: cfg.density,
            },
        }
    }
}

/// Read-only copy of the fields abilities scan each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub id: EntityId,
    pub kind: BallKind,
    pub pos: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    pub at_rest: bool,
    pub sinking: bool,
    pub burning: bool,
    pub(crate) body: PhysicsBody,
}

impl BallView {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// A ball on the table. Transform fields mirror the physics proxy after
/// `sync_from_physics`; `scale` and `alpha` are driven by tweens.
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: EntityId,
    pub kind: BallKind,
    pub shape: BallShape,
    pub radius: f32,
    body: PhysicsBody,
    pub pos: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub scale: f32,
    pub alpha: f32,
    pub aim: AimState,
    pub rest: RestDetector,
    sink: SinkState,
    burn: Option<BurnStatus>,
    pub texture: Option<TextureId>,
    /// Visual node shown while burning.
    pub flames: Option<NodeId>,
}

impl Ball {
    /// Create a ball with default body parameters and `radius`.
    pub fn create(physics: &mut PhysicsWorld, id: EntityId, kind: BallKind, pos: Vec2, radius: f32) -> Self {
        let params = BallPhysics {
            radius,
            ..BallPhysics::from_config(&SimConfig::default())
        };
        Self::create_with(physics, id, kind, pos, &params)
    }

    pub fn create_with(
        physics: &mut PhysicsWorld,
        id: EntityId,
        kind: BallKind,
        pos: Vec2,
        params: &BallPhysics,
    ) -> Self {
        let shape = kind.profile().shape;
        let desc = BodyDesc::dynamic(shape.collider(params.radius))
            .with_position(pos)
            .with_ccd(true)
            .with_linear_damping(params.linear_damping)
            .with_angular_damping(params.angular_damping);
        let body = physics.create_body(id, &desc, params.material);

        Self {
            id,
            kind,
            shape,
            radius: params.radius,
            body,
            pos,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            scale: 1.0,
            alpha: 1.0,
            aim: AimState::default(),
            rest: RestDetector::default(),
            sink: SinkState::NotSinking,
            burn: None,
            texture: None,
            flames: None,
        }
    }

    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub fn sync_from_physics(&mut self, physics: &PhysicsWorld) {
        let (pos, rotation) = physics.body_position(&self.body);
        self.pos = pos;
        self.rotation = rotation;
        self.velocity = physics.velocity(&self.body);
        self.angular_velocity = physics.angular_velocity(&self.body);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn is_at_rest(&self) -> bool {
        self.rest.at_rest
    }

    pub fn sink_state(&self) -> SinkState {
        self.sink
    }

    pub fn is_sinking(&self) -> bool {
        self.sink == SinkState::Active
    }

    /// Run the rest detector on the synced velocity, applying a snap to the proxy.
    pub fn update_rest(&mut self, physics: &mut PhysicsWorld, dt: f32, cfg: &RestConfig) -> RestTick {
        let tick = self.rest.tick(self.speed(), self.angular_velocity, dt, cfg);
        if tick.snap {
            physics.halt(&self.body);
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            log::trace!("ball {:?} snapped to rest", self.id);
        }
        tick
    }

    /// Freeze the ball for its sink animation. Returns false if already sinking.
    pub fn begin_sink(&mut self, physics: &mut PhysicsWorld) -> bool {
        if self.sink == SinkState::Active {
            return false;
        }
        self.sink = SinkState::Active;
        physics.halt(&self.body);
        physics.set_dynamic(&self.body, false);
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.aim.cancel();
        true
    }

    /// Fraction of the lower rim hanging off the felt.
    pub fn unsupported_fraction(&self, felt: &dyn FeltProvider, cfg: &SinkConfig) -> f32 {
        support::unsupported_fraction(self.pos, self.radius, felt, cfg.samples, cfg.sample_depth)
    }

    pub fn apply_mass_multiplier(&self, physics: &mut PhysicsWorld, multiplier: f32) {
        physics.set_mass_multiplier(&self.body, multiplier);
    }

    /// Start burning, or refresh the remaining time. Returns true on a fresh ignition.
    pub fn ignite(&mut self, duration: f32) -> bool {
        match self.burn.as_mut() {
            Some(burn) => {
                burn.remaining = burn.remaining.max(duration);
                false
            }
            None => {
                self.burn = Some(BurnStatus {
                    remaining: duration,
                    ticker: Interval::new(0.0),
                });
                true
            }
        }
    }

    pub fn is_burning(&self) -> bool {
        self.burn.is_some()
    }

    pub fn burn(&self) -> Option<&BurnStatus> {
        self.burn.as_ref()
    }

    /// Advance the burn. Returns how many damage ticks fell due.
    pub fn tick_burn(&mut self, dt: f32, interval: f32) -> u32 {
        let Some(burn) = self.burn.as_mut() else {
            return 0;
        };
        let step = dt.min(burn.remaining);
        burn.ticker.set_period(interval);
        let ticks = burn.ticker.tick(step);
        burn.remaining -= dt;
        if burn.remaining <= 0.0 {
            self.burn = None;
        }
        ticks
    }

    /// Regenerate the texture for the current rotation once linear speed is
    /// above `epsilon`. A ball without a texture gets its first one
    /// regardless, so a freshly spawned ball is drawable at rest.
    pub fn refresh_texture(&mut self, host: &mut Host, epsilon: f32) -> bool {
        if self.texture.is_some() && self.speed() <= epsilon {
            return false;
        }
        let profile = self.kind.profile();
        let params = TextureParams {
            rotation: self.rotation,
            color: profile.color,
            pattern: profile.pattern,
            sides: self.shape.sides(),
        };
        match host.generate_texture(params) {
            Some(tex) => {
                self.texture = Some(tex);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> BallView {
        BallView {
            id: self.id,
            kind: self.kind,
            pos: self.pos,
            radius: self.radius,
            velocity: self.velocity,
            at_rest: self.rest.at_rest,
            sinking: self.is_sinking(),
            burning: self.is_burning(),
            body: self.body,
        }
    }
}
