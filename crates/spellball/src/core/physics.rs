// core/physics.rs
//
// Rapier proxy for the table. Balls keep a `PhysicsBody` handle pair and
// every velocity, impulse or mass change goes through `PhysicsWorld`.
// The table is seen from above: no gravity, felt drag is body damping.

use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::api::types::EntityId;

fn to_rapier(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_rapier(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collider shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    /// Regular polygon inscribed in a circle of `radius`.
    RegularPolygon { radius: f32, sides: u32 },
    /// Cushion slab.
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn builder(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::RegularPolygon { radius, sides } => {
                let n = sides.max(3);
                let points: Vec<Point<Real>> = (0..n)
                    .map(|i| {
                        let a = std::f32::consts::TAU * i as f32 / n as f32;
                        point![radius * a.cos(), radius * a.sin()]
                    })
                    .collect();
                ColliderBuilder::convex_hull(&points).unwrap_or_else(|| {
                    log::warn!("degenerate {}-gon collider (r={}), using a ball", sides, radius);
                    ColliderBuilder::ball(radius)
                })
            }
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

/// Surface response of a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Collision group bits as stored on a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionMask {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionMask {
    pub const ALL: CollisionMask = CollisionMask { memberships: u32::MAX, filter: u32::MAX };

    fn groups(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.filter),
        )
    }
}

impl From<InteractionGroups> for CollisionMask {
    fn from(groups: InteractionGroups) -> Self {
        Self {
            memberships: groups.memberships.bits(),
            filter: groups.filter.bits(),
        }
    }
}

/// What to build: a moving ball or a fixed cushion.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub fixed: bool,
    pub position: Vec2,
    pub ccd: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            fixed: false,
            position: Vec2::ZERO,
            ccd: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn fixed(collider: ColliderDesc) -> Self {
        Self { fixed: true, ..Self::dynamic(collider) }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Rolling resistance on felt.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

/// Handle pair stored on a ball, referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Everything an accessory is forbidden to change about a ball's body.
/// Compared before and after `on_attach` in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyFingerprint {
    pub body: PhysicsBody,
    pub dynamic: bool,
    pub mask: Option<CollisionMask>,
}

/// Two entities started or stopped touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub started: bool,
}

/// Collects collision events during a step. A mutex rather than a channel
/// keeps the pipeline usable on wasm.
#[derive(Default)]
struct ContactCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl ContactCollector {
    fn take(&self) -> Vec<CollisionEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

pub struct PhysicsWorld {
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    queries: QueryPipeline,
    contacts: ContactCollector,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            queries: QueryPipeline::new(),
            contacts: ContactCollector::default(),
        }
    }

    /// Seconds integrated by the next `step_into`.
    pub fn set_dt(&mut self, dt: f32) {
        self.params.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.params.dt
    }

    /// Insert a body with one collider. The entity id rides in `user_data`
    /// so collision events map back to balls.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let builder = if desc.fixed { RigidBodyBuilder::fixed() } else { RigidBodyBuilder::dynamic() };
        let rb = builder
            .translation(to_rapier(desc.position))
            .gravity_scale(0.0)
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .user_data(entity_id.0 as u128)
            .build();
        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .builder()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .collision_groups(CollisionMask::ALL.groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        // Impulses applied before the first step need real mass properties.
        if let Some(rb) = self.bodies.get_mut(body_handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        PhysicsBody { body_handle, collider_handle }
    }

    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn contains(&self, body: &PhysicsBody) -> bool {
        self.bodies.contains(body.body_handle)
    }

    /// Integrate one step of `dt` seconds and append the collision pairs it produced.
    pub fn step_into(&mut self, pairs: &mut Vec<CollisionPair>) {
        self.pipeline.step(
            &Vector::zeros(),
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.queries),
            &(),
            &self.contacts,
        );

        for event in self.contacts.take() {
            let (a, b, started) = match event {
                CollisionEvent::Started(a, b, _) => (a, b, true),
                CollisionEvent::Stopped(a, b, _) => (a, b, false),
            };
            if let (Some(entity_a), Some(entity_b)) = (self.owner_of(a), self.owner_of(b)) {
                pairs.push(CollisionPair { entity_a, entity_b, started });
            }
        }
    }

    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(to_rapier(impulse), true);
        }
    }

    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(to_rapier(vel), true);
        }
    }

    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map_or(Vec2::ZERO, |rb| from_rapier(rb.linvel()))
    }

    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_angvel(angvel, true);
        }
    }

    pub fn angular_velocity(&self, body: &PhysicsBody) -> f32 {
        self.bodies.get(body.body_handle).map_or(0.0, |rb| rb.angvel())
    }

    /// Zero linear and angular velocity.
    pub fn halt(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(Vector::zeros(), true);
            rb.set_angvel(0.0, true);
        }
    }

    /// Switch between dynamic simulation and a frozen kinematic body.
    pub fn set_dynamic(&mut self, body: &PhysicsBody, dynamic: bool) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            let ty = if dynamic {
                RigidBodyType::Dynamic
            } else {
                RigidBodyType::KinematicPositionBased
            };
            rb.set_body_type(ty, true);
        }
    }

    pub fn is_dynamic(&self, body: &PhysicsBody) -> bool {
        self.bodies.get(body.body_handle).is_some_and(|rb| rb.is_dynamic())
    }

    pub fn collision_mask(&self, body: &PhysicsBody) -> Option<CollisionMask> {
        self.colliders
            .get(body.collider_handle)
            .map(|c| CollisionMask::from(c.collision_groups()))
    }

    /// Mass of the collider alone, before any multiplier.
    pub fn base_mass(&self, body: &PhysicsBody) -> f32 {
        self.colliders.get(body.collider_handle).map_or(0.0, |c| c.mass())
    }

    pub fn mass(&self, body: &PhysicsBody) -> f32 {
        self.bodies.get(body.body_handle).map_or(0.0, |rb| rb.mass())
    }

    /// Scale total mass relative to the collider mass. 1.0 restores it.
    pub fn set_mass_multiplier(&mut self, body: &PhysicsBody, multiplier: f32) {
        let extra = self.base_mass(body) * (multiplier - 1.0).max(0.0);
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_additional_mass(extra, true);
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
    }

    pub fn fingerprint(&self, body: &PhysicsBody) -> BodyFingerprint {
        BodyFingerprint {
            body: *body,
            dynamic: self.is_dynamic(body),
            mask: self.collision_mask(body),
        }
    }

    /// Position and rotation angle of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies.get(body.body_handle).map_or((Vec2::ZERO, 0.0), |rb| {
            let iso = rb.position();
            (from_rapier(&iso.translation.vector), iso.rotation.angle())
        })
    }

    fn owner_of(&self, collider: ColliderHandle) -> Option<EntityId> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        Some(EntityId(body.user_data as u32))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(world: &mut PhysicsWorld, id: u32, pos: Vec2) -> PhysicsBody {
        world.create_body(
            EntityId(id),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }).with_position(pos),
            ColliderMaterial::default(),
        )
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 1, Vec2::ZERO);
        assert!(world.contains(&body));
        world.remove_body(&body);
        assert!(!world.contains(&body));
        assert_eq!(world.velocity(&body), Vec2::ZERO);
    }

    #[test]
    fn impulse_changes_velocity() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 1, Vec2::ZERO);
        world.apply_impulse(&body, Vec2::new(100.0, 0.0));
        assert!(world.velocity(&body).x > 0.0);
    }

    #[test]
    fn step_integrates_configured_dt() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 1, Vec2::ZERO);
        world.set_velocity(&body, Vec2::new(100.0, 0.0));
        world.set_dt(0.5);
        world.step_into(&mut Vec::new());
        let (pos, _) = world.body_position(&body);
        assert!((pos.x - 50.0).abs() < 1.0, "moved {}", pos.x);
    }

    #[test]
    fn halt_zeroes_linear_and_angular() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 1, Vec2::ZERO);
        world.set_velocity(&body, Vec2::new(5.0, -3.0));
        world.set_angular_velocity(&body, 0.2);
        world.halt(&body);
        assert_eq!(world.velocity(&body), Vec2::ZERO);
        assert_eq!(world.angular_velocity(&body), 0.0);
    }

    #[test]
    fn fingerprint_tracks_dynamic_flag() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 3, Vec2::ZERO);
        let before = world.fingerprint(&body);
        assert!(before.dynamic);
        assert_eq!(before.mask, Some(CollisionMask::ALL));
        assert_eq!(before.body, body);

        world.set_dynamic(&body, false);
        assert_ne!(world.fingerprint(&body), before);
        world.set_dynamic(&body, true);
        assert_eq!(world.fingerprint(&body), before);
    }

    #[test]
    fn mass_multiplier_scales_total_mass() {
        let mut world = PhysicsWorld::new();
        let body = ball(&mut world, 1, Vec2::ZERO);
        let base = world.base_mass(&body);
        assert!(base > 0.0);
        let mut events = Vec::new();
        world.set_mass_multiplier(&body, 3.0);
        world.step_into(&mut events);
        assert!((world.mass(&body) - base * 3.0).abs() < base * 0.01);
        world.set_mass_multiplier(&body, 1.0);
        world.step_into(&mut events);
        assert!((world.mass(&body) - base).abs() < base * 0.01);
    }

    #[test]
    fn polygon_collider_builds() {
        let mut world = PhysicsWorld::new();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::RegularPolygon { radius: 12.0, sides: 6 }),
            ColliderMaterial::default(),
        );
        assert!(world.base_mass(&body) > 0.0);
    }

    #[test]
    fn converging_balls_report_their_entities() {
        let mut world = PhysicsWorld::new();
        world.set_dt(1.0 / 60.0);
        let a = ball(&mut world, 1, Vec2::ZERO);
        let b = ball(&mut world, 2, Vec2::new(30.0, 0.0));
        world.set_velocity(&a, Vec2::new(200.0, 0.0));
        world.set_velocity(&b, Vec2::new(-200.0, 0.0));

        let mut pairs = Vec::new();
        for _ in 0..60 {
            world.step_into(&mut pairs);
        }
        let started: Vec<_> = pairs.iter().filter(|p| p.started).collect();
        assert!(!started.is_empty());
        let ids = [started[0].entity_a, started[0].entity_b];
        assert!(ids.contains(&EntityId(1)));
        assert!(ids.contains(&EntityId(2)));
    }

    #[test]
    fn cushion_is_fixed() {
        let mut world = PhysicsWorld::new();
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 50.0, half_height: 5.0 })
            .with_position(Vec2::new(0.0, -20.0));
        let body = world.create_body(EntityId(0), &desc, ColliderMaterial::default());
        assert!(!world.is_dynamic(&body));
        world.apply_impulse(&body, Vec2::new(0.0, 100.0));
        assert_eq!(world.velocity(&body), Vec2::ZERO);
    }
}
