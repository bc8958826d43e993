use std::collections::HashMap;

use crate::api::types::EntityId;
use crate::ball::BallView;
use crate::core::schedule::TaskKind;

use super::{kinds, Accessory, AccessoryContext, AccessoryId, InstanceToken};

pub type AccessoryFactory = fn() -> Box<dyn Accessory>;

/// Accessory factories by id.
#[derive(Default)]
pub struct AccessoryRegistry {
    factories: HashMap<AccessoryId, AccessoryFactory>,
}

impl AccessoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in accessory.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        kinds::register_builtins(&mut registry);
        registry
    }

    /// Register a factory. Registering an id twice keeps the first factory
    /// and returns false.
    pub fn register_factory(&mut self, id: AccessoryId, factory: AccessoryFactory) -> bool {
        if self.factories.contains_key(id) {
            log::debug!("accessory '{}' already registered", id);
            return false;
        }
        self.factories.insert(id, factory);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Fresh instance plus the id it is registered under.
    pub fn create(&self, id: &str) -> Option<(AccessoryId, Box<dyn Accessory>)> {
        self.factories.get_key_value(id).map(|(key, factory)| (*key, factory()))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<AccessoryId> {
        let mut ids: Vec<AccessoryId> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

struct Attached {
    id: AccessoryId,
    token: InstanceToken,
    inner: Box<dyn Accessory>,
}

/// Accessory instances per ball, in attach order.
#[derive(Default)]
pub struct AccessoryManager {
    attached: HashMap<EntityId, Vec<Attached>>,
    next_token: u64,
}

impl AccessoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate `id` and attach it to `me`.
    ///
    /// Fails for unknown ids, an id already on the ball, or a second
    /// mass-modifying accessory.
    pub fn attach(
        &mut self,
        registry: &AccessoryRegistry,
        id: &str,
        me: &BallView,
        ctx: &mut AccessoryContext,
    ) -> bool {
        let Some((id, mut inner)) = registry.create(id) else {
            log::warn!("unknown accessory '{}' for ball {:?}", id, me.id);
            return false;
        };
        let list = self.attached.entry(me.id).or_default();
        if list.iter().any(|a| a.id == id) {
            log::debug!("ball {:?} already carries '{}'", me.id, id);
            return false;
        }
        if inner.capabilities().mass_multiplier.is_some()
            && list.iter().any(|a| a.inner.capabilities().mass_multiplier.is_some())
        {
            log::warn!("ball {:?} already has a mass modifier, rejecting '{}'", me.id, id);
            return false;
        }

        self.next_token += 1;
        let token = InstanceToken(self.next_token);
        ctx.set_owner(token);

        let before = cfg!(debug_assertions).then(|| ctx.fingerprint(me));
        inner.on_attach(me, ctx);
        if let Some(before) = before {
            let after = ctx.fingerprint(me);
            if before != after {
                log::error!("accessory '{}' altered the body of ball {:?}", id, me.id);
            }
            debug_assert_eq!(before, after, "accessory '{}' altered its ball's body", id);
        }

        if let Some(m) = inner.capabilities().mass_multiplier {
            ctx.physics.set_mass_multiplier(&me.body, m);
        }
        list.push(Attached { id, token, inner });
        true
    }

    /// Detach `id` from `me`: run `on_detach`, drop its visuals and any
    /// tasks it still has pending. False if it was not attached.
    pub fn detach(&mut self, id: &str, me: &BallView, ctx: &mut AccessoryContext) -> bool {
        let Some(list) = self.attached.get_mut(&me.id) else {
            return false;
        };
        let Some(index) = list.iter().position(|a| a.id == id) else {
            return false;
        };
        let attached = list.remove(index);
        if list.is_empty() {
            self.attached.remove(&me.id);
        }
        Self::tear_down(attached, me, ctx);
        true
    }

    /// Detach everything from a ball about to leave the scene.
    pub fn cleanup(&mut self, me: &BallView, ctx: &mut AccessoryContext) -> usize {
        let Some(list) = self.attached.remove(&me.id) else {
            return 0;
        };
        let count = list.len();
        for attached in list.into_iter().rev() {
            Self::tear_down(attached, me, ctx);
        }
        count
    }

    fn tear_down(mut attached: Attached, me: &BallView, ctx: &mut AccessoryContext) {
        ctx.set_owner(attached.token);
        attached.inner.on_detach(me, ctx);
        ctx.visuals.release(attached.token, ctx.host);
        ctx.scheduler.cancel_instance(attached.token);
        if attached.inner.capabilities().mass_multiplier.is_some() {
            ctx.physics.set_mass_multiplier(&me.body, 1.0);
        }
    }

    pub fn update(&mut self, me: &BallView, dt: f32, ctx: &mut AccessoryContext) {
        if let Some(list) = self.attached.get_mut(&me.id) {
            for a in list.iter_mut() {
                ctx.set_owner(a.token);
                a.inner.update(me, dt, ctx);
            }
        }
    }

    /// Contact hooks for `me`. A sinking host is out of play and hears nothing.
    pub fn contact(&mut self, me: &BallView, other: &BallView, ctx: &mut AccessoryContext) {
        if me.sinking {
            return;
        }
        if let Some(list) = self.attached.get_mut(&me.id) {
            for a in list.iter_mut() {
                ctx.set_owner(a.token);
                a.inner.on_contact(me, other, ctx);
            }
        }
    }

    /// Hand a due task to the instance that scheduled it. False when that
    /// instance is gone.
    pub fn deliver(&mut self, me: &BallView, token: InstanceToken, kind: TaskKind, ctx: &mut AccessoryContext) -> bool {
        let Some(a) = self
            .attached
            .get_mut(&me.id)
            .and_then(|list| list.iter_mut().find(|a| a.token == token))
        else {
            log::trace!("dropping task for detached instance {:?}", token);
            return false;
        };
        ctx.set_owner(a.token);
        match kind {
            TaskKind::ExpireVisual(node) => ctx.remove_visual(node),
            _ => a.inner.on_task(me, kind, ctx),
        }
        true
    }

    pub fn prevents_sinking(&self, ball: EntityId) -> bool {
        self.attached
            .get(&ball)
            .is_some_and(|list| list.iter().any(|a| a.inner.capabilities().prevents_sinking))
    }

    pub fn mass_multiplier(&self, ball: EntityId) -> f32 {
        self.attached
            .get(&ball)
            .and_then(|list| list.iter().find_map(|a| a.inner.capabilities().mass_multiplier))
            .unwrap_or(1.0)
    }

    pub fn has(&self, ball: EntityId, id: &str) -> bool {
        self.attached
            .get(&ball)
            .is_some_and(|list| list.iter().any(|a| a.id == id))
    }

    pub fn attached_ids(&self, ball: EntityId) -> Vec<AccessoryId> {
        self.attached
            .get(&ball)
            .map(|list| list.iter().map(|a| a.id).collect())
            .unwrap_or_default()
    }

    pub fn token_of(&self, ball: EntityId, id: &str) -> Option<InstanceToken> {
        self.attached
            .get(&ball)?
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.token)
    }

    pub fn clear(&mut self) {
        self.attached.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::{Capabilities, Command};
    use crate::api::config::AbilityTunables;
    use crate::ball::BallKind;
    use crate::core::schedule::Task;
    use crate::host::VisualNode;
    use crate::testing::Rig;
    use glam::Vec2;

    #[derive(Default)]
    struct Ballast;

    impl Accessory for Ballast {
        fn id(&self) -> AccessoryId {
            "ballast"
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { prevents_sinking: false, mass_multiplier: Some(2.0) }
        }
    }

    #[derive(Default)]
    struct Freezer;

    impl Accessory for Freezer {
        fn id(&self) -> AccessoryId {
            "freezer"
        }
        fn on_attach(&mut self, me: &BallView, ctx: &mut AccessoryContext) {
            ctx.physics.set_dynamic(&me.body, false);
        }
    }

    fn ballast() -> Box<dyn Accessory> {
        Box::new(Ballast)
    }

    fn freezer() -> Box<dyn Accessory> {
        Box::new(Freezer)
    }

    fn registry() -> AccessoryRegistry {
        let mut r = AccessoryRegistry::with_builtins();
        r.register_factory("ballast", ballast);
        r.register_factory("freezer", freezer);
        r
    }

    fn attach(rig: &mut Rig, m: &mut AccessoryManager, r: &AccessoryRegistry, id: &str, ball: EntityId) -> bool {
        let me = rig.view(ball);
        rig.with_ctx(|ctx| m.attach(r, id, &me, ctx))
    }

    fn detach(rig: &mut Rig, m: &mut AccessoryManager, id: &str, ball: EntityId) -> bool {
        let me = rig.view(ball);
        rig.with_ctx(|ctx| m.detach(id, &me, ctx))
    }

    fn contact(rig: &mut Rig, m: &mut AccessoryManager, ball: EntityId, other: EntityId) {
        let me = rig.view(ball);
        let them = rig.view(other);
        rig.with_ctx(|ctx| m.contact(&me, &them, ctx));
    }

    /// Advance the scheduler and deliver whatever fell due.
    fn run_tasks(rig: &mut Rig, m: &mut AccessoryManager, dt: f32) -> usize {
        let due = rig.scheduler.advance(dt);
        let mut delivered = 0;
        for t in due {
            if let Task::Accessory { ball, token, kind } = t.task {
                let me = rig.view(ball);
                if rig.with_ctx(|ctx| m.deliver(&me, token, kind, ctx)) {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    #[test]
    fn builtins_are_all_registered() {
        let r = AccessoryRegistry::with_builtins();
        assert_eq!(r.len(), 12);
        for id in ["gravity", "healing", "pulse", "zap", "burning", "spawner", "speedy", "explosive", "wings", "heavy", "spikes", "halo"] {
            assert!(r.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn register_is_idempotent() {
        let mut r = AccessoryRegistry::new();
        assert!(r.register_factory("ballast", ballast));
        assert!(!r.register_factory("ballast", freezer));
        assert_eq!(r.len(), 1);
        let (id, inner) = r.create("ballast").unwrap();
        assert_eq!(id, "ballast");
        assert_eq!(inner.id(), "ballast");
    }

    #[test]
    fn prevents_sinking_is_an_or() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        assert!(!m.prevents_sinking(a));
        assert!(attach(&mut rig, &mut m, &r, "halo", a));
        assert!(!m.prevents_sinking(a));
        assert!(attach(&mut rig, &mut m, &r, "wings", a));
        assert!(m.prevents_sinking(a));
        assert!(detach(&mut rig, &mut m, "wings", a));
        assert!(!m.prevents_sinking(a));
    }

    #[test]
    fn duplicate_attach_is_rejected() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        assert!(attach(&mut rig, &mut m, &r, "pulse", a));
        assert!(!attach(&mut rig, &mut m, &r, "pulse", a));
        assert_eq!(m.attached_ids(a), vec!["pulse"]);
    }

    #[test]
    fn unknown_and_absent_ids_fail() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        assert!(!attach(&mut rig, &mut m, &r, "jetpack", a));
        assert!(!detach(&mut rig, &mut m, "pulse", a));
        assert!(m.attached_ids(a).is_empty());
    }

    #[test]
    fn second_mass_modifier_is_rejected() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        assert!(attach(&mut rig, &mut m, &r, "heavy", a));
        assert!(!attach(&mut rig, &mut m, &r, "ballast", a));
        assert_eq!(m.mass_multiplier(a), 3.0);
        assert!(detach(&mut rig, &mut m, "heavy", a));
        assert!(attach(&mut rig, &mut m, &r, "ballast", a));
        assert_eq!(m.mass_multiplier(a), 2.0);
    }

    #[test]
    fn mass_multiplier_reaches_the_body() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        let body = rig.view(a).body;
        let base = rig.physics.base_mass(&body);
        attach(&mut rig, &mut m, &r, "heavy", a);
        rig.step_physics();
        assert!((rig.physics.mass(&body) - base * 3.0).abs() < base * 0.01);
        detach(&mut rig, &mut m, "heavy", a);
        rig.step_physics();
        assert!((rig.physics.mass(&body) - base).abs() < base * 0.01);
    }

    #[test]
    fn reattach_gives_fresh_instance() {
        let tunables = AbilityTunables { pulse_max_triggers: 2, ..AbilityTunables::default() };
        let mut rig = Rig::with_tunables(tunables);
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Pulse, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(400.0, 100.0));

        assert!(attach(&mut rig, &mut m, &r, "pulse", a));
        let first = m.token_of(a, "pulse");
        contact(&mut rig, &mut m, a, b);
        assert_eq!(run_tasks(&mut rig, &mut m, 1.0), 1);

        assert!(detach(&mut rig, &mut m, "pulse", a));
        assert!(attach(&mut rig, &mut m, &r, "pulse", a));
        assert_ne!(first, m.token_of(a, "pulse"));

        // A carried-over counter would hit the budget of 2 here.
        contact(&mut rig, &mut m, a, b);
        assert_eq!(run_tasks(&mut rig, &mut m, 1.0), 1);
        assert!(!rig.commands.iter().any(|c| matches!(c, Command::Destroy { .. })));
    }

    #[test]
    fn detach_mid_charge_cancels_discharge() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Pulse, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(150.0, 100.0));
        attach(&mut rig, &mut m, &r, "pulse", a);
        contact(&mut rig, &mut m, a, b);
        assert_eq!(rig.scheduler.len(), 1);
        assert!(!rig.scene_log.borrow().live_nodes().is_empty());

        detach(&mut rig, &mut m, "pulse", a);
        assert!(rig.scheduler.is_empty());
        assert!(rig.scene_log.borrow().live_nodes().is_empty());
        assert_eq!(run_tasks(&mut rig, &mut m, 1.0), 0);
        assert_eq!(rig.damage_log.borrow().damage_to(b), 0.0);
    }

    #[test]
    fn discharge_burst_comes_down_after_its_lifetime() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Pulse, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(400.0, 100.0));
        attach(&mut rig, &mut m, &r, "pulse", a);
        contact(&mut rig, &mut m, a, b);
        assert_eq!(run_tasks(&mut rig, &mut m, 0.7), 1);
        let live = rig.scene_log.borrow().live_nodes();
        assert!(matches!(live.as_slice(), [VisualNode::Burst { .. }]), "{:?}", live);

        assert_eq!(run_tasks(&mut rig, &mut m, 0.5), 1);
        assert!(rig.scene_log.borrow().live_nodes().is_empty());
        assert!(m.has(a, "pulse"));
    }

    #[test]
    fn sinking_host_ignores_contacts() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Burning, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(130.0, 100.0));
        attach(&mut rig, &mut m, &r, "burning", a);
        rig.begin_sink(a);
        contact(&mut rig, &mut m, a, b);
        assert!(rig.commands.is_empty());
    }

    #[test]
    fn stale_token_is_not_delivered() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Pulse, Vec2::new(100.0, 100.0));
        attach(&mut rig, &mut m, &r, "pulse", a);
        let me = rig.view(a);
        let delivered = rig.with_ctx(|ctx| m.deliver(&me, InstanceToken(999), TaskKind::Discharge, ctx));
        assert!(!delivered);
    }

    #[test]
    fn cleanup_detaches_everything() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Phoenix, Vec2::new(100.0, 100.0));
        attach(&mut rig, &mut m, &r, "burning", a);
        attach(&mut rig, &mut m, &r, "wings", a);
        let me = rig.view(a);
        assert_eq!(rig.with_ctx(|ctx| m.cleanup(&me, ctx)), 2);
        assert!(!m.has(a, "wings"));
        assert!(rig.scene_log.borrow().live_nodes().is_empty());
        assert_eq!(rig.with_ctx(|ctx| m.cleanup(&me, ctx)), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "altered its ball's body")]
    fn body_tampering_trips_debug_check() {
        let mut rig = Rig::new();
        let r = registry();
        let mut m = AccessoryManager::new();
        let a = rig.spawn(BallKind::Standard, Vec2::new(100.0, 100.0));
        attach(&mut rig, &mut m, &r, "freezer", a);
    }
}
