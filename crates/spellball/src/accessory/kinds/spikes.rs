use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::EntityId;
use crate::ball::BallView;

use super::SPIKES;

/// Contact damage. A struck pair is immune to each other for a moment.
#[derive(Debug, Default)]
pub struct Spikes {
    /// Ball and the time its immunity ends.
    cooldowns: Vec<(EntityId, f64)>,
}

impl Accessory for Spikes {
    fn id(&self) -> AccessoryId {
        SPIKES
    }

    fn on_contact(&mut self, me: &BallView, other: &BallView, ctx: &mut AccessoryContext) {
        if other.sinking {
            return;
        }
        let now = ctx.now();
        self.cooldowns.retain(|(_, until)| *until > now);
        if self.cooldowns.iter().any(|(id, _)| *id == other.id) {
            return;
        }

        let damage = ctx.tunables().spike_damage;
        let immunity = ctx.tunables().spike_immunity;
        ctx.host.damage.apply_direct_damage(other.id, damage);
        ctx.host.damage.set_temporary_immunity(me.id, other.id, immunity);
        self.cooldowns.push((other.id, now + immunity as f64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::BallKind;
    use crate::testing::Rig;
    use glam::Vec2;

    #[test]
    fn repeat_contact_inside_immunity_is_ignored() {
        let mut rig = Rig::new();
        let a = rig.spawn(BallKind::Spiked, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(124.0, 100.0));
        let mut s = Spikes::default();
        let hit = |rig: &mut Rig, s: &mut Spikes| {
            let (me, them) = (rig.view(a), rig.view(b));
            rig.with_ctx(|ctx| s.on_contact(&me, &them, ctx));
        };

        hit(&mut rig, &mut s);
        hit(&mut rig, &mut s);
        assert_eq!(rig.damage_log.borrow().damage_to(b), 8.0);
        assert_eq!(rig.damage_log.borrow().immunity, vec![(a, b, 0.5)]);

        rig.scheduler.advance(0.6);
        hit(&mut rig, &mut s);
        assert_eq!(rig.damage_log.borrow().damage_to(b), 16.0);
    }
}
