use crate::accessory::dispatch::falloff;
use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::DestroyReason;
use crate::ball::BallView;
use crate::host::VisualNode;

use super::EXPLOSIVE;

const COLOR: [f32; 3] = [1.0, 0.55, 0.10];

/// Blows up on its first contact, taking the host with it.
#[derive(Debug, Default)]
pub struct Explosive {
    exploded: bool,
}

impl Accessory for Explosive {
    fn id(&self) -> AccessoryId {
        EXPLOSIVE
    }

    fn on_contact(&mut self, me: &BallView, _other: &BallView, ctx: &mut AccessoryContext) {
        if self.exploded || me.sinking {
            return;
        }
        self.exploded = true;

        let radius = ctx.tunables().explosion_radius;
        let fade = ctx.tunables().falloff_fade;
        let impulse = ctx.tunables().explosion_impulse;
        let damage = ctx.tunables().explosion_damage;
        for other in ctx.others(me.id) {
            let delta = other.pos - me.pos;
            let f = falloff(delta.length(), radius, fade);
            if f <= 0.0 {
                continue;
            }
            ctx.apply_impulse(other, delta.normalize_or_zero() * impulse * f);
            ctx.host.damage.apply_direct_damage(other.id, damage * f);
        }
        ctx.add_flash(me.id, VisualNode::Burst { at: me.pos, radius, color: COLOR });
        log::debug!("ball {:?} exploded", me.id);
        ctx.commands.destroy(me.id, DestroyReason::Consumed);
    }
}
