use crate::accessory::dispatch::{falloff, RestGate};
use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::DestroyReason;
use crate::ball::BallView;
use crate::host::VisualNode;

use super::HEALING;

const FIELD_COLOR: [f32; 3] = [0.25, 0.80, 0.35];

/// Heals nearby balls on a cadence while its host rests. Consumed once it
/// has restored its lifetime total.
#[derive(Debug, Default)]
pub struct HealingAura {
    gate: RestGate,
}

impl Accessory for HealingAura {
    fn id(&self) -> AccessoryId {
        HEALING
    }

    fn update(&mut self, me: &BallView, dt: f32, ctx: &mut AccessoryContext) {
        let radius = ctx.tunables().healing_radius;
        let field = VisualNode::Field { owner: me.id, radius, color: FIELD_COLOR };
        self.gate.tick(me, dt, ctx, field);

        let interval = ctx.tunables().healing_interval;
        while self.gate.due(interval) {
            let amount = ctx.tunables().healing_amount;
            let fade = ctx.tunables().falloff_fade;
            let mut healed = 0.0;
            for other in ctx.others(me.id) {
                let f = falloff(me.pos.distance(other.pos), radius, fade);
                if f > 0.0 {
                    ctx.host.damage.heal(other.id, amount * f);
                    healed += amount * f;
                }
            }

            if healed > 0.0 && self.gate.spend(healed, ctx.tunables().healing_lifetime) {
                log::debug!("healing aura on {:?} spent", me.id);
                self.gate.hide(ctx);
                ctx.commands.destroy(me.id, DestroyReason::Consumed);
                break;
            }
        }
    }

    fn on_detach(&mut self, _me: &BallView, ctx: &mut AccessoryContext) {
        self.gate.hide(ctx);
    }
}
