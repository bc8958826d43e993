use crate::accessory::dispatch::{falloff, ChargeDischarge};
use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::DestroyReason;
use crate::ball::BallView;
use crate::core::schedule::TaskKind;
use crate::host::VisualNode;

use super::PULSE;

const COLOR: [f32; 3] = [0.20, 0.40, 0.95];

/// Charges on contact, then shoves and damages everything around it.
#[derive(Debug, Default)]
pub struct Pulse {
    charge: ChargeDischarge,
}

impl Accessory for Pulse {
    fn id(&self) -> AccessoryId {
        PULSE
    }

    fn on_contact(&mut self, me: &BallView, _other: &BallView, ctx: &mut AccessoryContext) {
        if me.sinking || self.charge.reached(ctx.tunables().pulse_max_triggers) {
            return;
        }
        let delay = ctx.tunables().pulse_delay;
        let radius = ctx.tunables().pulse_radius;
        let visual = VisualNode::Charge { owner: me.id, radius, color: COLOR };
        self.charge.trigger(me, delay, visual, ctx);
    }

    fn on_task(&mut self, me: &BallView, kind: TaskKind, ctx: &mut AccessoryContext) {
        if kind != TaskKind::Discharge {
            return;
        }
        self.charge.finish(ctx);
        if me.sinking {
            return;
        }

        let radius = ctx.tunables().pulse_radius;
        let fade = ctx.tunables().falloff_fade;
        let impulse = ctx.tunables().pulse_impulse;
        let damage = ctx.tunables().pulse_damage;
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

        if self.charge.reached(ctx.tunables().pulse_max_triggers) {
            log::debug!("pulse on {:?} used its last trigger", me.id);
            ctx.commands.destroy(me.id, DestroyReason::Consumed);
        }
    }

    fn on_detach(&mut self, _me: &BallView, ctx: &mut AccessoryContext) {
        self.charge.finish(ctx);
    }
}
