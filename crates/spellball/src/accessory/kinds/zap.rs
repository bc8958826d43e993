use crate::accessory::dispatch::{falloff, ChargeDischarge};
use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::DestroyReason;
use crate::ball::BallView;
use crate::core::schedule::TaskKind;
use crate::host::VisualNode;

use super::ZAP;

const COLOR: [f32; 3] = [0.30, 0.85, 0.95];

/// Charges on contact, then strikes the nearest balls with lightning.
#[derive(Debug, Default)]
pub struct Zap {
    charge: ChargeDischarge,
}

impl Accessory for Zap {
    fn id(&self) -> AccessoryId {
        ZAP
    }

    fn on_contact(&mut self, me: &BallView, _other: &BallView, ctx: &mut AccessoryContext) {
        if me.sinking || self.charge.reached(ctx.tunables().zap_max_triggers) {
            return;
        }
        let delay = ctx.tunables().zap_delay;
        let radius = ctx.tunables().zap_radius;
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

        let radius = ctx.tunables().zap_radius;
        let fade = ctx.tunables().falloff_fade;
        let damage = ctx.tunables().zap_damage;
        let max_targets = ctx.tunables().zap_max_targets as usize;

        let mut targets: Vec<(f32, &BallView)> = ctx
            .others(me.id)
            .map(|o| (me.pos.distance(o.pos), o))
            .filter(|(d, _)| falloff(*d, radius, fade) > 0.0)
            .collect();
        targets.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        targets.truncate(max_targets);

        for (dist, target) in targets {
            let f = falloff(dist, radius, fade);
            ctx.add_flash(me.id, VisualNode::Lightning { from: me.pos, to: target.pos });
            ctx.host.damage.apply_direct_damage(target.id, damage * f);
        }

        if self.charge.reached(ctx.tunables().zap_max_triggers) {
            log::debug!("zap on {:?} used its last trigger", me.id);
            ctx.commands.destroy(me.id, DestroyReason::Consumed);
        }
    }

    fn on_detach(&mut self, _me: &BallView, ctx: &mut AccessoryContext) {
        self.charge.finish(ctx);
    }
}
