use crate::accessory::dispatch::{falloff, RestGate};
use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::api::types::DestroyReason;
use crate::ball::BallView;
use crate::host::VisualNode;

use super::GRAVITY;

const FIELD_COLOR: [f32; 3] = [0.45, 0.20, 0.75];

/// Pulls nearby balls in while its host rests. Consumed after a fixed
/// number of pulls.
#[derive(Debug, Default)]
pub struct GravityWell {
    gate: RestGate,
}

impl Accessory for GravityWell {
    fn id(&self) -> AccessoryId {
        GRAVITY
    }

    fn update(&mut self, me: &BallView, dt: f32, ctx: &mut AccessoryContext) {
        let radius = ctx.tunables().gravity_radius;
        let field = VisualNode::Field { owner: me.id, radius, color: FIELD_COLOR };
        self.gate.tick(me, dt, ctx, field);

        let interval = ctx.tunables().gravity_interval;
        while self.gate.due(interval) {
            let strength = ctx.tunables().gravity_strength;
            let fade = ctx.tunables().falloff_fade;
            for other in ctx.others(me.id) {
                let delta = me.pos - other.pos;
                let dist = delta.length();
                let f = falloff(dist, radius, fade);
                if f <= 0.0 || dist < 1e-3 {
                    continue;
                }
                ctx.apply_impulse(other, delta / dist * strength * f * interval);
            }

            if self.gate.spend(1.0, ctx.tunables().gravity_lifetime) {
                log::debug!("gravity well on {:?} spent", me.id);
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
