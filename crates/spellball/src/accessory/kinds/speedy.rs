use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::ball::BallView;

use super::SPEEDY;

/// Keeps pushing its host along its heading for a short window after every
/// shot from rest.
#[derive(Debug, Default)]
pub struct Speedy {
    was_at_rest: bool,
    boost_left: f32,
}

impl Accessory for Speedy {
    fn id(&self) -> AccessoryId {
        SPEEDY
    }

    fn update(&mut self, me: &BallView, dt: f32, ctx: &mut AccessoryContext) {
        if self.was_at_rest && !me.at_rest {
            self.boost_left = ctx.tunables().boost_window;
        }
        self.was_at_rest = me.at_rest;

        if self.boost_left <= 0.0 {
            return;
        }
        self.boost_left -= dt;
        if me.speed() > 1.0 {
            let force = ctx.tunables().boost_force;
            ctx.apply_impulse(me, me.velocity.normalize() * force * dt);
        }
    }
}
