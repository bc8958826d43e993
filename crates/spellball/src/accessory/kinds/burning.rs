use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::ball::BallView;
use crate::host::VisualNode;

use super::BURNING;

/// Sets whatever it touches on fire.
#[derive(Debug, Default)]
pub struct Burning;

impl Accessory for Burning {
    fn id(&self) -> AccessoryId {
        BURNING
    }

    fn on_attach(&mut self, me: &BallView, ctx: &mut AccessoryContext) {
        ctx.add_visual(VisualNode::Flames { owner: me.id });
    }

    fn on_contact(&mut self, _me: &BallView, other: &BallView, ctx: &mut AccessoryContext) {
        if other.sinking {
            return;
        }
        let duration = ctx.tunables().burn_duration;
        ctx.commands.ignite(other.id, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::Command;
    use crate::ball::BallKind;
    use crate::testing::Rig;
    use glam::Vec2;

    #[test]
    fn contact_ignites_the_other_ball() {
        let mut rig = Rig::new();
        let a = rig.spawn(BallKind::Burning, Vec2::new(100.0, 100.0));
        let b = rig.spawn(BallKind::Standard, Vec2::new(124.0, 100.0));
        let mut burning = Burning;
        let (me, them) = (rig.view(a), rig.view(b));
        rig.with_ctx(|ctx| {
            burning.on_attach(&me, ctx);
            burning.on_contact(&me, &them, ctx);
        });
        assert_eq!(rig.commands.drain(), vec![Command::Ignite { ball: b, duration: 3.0 }]);
        assert_eq!(rig.scene_log.borrow().live_nodes(), vec![VisualNode::Flames { owner: a }]);

        rig.begin_sink(b);
        let (me, them) = (rig.view(a), rig.view(b));
        rig.with_ctx(|ctx| burning.on_contact(&me, &them, ctx));
        assert!(rig.commands.is_empty());
    }
}
