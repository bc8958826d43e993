use crate::accessory::{Accessory, AccessoryContext, AccessoryId};
use crate::ball::BallView;
use crate::host::VisualNode;

use super::HALO;

#[derive(Debug, Default)]
pub struct Halo;

impl Accessory for Halo {
    fn id(&self) -> AccessoryId {
        HALO
    }

    fn on_attach(&mut self, me: &BallView, ctx: &mut AccessoryContext) {
        ctx.add_visual(VisualNode::Ring { owner: me.id, radius: me.radius * 1.3, color: [1.0, 0.84, 0.0] });
    }
}
