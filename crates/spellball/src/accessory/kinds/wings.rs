use crate::accessory::{Accessory, AccessoryContext, AccessoryId, Capabilities};
use crate::ball::BallView;
use crate::host::VisualNode;

use super::WINGS;

/// Carries its host over pockets.
#[derive(Debug, Default)]
pub struct Wings;

impl Accessory for Wings {
    fn id(&self) -> AccessoryId {
        WINGS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { prevents_sinking: true, ..Capabilities::default() }
    }

    fn on_attach(&mut self, me: &BallView, ctx: &mut AccessoryContext) {
        ctx.add_visual(VisualNode::Ring { owner: me.id, radius: me.radius * 1.6, color: [0.95, 0.95, 1.0] });
    }
}
