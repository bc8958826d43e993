use crate::accessory::{Accessory, AccessoryContext, AccessoryId, Capabilities};
use crate::ball::BallView;
use crate::host::VisualNode;

use super::HEAVY;

/// Iron plating. The manager scales the host's mass by `multiplier`.
#[derive(Debug)]
pub struct Heavy {
    multiplier: f32,
}

impl Default for Heavy {
    fn default() -> Self {
        Self { multiplier: 3.0 }
    }
}

impl Accessory for Heavy {
    fn id(&self) -> AccessoryId {
        HEAVY
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { mass_multiplier: Some(self.multiplier), ..Capabilities::default() }
    }

    fn on_attach(&mut self, me: &BallView, ctx: &mut AccessoryContext) {
        self.multiplier = ctx.tunables().heavy_mass_multiplier;
        ctx.add_visual(VisualNode::Ring { owner: me.id, radius: me.radius * 1.1, color: [0.35, 0.35, 0.40] });
    }
}
