//! Timing patterns shared by several accessories.
//!
//! Triggered abilities (pulse, zap) charge for a delay and then discharge
//! through a scheduled task. Rest-gated abilities (gravity, healing) switch a
//! field on while their ball sits still and act on a fixed cadence.

use crate::ball::BallView;
use crate::core::schedule::{TaskId, TaskKind};
use crate::host::{NodeId, VisualNode};

use super::AccessoryContext;

/// Effect scale for a target `distance` away: full inside `radius`,
/// fading linearly to zero over the next `fade` units.
pub fn falloff(distance: f32, radius: f32, fade: f32) -> f32 {
    if distance <= radius {
        1.0
    } else if fade <= 0.0 {
        0.0
    } else {
        (1.0 - (distance - radius) / fade).max(0.0)
    }
}

/// Charge → discharge cycle with a trigger counter.
#[derive(Debug, Default)]
pub struct ChargeDischarge {
    pub charging: bool,
    pub triggers: u32,
    pub pending: Option<TaskId>,
    visual: Option<NodeId>,
}

impl ChargeDischarge {
    /// Start charging. Ignored while a charge is already running.
    pub fn trigger(&mut self, me: &BallView, delay: f32, charge: VisualNode, ctx: &mut AccessoryContext) -> bool {
        if self.charging {
            return false;
        }
        self.charging = true;
        self.triggers += 1;
        self.visual = ctx.add_visual(charge);
        self.pending = Some(ctx.schedule(me.id, delay, TaskKind::Discharge));
        true
    }

    /// The discharge fired (or was abandoned). Clears the charge visual.
    pub fn finish(&mut self, ctx: &mut AccessoryContext) {
        self.charging = false;
        self.pending = None;
        if let Some(node) = self.visual.take() {
            ctx.remove_visual(node);
        }
    }

    /// Whether the trigger budget is spent. A zero budget never runs out.
    pub fn reached(&self, max: u32) -> bool {
        max > 0 && self.triggers >= max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateTick {
    pub activated: bool,
    pub deactivated: bool,
}

/// Active only while the ball is at rest, and only after it has moved once.
#[derive(Debug, Default)]
pub struct RestGate {
    pub has_moved: bool,
    pub active: bool,
    pub field: Option<NodeId>,
    pub since_effect: f32,
    pub lifetime_used: f32,
    /// Lifetime reached. No further effects are due.
    pub spent: bool,
}

impl RestGate {
    pub fn tick(&mut self, me: &BallView, dt: f32, ctx: &mut AccessoryContext, field: VisualNode) -> GateTick {
        let mut out = GateTick::default();
        if !me.at_rest {
            self.has_moved = true;
            if self.active {
                self.active = false;
                self.hide(ctx);
                out.deactivated = true;
            }
        } else if self.has_moved && !self.active {
            self.active = true;
            self.since_effect = 0.0;
            self.field = ctx.add_visual(field);
            out.activated = true;
        }

        if self.active {
            self.since_effect += dt;
        }
        out
    }

    /// Consume one interval if it has elapsed.
    pub fn due(&mut self, interval: f32) -> bool {
        if self.spent || !self.active || interval <= 0.0 || self.since_effect < interval {
            return false;
        }
        self.since_effect -= interval;
        true
    }

    /// Count `amount` against `lifetime`. True once the total is reached.
    pub fn spend(&mut self, amount: f32, lifetime: f32) -> bool {
        self.lifetime_used += amount;
        if lifetime > 0.0 && self.lifetime_used >= lifetime {
            self.spent = true;
        }
        self.spent
    }

    pub fn hide(&mut self, ctx: &mut AccessoryContext) {
        if let Some(node) = self.field.take() {
            ctx.remove_visual(node);
        }
    }
}
