//! Ball kinds and their fixed visual/ability profiles.

use crate::accessory::kinds;
use crate::accessory::AccessoryId;
use crate::core::physics::ColliderDesc;

/// Silhouette used for both the collider and the generated texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallShape {
    Circle,
    Polygon { sides: u32 },
}

impl BallShape {
    pub fn collider(self, radius: f32) -> ColliderDesc {
        match self {
            BallShape::Circle => ColliderDesc::Ball { radius },
            BallShape::Polygon { sides } => ColliderDesc::RegularPolygon { radius, sides },
        }
    }

    /// Side count passed to the texture generator (0 = round).
    pub fn sides(self) -> u32 {
        match self {
            BallShape::Circle => 0,
            BallShape::Polygon { sides } => sides,
        }
    }
}

/// Closed set of ball variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BallKind {
    Cue,
    Standard,
    Eight,
    Gravity,
    Healing,
    Speedy,
    Explosive,
    Lightning,
    Pulse,
    Burning,
    Spawner,
    Heavy,
    Winged,
    Spiked,
    Phoenix,
    Ghost,
}

/// Fixed per-kind profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallProfile {
    pub color: [f32; 3],
    /// Texture pattern index understood by the host's generator.
    pub pattern: u32,
    pub shape: BallShape,
    /// Starting HP handed to the damage subsystem. `None` = its default.
    pub hp: Option<f32>,
    /// Accessories attached when the ball spawns.
    pub accessories: &'static [AccessoryId],
}

impl BallKind {
    pub const ALL: [BallKind; 16] = [
        BallKind::Cue,
        BallKind::Standard,
        BallKind::Eight,
        BallKind::Gravity,
        BallKind::Healing,
        BallKind::Speedy,
        BallKind::Explosive,
        BallKind::Lightning,
        BallKind::Pulse,
        BallKind::Burning,
        BallKind::Spawner,
        BallKind::Heavy,
        BallKind::Winged,
        BallKind::Spiked,
        BallKind::Phoenix,
        BallKind::Ghost,
    ];

    pub fn profile(self) -> BallProfile {
        use BallShape::*;
        let (color, pattern, shape, hp, accessories): (_, _, _, _, &'static [AccessoryId]) =
            match self {
                BallKind::Cue => ([0.95, 0.95, 0.92], 0, Circle, Some(150.0), &[]),
                BallKind::Standard => ([0.85, 0.65, 0.15], 1, Circle, None, &[]),
                BallKind::Eight => ([0.08, 0.08, 0.08], 2, Circle, None, &[]),
                BallKind::Gravity => ([0.45, 0.20, 0.75], 3, Circle, None, &[kinds::GRAVITY]),
                BallKind::Healing => ([0.25, 0.80, 0.35], 4, Circle, None, &[kinds::HEALING]),
                BallKind::Speedy => {
                    ([0.98, 0.90, 0.20], 5, Polygon { sides: 3 }, Some(60.0), &[kinds::SPEEDY])
                }
                BallKind::Explosive => ([0.90, 0.15, 0.10], 6, Circle, Some(40.0), &[kinds::EXPLOSIVE]),
                BallKind::Lightning => ([0.30, 0.85, 0.95], 7, Circle, None, &[kinds::ZAP]),
                BallKind::Pulse => ([0.20, 0.40, 0.95], 8, Circle, None, &[kinds::PULSE]),
                BallKind::Burning => ([0.98, 0.50, 0.10], 9, Circle, None, &[kinds::BURNING]),
                BallKind::Spawner => ([0.95, 0.45, 0.70], 10, Circle, None, &[kinds::SPAWNER]),
                BallKind::Heavy => {
                    ([0.45, 0.45, 0.50], 11, Polygon { sides: 8 }, Some(200.0), &[kinds::HEAVY])
                }
                BallKind::Winged => ([0.90, 0.92, 1.00], 12, Circle, None, &[kinds::WINGS]),
                BallKind::Spiked => {
                    ([0.30, 0.25, 0.20], 13, Polygon { sides: 6 }, None, &[kinds::SPIKES])
                }
                BallKind::Phoenix => {
                    ([0.95, 0.35, 0.05], 14, Circle, None, &[kinds::BURNING, kinds::WINGS])
                }
                BallKind::Ghost => ([0.80, 0.85, 0.90], 15, Circle, Some(50.0), &[kinds::HALO]),
            };
        BallProfile { color, pattern, shape, hp, accessories }
    }
}
