use bytemuck::{Pod, Zeroable};

/// Dense identifier for a ball in the scene.
/// Handed out monotonically by the `World` and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Slot index into arena storage.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A game event communicated from the simulation to the host.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

/// Event kinds emitted by the world.
pub mod event_kinds {
    /// A ball finished its sink animation. `a` = entity id.
    pub const BALL_SUNK: f32 = 1.0;
    /// A ball was destroyed for any other reason. `a` = entity id, `b` = reason code.
    pub const BALL_DESTROYED: f32 = 2.0;
    /// A ball was spawned mid-game. `a` = entity id, `b/c` = position.
    pub const BALL_SPAWNED: f32 = 3.0;
    /// A shot impulse landed. `a` = entity id, `b` = impulse magnitude.
    pub const SHOT_FIRED: f32 = 4.0;
}

/// Why a ball left the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyReason {
    /// Completed the sink animation over a hole.
    Sunk,
    /// The damage subsystem reported zero HP.
    HpDepleted,
    /// An ability consumed its host (pulse/zap max triggers, explosion, lifetime).
    Consumed,
    /// Removed by the game (reset, table teardown).
    Removed,
}

impl DestroyReason {
    pub fn code(self) -> f32 {
        match self {
            DestroyReason::Sunk => 0.0,
            DestroyReason::HpDepleted => 1.0,
            DestroyReason::Consumed => 2.0,
            DestroyReason::Removed => 3.0,
        }
    }
}
