pub mod accessory;
pub mod api;
pub mod ball;
pub mod core;
pub mod extensions;
pub mod host;
pub mod input;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience
pub use accessory::{
    Accessory, AccessoryContext, AccessoryId, AccessoryManager, AccessoryRegistry, Capabilities,
    Command, Commands, InstanceToken,
};
pub use api::config::{AbilityTunables, RestConfig, ShotConfig, SimConfig, SinkConfig, TableBounds};
pub use api::runner::Runner;
pub use api::types::{event_kinds, DestroyReason, EntityId, GameEvent};
pub use api::world::World;
pub use ball::{AimPhase, AimState, Ball, BallKind, BallShape, BallView, SinkState};
pub use crate::core::physics::{BodyFingerprint, PhysicsBody, PhysicsWorld};
pub use crate::core::scene::Scene;
pub use crate::core::schedule::{Scheduler, Task, TaskId, TaskKind};
pub use crate::core::time::FixedTimestep;
pub use host::{
    DamageSink, FeltCell, FeltGrid, FeltProvider, Host, JsonSettings, NodeId, SceneHost,
    SettingsStore, TextureGenerator, TextureId, TextureParams, VisualNode,
};
pub use input::queue::{InputEvent, InputQueue};
