//! Collaborator contracts the core consumes but does not implement.
//!
//! The rendering scene, the felt/hole grid, the HP subsystem, texture
//! generation and settings persistence all live on the host side. The core
//! talks to them only through the traits below, bundled into `Host`.

mod felt;
mod settings;

pub use felt::{FeltCell, FeltGrid};
pub use settings::JsonSettings;

use glam::Vec2;

use crate::api::config::AbilityTunables;
use crate::api::types::{DestroyReason, EntityId};

/// Handle to a visual node owned by the scene host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Handle to a generated ball texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Visual nodes the core asks the host to draw. Pure description, no GPU state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualNode {
    /// Persistent field around a ball (gravity well, healing aura).
    Field { owner: EntityId, radius: f32, color: [f32; 3] },
    /// Wind-up glow while an ability charges.
    Charge { owner: EntityId, radius: f32, color: [f32; 3] },
    /// Ring decoration that follows a ball (wings, halo, heavy plating).
    Ring { owner: EntityId, radius: f32, color: [f32; 3] },
    /// Flames attached to a burning ball.
    Flames { owner: EntityId },
    /// One-shot burst at a fixed point (pulse, explosion).
    Burst { at: Vec2, radius: f32, color: [f32; 3] },
    /// Lightning bolt between two points.
    Lightning { from: Vec2, to: Vec2 },
}

/// Rendering scene / scene graph.
pub trait SceneHost {
    fn add_node(&mut self, node: VisualNode) -> NodeId;
    fn remove_node(&mut self, id: NodeId);
    /// The ball finished its sink animation.
    fn ball_sunk(&mut self, ball: EntityId);
    fn ball_destroyed(&mut self, _ball: EntityId, _reason: DestroyReason) {}
}

/// O(1) felt/hole lookup over the table surface.
pub trait FeltProvider {
    fn is_felt(&self, p: Vec2) -> bool;
    fn is_hole(&self, p: Vec2) -> bool;
}

/// HP bookkeeping. Only the surface the core calls into.
pub trait DamageSink {
    fn register_ball(&mut self, ball: EntityId, hp: Option<f32>);
    fn unregister_ball(&mut self, _ball: EntityId) {}
    fn apply_direct_damage(&mut self, ball: EntityId, amount: f32);
    fn heal(&mut self, ball: EntityId, amount: f32);
    fn set_temporary_immunity(&mut self, a: EntityId, b: EntityId, duration: f32);
    /// Live tunables. Accessories read this at the moment they act.
    fn config(&self) -> &AbilityTunables;
    /// Balls whose HP reached zero since the last call.
    fn take_depleted(&mut self) -> Vec<EntityId> {
        Vec::new()
    }
}

/// Parameters for the host's procedural ball texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    pub rotation: f32,
    pub color: [f32; 3],
    pub pattern: u32,
    pub sides: u32,
}

pub trait TextureGenerator {
    fn generate(&mut self, params: TextureParams) -> TextureId;
}

/// Key/value persistence for user settings. Never touched on the per-frame path.
pub trait SettingsStore {
    fn get_f32(&self, key: &str, default: f32) -> f32;
    fn set_f32(&mut self, key: &str, value: f32);
}

/// Damage sink that only serves tunables. For headless runs and tools.
#[derive(Debug, Default)]
pub struct NoDamage {
    pub tunables: AbilityTunables,
}

impl DamageSink for NoDamage {
    fn register_ball(&mut self, _ball: EntityId, _hp: Option<f32>) {}
    fn apply_direct_damage(&mut self, _ball: EntityId, _amount: f32) {}
    fn heal(&mut self, _ball: EntityId, _amount: f32) {}
    fn set_temporary_immunity(&mut self, _a: EntityId, _b: EntityId, _duration: f32) {}
    fn config(&self) -> &AbilityTunables {
        &self.tunables
    }
}

/// Bundle of collaborators handed to the world.
/// Optional collaborators may be missing; calls that need them log and no-op.
pub struct Host {
    scene: Option<Box<dyn SceneHost>>,
    felt: Option<Box<dyn FeltProvider>>,
    textures: Option<Box<dyn TextureGenerator>>,
    pub damage: Box<dyn DamageSink>,
}

impl Host {
    pub fn new(damage: Box<dyn DamageSink>) -> Self {
        Self {
            scene: None,
            felt: None,
            textures: None,
            damage,
        }
    }

    /// Host with no collaborators beyond default tunables.
    pub fn headless() -> Self {
        Self::new(Box::new(NoDamage::default()))
    }

    pub fn with_scene(mut self, scene: Box<dyn SceneHost>) -> Self {
        self.scene = Some(scene);
        self
    }

    pub fn with_felt(mut self, felt: Box<dyn FeltProvider>) -> Self {
        self.felt = Some(felt);
        self
    }

    pub fn with_textures(mut self, textures: Box<dyn TextureGenerator>) -> Self {
        self.textures = Some(textures);
        self
    }

    pub fn set_felt(&mut self, felt: Option<Box<dyn FeltProvider>>) {
        self.felt = felt;
    }

    pub fn felt(&self) -> Option<&dyn FeltProvider> {
        self.felt.as_deref()
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Live tunables from the damage subsystem.
    pub fn tunables(&self) -> &AbilityTunables {
        self.damage.config()
    }

    pub fn add_node(&mut self, node: VisualNode) -> Option<NodeId> {
        match self.scene.as_mut() {
            Some(scene) => Some(scene.add_node(node)),
            None => {
                log::debug!("no scene host, dropping visual {:?}", node);
                None
            }
        }
    }

    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(scene) = self.scene.as_mut() {
            scene.remove_node(id);
        }
    }

    pub fn notify_sunk(&mut self, ball: EntityId) {
        match self.scene.as_mut() {
            Some(scene) => scene.ball_sunk(ball),
            None => log::warn!("ball {:?} sunk with no scene host attached", ball),
        }
    }

    pub fn notify_destroyed(&mut self, ball: EntityId, reason: DestroyReason) {
        if let Some(scene) = self.scene.as_mut() {
            scene.ball_destroyed(ball, reason);
        }
    }

    pub fn generate_texture(&mut self, params: TextureParams) -> Option<TextureId> {
        self.textures.as_mut().map(|t| t.generate(params))
    }
}
