//! Simulation tunables.
//!
//! `SimConfig` is owned by the `World` and read every frame. `AbilityTunables`
//! is exposed by the damage subsystem and read by accessories at the moment
//! they act. Both parse from JSON with every field optional.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::host::SettingsStore;

/// Aim and shot power curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    /// Pullback is clamped to this distance.
    pub max_shot_distance: f32,
    /// Impulse magnitude at full pullback.
    pub max_impulse: f32,
    /// 1.0 = linear, < 1.0 = sub-linear curve.
    pub power_exponent: f32,
    /// Releases below this pullback are discarded.
    pub dead_zone: f32,
    /// Below this pullback the aim direction is undefined and defaults to +X.
    pub min_visible_distance: f32,
    /// Cosmetic delay between release and the impulse landing (seconds).
    pub snap_delay: f32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            max_shot_distance: 180.0,
            max_impulse: 900.0,
            power_exponent: 1.0,
            dead_zone: 5.0,
            min_visible_distance: 2.0,
            snap_delay: 0.06,
        }
    }
}

/// Stop-snap and general rest thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub stop_speed_threshold: f32,
    pub stop_angular_threshold: f32,
    pub stop_hold_duration: f32,
    pub rest_speed_threshold: f32,
    pub rest_angular_threshold: f32,
    pub rest_check_duration: f32,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            stop_speed_threshold: 12.0,
            stop_angular_threshold: 0.5,
            stop_hold_duration: 0.25,
            rest_speed_threshold: 20.0,
            rest_angular_threshold: 1.0,
            rest_check_duration: 0.5,
        }
    }
}

/// Pocket-sink sampling and speed-dependent thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Sample count along the lower semicircle.
    pub samples: u32,
    /// How far past the perimeter each sample reaches.
    pub sample_depth: f32,
    /// Required unsupported fraction at or below `low_speed_threshold`.
    pub min_threshold: f32,
    /// Required unsupported fraction at or above `high_speed_threshold`.
    pub max_threshold: f32,
    pub low_speed_threshold: f32,
    pub high_speed_threshold: f32,
    /// Shrink + fade duration once sinking starts (seconds).
    pub animation_duration: f32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            samples: 12,
            sample_depth: 2.0,
            min_threshold: 0.45,
            max_threshold: 0.95,
            low_speed_threshold: 50.0,
            high_speed_threshold: 500.0,
            animation_duration: 0.35,
        }
    }
}

/// Axis-aligned playable area, used to clamp spawn candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableBounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl TableBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min: min.to_array(), max: max.to_array() }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::from_array(self.min)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::from_array(self.max)
    }

    /// Clamp a ball center so the whole ball stays inside.
    pub fn clamp(&self, p: Vec2, radius: f32) -> Vec2 {
        let lo = self.min() + Vec2::splat(radius);
        let hi = (self.max() - Vec2::splat(radius)).max(lo);
        p.clamp(lo, hi)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min()).all() && p.cmple(self.max()).all()
    }
}

impl Default for TableBounds {
    fn default() -> Self {
        Self { min: [0.0, 0.0], max: [1000.0, 500.0] }
    }
}

/// Everything the frame step needs that is not ability-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub fixed_dt: f32,
    pub shot: ShotConfig,
    pub rest: RestConfig,
    pub sink: SinkConfig,
    pub table: TableBounds,
    /// Ball textures are regenerated only above this speed.
    pub texture_speed_epsilon: f32,
    pub burn_tick_interval: f32,
    pub burn_tick_damage: f32,
    /// Base ball radius used by `World::spawn_ball`.
    pub ball_radius: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            shot: ShotConfig::default(),
            rest: RestConfig::default(),
            sink: SinkConfig::default(),
            table: TableBounds::default(),
            texture_speed_epsilon: 0.5,
            burn_tick_interval: 0.5,
            burn_tick_damage: 2.0,
            ball_radius: 12.0,
            linear_damping: 1.75,
            angular_damping: 1.0,
            restitution: 0.95,
            friction: 0.2,
            density: 0.01,
        }
    }
}

// Settings keys exposed to the settings UI. Only the user-facing sliders are persisted.
const KEY_MAX_IMPULSE: &str = "shot.max_impulse";
const KEY_POWER_EXPONENT: &str = "shot.power_exponent";
const KEY_MAX_SHOT_DISTANCE: &str = "shot.max_shot_distance";
const KEY_LINEAR_DAMPING: &str = "table.linear_damping";
const KEY_SINK_MIN: &str = "sink.min_threshold";
const KEY_SINK_MAX: &str = "sink.max_threshold";

impl SimConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Overlay persisted user settings on top of the defaults.
    /// Called at startup and when the settings screen closes, never per frame.
    pub fn load_from(store: &dyn SettingsStore) -> Self {
        let mut cfg = Self::default();
        cfg.shot.max_impulse = store.get_f32(KEY_MAX_IMPULSE, cfg.shot.max_impulse);
        cfg.shot.power_exponent = store.get_f32(KEY_POWER_EXPONENT, cfg.shot.power_exponent);
        cfg.shot.max_shot_distance =
            store.get_f32(KEY_MAX_SHOT_DISTANCE, cfg.shot.max_shot_distance);
        cfg.linear_damping = store.get_f32(KEY_LINEAR_DAMPING, cfg.linear_damping);
        cfg.sink.min_threshold = store.get_f32(KEY_SINK_MIN, cfg.sink.min_threshold);
        cfg.sink.max_threshold = store.get_f32(KEY_SINK_MAX, cfg.sink.max_threshold);
        cfg
    }

    /// Write the user-facing sliders back to the store.
    pub fn store_into(&self, store: &mut dyn SettingsStore) {
        store.set_f32(KEY_MAX_IMPULSE, self.shot.max_impulse);
        store.set_f32(KEY_POWER_EXPONENT, self.shot.power_exponent);
        store.set_f32(KEY_MAX_SHOT_DISTANCE, self.shot.max_shot_distance);
        store.set_f32(KEY_LINEAR_DAMPING, self.linear_damping);
        store.set_f32(KEY_SINK_MIN, self.sink.min_threshold);
        store.set_f32(KEY_SINK_MAX, self.sink.max_threshold);
    }
}

/// Ability tunables, owned by the damage subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTunables {
    // Pulse
    pub pulse_radius: f32,
    pub pulse_delay: f32,
    pub pulse_max_triggers: u32,
    pub pulse_impulse: f32,
    pub pulse_damage: f32,
    /// Units beyond the radius over which pulse/zap effects fade to zero.
    pub falloff_fade: f32,

    // Zap
    pub zap_radius: f32,
    pub zap_delay: f32,
    pub zap_max_triggers: u32,
    pub zap_max_targets: u32,
    pub zap_damage: f32,

    // Gravity
    pub gravity_radius: f32,
    pub gravity_strength: f32,
    pub gravity_interval: f32,
    /// Number of pulls before the host is consumed.
    pub gravity_lifetime: f32,

    // Healing
    pub healing_radius: f32,
    pub healing_amount: f32,
    pub healing_interval: f32,
    /// Total HP restored before the host is consumed.
    pub healing_lifetime: f32,

    // Explosion
    pub explosion_radius: f32,
    pub explosion_impulse: f32,
    pub explosion_damage: f32,

    // Burning
    pub burn_duration: f32,

    // Spawner
    pub spawner_max_spawns: u32,
    pub spawner_distance: f32,
    pub spawner_random_attempts: u32,

    // Speed boost
    pub boost_force: f32,
    pub boost_window: f32,

    // Spikes
    pub spike_damage: f32,
    pub spike_immunity: f32,

    // Heavy
    pub heavy_mass_multiplier: f32,

    /// Seconds a burst or lightning bolt stays on screen.
    pub flash_lifetime: f32,
}

impl Default for AbilityTunables {
    fn default() -> Self {
        Self {
            pulse_radius: 120.0,
            pulse_delay: 0.6,
            pulse_max_triggers: 3,
            pulse_impulse: 400.0,
            pulse_damage: 10.0,
            falloff_fade: 30.0,

            zap_radius: 160.0,
            zap_delay: 0.4,
            zap_max_triggers: 3,
            zap_max_targets: 3,
            zap_damage: 15.0,

            gravity_radius: 200.0,
            gravity_strength: 6000.0,
            gravity_interval: 0.1,
            gravity_lifetime: 120.0,

            healing_radius: 140.0,
            healing_amount: 5.0,
            healing_interval: 1.0,
            healing_lifetime: 60.0,

            explosion_radius: 110.0,
            explosion_impulse: 600.0,
            explosion_damage: 30.0,

            burn_duration: 3.0,

            spawner_max_spawns: 3,
            spawner_distance: 2.5,
            spawner_random_attempts: 32,

            boost_force: 2500.0,
            boost_window: 1.0,

            spike_damage: 8.0,
            spike_immunity: 0.5,

            heavy_mass_multiplier: 3.0,

            flash_lifetime: 0.3,
        }
    }
}

impl AbilityTunables {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
