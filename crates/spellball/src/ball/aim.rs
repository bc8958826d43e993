//! Pull-back aiming and the shot power curve.
//!
//! The player drags away from the ball; releasing fires the ball the
//! opposite way. Aiming is never gated on the ball being still, so a new
//! aim may begin while the previous shot is still in flight.

use glam::Vec2;

use crate::api::config::ShotConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimPhase {
    #[default]
    Idle,
    Aiming,
    /// Released; the impulse lands after the snap delay.
    DischargeInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AimState {
    pub phase: AimPhase,
    /// Pull direction in the ball's local frame, for the cue visual.
    pub local_dir: Vec2,
    /// Pull direction in world space, for the impulse.
    pub world_dir: Vec2,
    /// Clamped pullback distance.
    pub pull_distance: f32,
}

/// `max_impulse × (distance / max_shot_distance) ^ power_exponent`, distance clamped first.
pub fn shot_power(distance: f32, cfg: &ShotConfig) -> f32 {
    if cfg.max_shot_distance <= 0.0 {
        return 0.0;
    }
    let d = distance.clamp(0.0, cfg.max_shot_distance);
    cfg.max_impulse * (d / cfg.max_shot_distance).powf(cfg.power_exponent)
}

impl AimState {
    pub fn is_aiming(&self) -> bool {
        self.phase == AimPhase::Aiming
    }

    pub fn begin(&mut self) {
        self.phase = AimPhase::Aiming;
        self.clear_vectors();
    }

    /// Track the pointer. Returns false when no aim is in progress.
    pub fn update(&mut self, ball_pos: Vec2, ball_rotation: f32, pointer: Vec2, cfg: &ShotConfig) -> bool {
        if self.phase != AimPhase::Aiming {
            return false;
        }
        let pull = pointer - ball_pos;
        let raw = pull.length();
        self.pull_distance = raw.min(cfg.max_shot_distance);

        if raw < cfg.min_visible_distance {
            self.world_dir = Vec2::X;
            self.local_dir = Vec2::X;
        } else {
            self.world_dir = pull / raw;
            self.local_dir = Vec2::from_angle(-ball_rotation).rotate(self.world_dir);
        }
        true
    }

    /// Release. Returns the impulse to apply, or `None` if there was no aim
    /// or the pull was inside the dead zone.
    pub fn end(&mut self, cfg: &ShotConfig) -> Option<Vec2> {
        if self.phase != AimPhase::Aiming {
            return None;
        }
        if self.pull_distance < cfg.dead_zone {
            self.phase = AimPhase::Idle;
            self.clear_vectors();
            return None;
        }
        let power = shot_power(self.pull_distance, cfg);
        let impulse = -self.world_dir * power;
        self.phase = AimPhase::DischargeInFlight;
        Some(impulse)
    }

    pub fn cancel(&mut self) {
        self.phase = AimPhase::Idle;
        self.clear_vectors();
    }

    /// The delayed impulse landed. A newer aim keeps its phase.
    pub fn shot_landed(&mut self) {
        if self.phase == AimPhase::DischargeInFlight {
            self.phase = AimPhase::Idle;
            self.clear_vectors();
        }
    }

    fn clear_vectors(&mut self) {
        self.local_dir = Vec2::ZERO;
        self.world_dir = Vec2::ZERO;
        self.pull_distance = 0.0;
    }
}
