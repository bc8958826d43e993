//! Pocket-sink heuristic.
//!
//! A ball sinks once enough of its lower rim hangs over something that is not
//! felt. Faster balls must hang further out before they drop, so a ball
//! rolling across a pocket lip keeps going.

use glam::Vec2;

use crate::api::config::SinkConfig;
use crate::host::FeltProvider;

/// Fraction of rim samples that miss the felt, in `[0, 1]`.
///
/// Samples are spread evenly from -90° to +90° around straight down (+Y),
/// each pushed `depth` past the perimeter.
pub fn unsupported_fraction(
    center: Vec2,
    radius: f32,
    felt: &dyn FeltProvider,
    samples: u32,
    depth: f32,
) -> f32 {
    if samples == 0 {
        return 0.0;
    }
    let reach = radius + depth;
    let mut unsupported = 0u32;
    for i in 0..samples {
        let t = if samples == 1 {
            0.5
        } else {
            i as f32 / (samples - 1) as f32
        };
        let angle = (-90.0 + 180.0 * t).to_radians();
        let dir = Vec2::new(angle.sin(), angle.cos());
        if !felt.is_felt(center + dir * reach) {
            unsupported += 1;
        }
    }
    unsupported as f32 / samples as f32
}

/// Unsupported fraction needed before a ball at `speed` sinks.
/// Clamped at both ends of the speed band.
pub fn required_unsupported(speed: f32, cfg: &SinkConfig) -> f32 {
    let band = cfg.high_speed_threshold - cfg.low_speed_threshold;
    let ratio = if band > 0.0 {
        ((speed - cfg.low_speed_threshold) / band).clamp(0.0, 1.0)
    } else if speed > cfg.low_speed_threshold {
        1.0
    } else {
        0.0
    };
    cfg.min_threshold + (cfg.max_threshold - cfg.min_threshold) * ratio
}

pub fn should_sink(fraction: f32, speed: f32, prevents_sinking: bool, cfg: &SinkConfig) -> bool {
    !prevents_sinking && fraction >= required_unsupported(speed, cfg)
}
