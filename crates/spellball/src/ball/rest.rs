use crate::api::config::RestConfig;

/// Outcome of one rest-detector tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestTick {
    /// Velocity should be zeroed this frame.
    pub snap: bool,
    pub at_rest: bool,
}

/// Two independent timers: a hard stop that snaps slow-rolling balls to a
/// full stop, and a looser "at rest" flag abilities gate on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RestDetector {
    pub low_speed_timer: f32,
    pub has_snapped: bool,
    pub rest_timer: f32,
    pub at_rest: bool,
}

impl RestDetector {
    pub fn tick(&mut self, speed: f32, angular_speed: f32, dt: f32, cfg: &RestConfig) -> RestTick {
        let angular_speed = angular_speed.abs();
        let mut snap = false;

        // Between the threshold and twice it the timer neither grows nor resets.
        if speed > 2.0 * cfg.stop_speed_threshold {
            self.low_speed_timer = 0.0;
            self.has_snapped = false;
        } else if speed < cfg.stop_speed_threshold && angular_speed < cfg.stop_angular_threshold {
            self.low_speed_timer += dt;
            if self.low_speed_timer >= cfg.stop_hold_duration && !self.has_snapped {
                self.has_snapped = true;
                snap = true;
            }
        }

        if speed < cfg.rest_speed_threshold && angular_speed < cfg.rest_angular_threshold {
            self.rest_timer += dt;
            if self.rest_timer >= cfg.rest_check_duration {
                self.at_rest = true;
            }
        } else {
            self.rest_timer = 0.0;
            self.at_rest = false;
        }

        RestTick { snap, at_rest: self.at_rest }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
