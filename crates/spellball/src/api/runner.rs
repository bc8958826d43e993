//! Frame driver: turns variable frame time into fixed world steps.

use crate::api::world::World;
use crate::core::time::FixedTimestep;
use crate::input::queue::{InputEvent, InputQueue};

/// Owns the world, the step accumulator and pending input.
pub struct Runner {
    world: World,
    timestep: FixedTimestep,
    input: InputQueue,
}

impl Runner {
    pub fn new(world: World) -> Self {
        let timestep = FixedTimestep::new(world.config().fixed_dt).with_max_steps(10);
        Self {
            world,
            timestep,
            input: InputQueue::new(),
        }
    }

    /// Queue input for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Apply queued input, then run as many fixed steps as `frame_dt` covers.
    /// Returns the number of steps taken.
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        for event in self.input.drain() {
            self.world.handle_input(event);
        }
        let steps = self.timestep.accumulate(frame_dt);
        let dt = self.timestep.dt();
        for _ in 0..steps {
            self.world.step(dt);
        }
        steps
    }

    /// Render interpolation between the last two steps.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{AbilityTunables, SimConfig};
    use crate::api::types::event_kinds;
    use crate::ball::BallKind;
    use crate::testing::recording_host;
    use glam::Vec2;

    fn runner() -> Runner {
        let (host, _scene, _damage) = recording_host(AbilityTunables::default());
        Runner::new(World::new(SimConfig::default(), host))
    }

    #[test]
    fn frame_time_becomes_fixed_steps() {
        let mut r = runner();
        assert_eq!(r.frame(1.0 / 30.0), 2);
        assert_eq!(r.frame(0.004), 0);
        assert_eq!(r.frame(5.0), 10, "long stalls are capped");
        assert!((r.world().now() - 12.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn queued_input_reaches_the_world() {
        let mut r = runner();
        let id = r.world_mut().spawn_ball(BallKind::Cue, Vec2::new(500.0, 250.0));
        r.push_input(InputEvent::Select { id: id.0 });
        r.push_input(InputEvent::AimBegin { x: 500.0, y: 250.0 });
        r.push_input(InputEvent::AimEnd { x: 400.0, y: 250.0 });
        r.frame(1.0 / 60.0);
        assert_eq!(r.world().selected(), Some(id));
        for _ in 0..10 {
            r.frame(1.0 / 60.0);
        }
        let events = r.world_mut().drain_events();
        assert!(events.iter().any(|e| e.kind == event_kinds::SHOT_FIRED));
    }
}
