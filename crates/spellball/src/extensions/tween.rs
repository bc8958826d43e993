// extensions/tween.rs
//
// Tweens on ball scale/alpha, keyed by EntityId.
//
// Usage:
//   let mut tweens = TweenState::new();
//   tweens.add(id, Tween::scale(1.0, 0.0, 0.35, Easing::QuadIn).with_on_complete(SINK));
//   tweens.tick(dt, &mut scene);
//   for done in tweens.drain_completed() { ... }

use std::collections::HashMap;

use super::easing::{ease, Easing};
use crate::api::types::EntityId;
use crate::core::scene::Scene;

/// What property a tween animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    /// Uniform `Ball::scale`.
    Scale { from: f32, to: f32 },
    /// `Ball::alpha`.
    Alpha { from: f32, to: f32 },
}

/// A single one-shot tween.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: TweenTarget,
    /// Duration in seconds.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    /// Tag reported through `drain_completed` when the tween finishes.
    pub on_complete: Option<u32>,
}

impl Tween {
    fn new(target: TweenTarget, duration: f32, easing: Easing) -> Self {
        Self {
            target,
            duration,
            elapsed: 0.0,
            easing,
            on_complete: None,
        }
    }

    pub fn scale(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Scale { from, to }, duration, easing)
    }

    pub fn alpha(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Alpha { from, to }, duration, easing)
    }

    /// Fade out to transparent.
    pub fn fade_out(duration: f32, easing: Easing) -> Self {
        Self::alpha(1.0, 0.0, duration, easing)
    }

    pub fn with_on_complete(mut self, tag: u32) -> Self {
        self.on_complete = Some(tag);
        self
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Handle to a tween for later reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u32);

/// A finished tween that carried a completion tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenDone {
    pub entity: EntityId,
    pub tag: u32,
}

/// Manages all active tweens.
#[derive(Debug, Default)]
pub struct TweenState {
    tweens: HashMap<TweenId, (EntityId, Tween)>,
    next_id: u32,
    completed: Vec<TweenDone>,
}

impl TweenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tween for a ball.
    pub fn add(&mut self, entity: EntityId, tween: Tween) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.insert(id, (entity, tween));
        id
    }

    /// Remove all tweens for a ball. Their completion tags are never reported.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.tweens.retain(|_, (e, _)| *e != entity);
    }

    /// Advance all tweens and apply them to balls in the scene.
    /// Tweens whose ball is gone are dropped without completing.
    /// Returns the number of tweens that completed this tick.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> usize {
        let mut finished: Vec<TweenId> = Vec::new();
        let mut done = 0;

        // Stable order so completions come out deterministically.
        let mut ids: Vec<TweenId> = self.tweens.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let Some((entity_id, tween)) = self.tweens.get_mut(&id) else {
                continue;
            };
            let Some(ball) = scene.get_mut(*entity_id) else {
                finished.push(id);
                continue;
            };
            tween.elapsed += dt;
            let t = tween.progress();
            match tween.target {
                TweenTarget::Scale { from, to } => ball.scale = ease(from, to, t, tween.easing),
                TweenTarget::Alpha { from, to } => ball.alpha = ease(from, to, t, tween.easing),
            }

            if tween.is_complete() {
                if let Some(tag) = tween.on_complete {
                    self.completed.push(TweenDone { entity: *entity_id, tag });
                }
                finished.push(id);
                done += 1;
            }
        }

        for id in &finished {
            self.tweens.remove(id);
        }
        done
    }

    /// Drain completed tween tags.
    pub fn drain_completed(&mut self) -> impl Iterator<Item = TweenDone> + '_ {
        self.completed.drain(..)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}
