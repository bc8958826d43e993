// extensions/mod.rs
//
// Animation helpers layered over the scene. Nothing in core depends on them.

pub mod easing;
pub mod tween;

pub use easing::{ease, lerp, Easing};
pub use tween::{Tween, TweenDone, TweenId, TweenState, TweenTarget};
