// core/schedule.rs
//
// Deterministic delayed tasks, polled once per frame.
// Replaces wall-clock callbacks: a task fires on the first `advance` whose
// accumulated time reaches its due time. Cancelling is removing the entry.

use glam::Vec2;

use crate::accessory::InstanceToken;
use crate::api::types::EntityId;
use crate::host::NodeId;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

/// What an accessory asked to be woken up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// End of a charge: release the area effect.
    Discharge,
    /// Take down a one-shot visual the instance added.
    ExpireVisual(NodeId),
    /// Accessory-defined follow-up.
    Custom(u32),
}

/// A deferred piece of work. Every variant names the ball it belongs to so
/// the world can re-validate liveness before running it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Task {
    /// Land a released shot after the cosmetic snap delay.
    ApplyShot { ball: EntityId, impulse: Vec2 },
    /// Deliver `kind` to one specific accessory instance.
    Accessory { ball: EntityId, token: InstanceToken, kind: TaskKind },
}

impl Task {
    pub fn ball(&self) -> EntityId {
        match *self {
            Task::ApplyShot { ball, .. } => ball,
            Task::Accessory { ball, .. } => ball,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub due: f64,
    pub task: Task,
}

/// Pending task list with its own clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_id: u32,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `task` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledTask {
            id,
            due: self.now + delay.max(0.0) as f64,
            task,
        });
        id
    }

    /// Remove one task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Drop every task addressed to one accessory instance.
    pub fn cancel_instance(&mut self, token: InstanceToken) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| !matches!(t.task, Task::Accessory { token: tk, .. } if tk == token));
        before - self.pending.len()
    }

    /// Drop every task that belongs to a ball.
    pub fn cancel_ball(&mut self, ball: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.task.ball() != ball);
        before - self.pending.len()
    }

    /// Advance the clock and return every task now due, earliest first.
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledTask> {
        self.now += dt.max(0.0) as f64;
        let now = self.now;
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.pending.retain(|t| {
            if t.due <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(id: u32) -> Task {
        Task::ApplyShot { ball: EntityId(id), impulse: Vec2::X }
    }

    #[test]
    fn fires_after_delay() {
        let mut s = Scheduler::new();
        s.schedule(0.5, shot(1));
        assert!(s.advance(0.25).is_empty());
        let due = s.advance(0.25);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task.ball(), EntityId(1));
        assert!(s.is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_order() {
        let mut s = Scheduler::new();
        s.schedule(0.3, shot(3));
        s.schedule(0.1, shot(1));
        s.schedule(0.2, shot(2));
        let due = s.advance(1.0);
        let balls: Vec<_> = due.iter().map(|t| t.task.ball().0).collect();
        assert_eq!(balls, vec![1, 2, 3]);
    }

    #[test]
    fn cancel_removes_entry() {
        let mut s = Scheduler::new();
        let id = s.schedule(0.1, shot(1));
        assert!(s.is_pending(id));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(s.advance(1.0).is_empty());
    }

    #[test]
    fn cancel_instance_only_hits_that_token() {
        let mut s = Scheduler::new();
        let a = InstanceToken(1);
        let b = InstanceToken(2);
        s.schedule(0.1, Task::Accessory { ball: EntityId(1), token: a, kind: TaskKind::Discharge });
        s.schedule(0.1, Task::Accessory { ball: EntityId(1), token: b, kind: TaskKind::Discharge });
        assert_eq!(s.cancel_instance(a), 1);
        let due = s.advance(1.0);
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0].task, Task::Accessory { token, .. } if token == b));
    }

    #[test]
    fn cancel_ball_drops_all_its_tasks() {
        let mut s = Scheduler::new();
        s.schedule(0.1, shot(1));
        s.schedule(0.1, Task::Accessory { ball: EntityId(1), token: InstanceToken(9), kind: TaskKind::Custom(4) });
        s.schedule(0.1, shot(2));
        assert_eq!(s.cancel_ball(EntityId(1)), 2);
        assert_eq!(s.len(), 1);
    }
}
