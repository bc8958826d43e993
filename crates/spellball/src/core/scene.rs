use crate::api::types::EntityId;
use crate::ball::Ball;

/// Arena of balls indexed directly by `EntityId`.
/// Ids are never reused, so a slot that has been vacated stays `None` and
/// any stale id resolves to nothing.
pub struct Scene {
    slots: Vec<Option<Ball>>,
    live: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a scene with a specific slot capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Add a ball. Its id selects the slot; an occupied slot is replaced.
    pub fn spawn(&mut self, ball: Ball) {
        let idx = ball.id.index();
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        if self.slots[idx].is_some() {
            log::error!("slot {} already occupied, replacing", idx);
        } else {
            self.live += 1;
        }
        self.slots[idx] = Some(ball);
    }

    /// Remove a ball by ID. Returns the removed ball if it was live.
    pub fn despawn(&mut self, id: EntityId) -> Option<Ball> {
        let ball = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        Some(ball)
    }

    pub fn get(&self, id: EntityId) -> Option<&Ball> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Ball> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over live balls in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Ids of all live balls, collected so callers can mutate the scene while walking them.
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|b| b.id).collect()
    }

    /// Number of live balls.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
