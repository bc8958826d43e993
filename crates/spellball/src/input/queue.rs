/// Input events the world understands. Coordinates are table space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on the selected ball: start pulling back.
    AimBegin { x: f32, y: f32 },
    /// Pointer dragged while aiming.
    AimMove { x: f32, y: f32 },
    /// Pointer released: fire unless inside the dead zone.
    AimEnd { x: f32, y: f32 },
    /// Aim abandoned (pointer left the table, escape key).
    AimCancel,
    /// Select the ball that aim events apply to. `id` is the raw entity id.
    Select { id: u32 },
    /// Host-defined event. `kind` identifies it; `a`, `b`, `c` carry payload.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// Events pushed by the host between frames, drained once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_keeps_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::AimBegin { x: 10.0, y: 20.0 });
        q.push(InputEvent::AimMove { x: 30.0, y: 20.0 });
        q.push(InputEvent::AimEnd { x: 30.0, y: 20.0 });
        assert_eq!(q.len(), 3);
        let events = q.drain();
        assert_eq!(events[0], InputEvent::AimBegin { x: 10.0, y: 20.0 });
        assert_eq!(events[2], InputEvent::AimEnd { x: 30.0, y: 20.0 });
        assert!(q.is_empty());
    }

    #[test]
    fn custom_event() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Custom { kind: 7, a: 1.5, b: 2.5, c: 3.5 });
        match q.drain()[0] {
            InputEvent::Custom { kind, a, b, c } => {
                assert_eq!(kind, 7);
                assert_eq!((a, b, c), (1.5, 2.5, 3.5));
            }
            other => panic!("expected Custom, got {:?}", other),
        }
    }
}
