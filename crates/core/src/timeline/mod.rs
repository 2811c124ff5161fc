/// Monotonic millisecond clock driven by the event loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SwitchClock {
    now_ms: u64,
}

impl SwitchClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn advance(&mut self, delta_ms: u64) -> u64 {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        self.now_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent<E> {
    pub at_ms: u64,
    pub event: E,
}

impl<E> ScheduledEvent<E> {
    pub fn new(at_ms: u64, event: E) -> Self {
        Self { at_ms, event }
    }
}

/// One-shot timer queue. Events fire once, in time order; ties fire in the
/// order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<E> {
    events: Vec<ScheduledEvent<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at_ms: u64, event: E) {
        let index = self.events.partition_point(|queued| queued.at_ms <= at_ms);
        self.events.insert(index, ScheduledEvent::new(at_ms, event));
    }

    /// Removes and returns every event due at or before `now_ms`.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<E> {
        let due = self.events.partition_point(|queued| queued.at_ms <= now_ms);
        self.events.drain(..due).map(|queued| queued.event).collect()
    }

    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&E) -> bool) {
        self.events.retain(|queued| !predicate(&queued.event));
    }

    pub fn pending(&self) -> &[ScheduledEvent<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_time_order_with_stable_ties() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30, "late");
        scheduler.schedule(10, "first");
        scheduler.schedule(10, "second");

        assert!(scheduler.drain_due(5).is_empty());
        assert_eq!(scheduler.drain_due(10), vec!["first", "second"]);
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.drain_due(100), vec!["late"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_removes_matching_events() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1, 1_u32);
        scheduler.schedule(2, 2_u32);
        scheduler.cancel_where(|event| *event == 1);

        assert_eq!(scheduler.drain_due(10), vec![2]);
    }

    #[test]
    fn clock_saturates() {
        let mut clock = SwitchClock::new();
        clock.advance(u64::MAX);
        assert_eq!(clock.advance(5), u64::MAX);
    }
}
