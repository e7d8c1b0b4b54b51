//! Bounded negotiation event log.
//!
//! Events created during a tick go into an [`EventBatch`]. When the tick
//! finishes the batch is merged into the [`EventLog`], which keeps the
//! newest entries first and drops the oldest beyond its capacity.

use chrono::Utc;
use skytwin_core::types::{AgentId, EventId, EventKind, NegotiationEvent, Priority, Tick};
use std::collections::VecDeque;

/// Events created during one tick, in creation order.
#[derive(Debug)]
pub struct EventBatch {
    tick: Tick,
    next_seq: u64,
    events: Vec<NegotiationEvent>,
}

impl EventBatch {
    /// Record a new event and return its id.
    pub fn emit(
        &mut self,
        kind: EventKind,
        participants: Vec<AgentId>,
        description: String,
        priority: Priority,
    ) -> EventId {
        self.next_seq += 1;
        let id = EventId(self.next_seq);
        self.events.push(NegotiationEvent {
            id,
            tick: self.tick,
            timestamp: Utc::now(),
            participants,
            kind,
            description,
            priority,
        });
        id
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn events(&self) -> &[NegotiationEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Newest-first, capacity-bounded record of negotiation activity.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<NegotiationEvent>,
    capacity: usize,
    last_seq: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            last_seq: 0,
        }
    }

    /// Open a batch for the given tick. Ids continue from the last merge.
    pub fn batch(&self, tick: Tick) -> EventBatch {
        EventBatch {
            tick,
            next_seq: self.last_seq,
            events: Vec::new(),
        }
    }

    /// Merge a finished batch, then trim to capacity.
    ///
    /// Returns the batch's events in creation order.
    pub fn merge(&mut self, batch: EventBatch) -> Vec<NegotiationEvent> {
        self.last_seq = self.last_seq.max(batch.next_seq);
        for event in &batch.events {
            self.entries.push_front(event.clone());
        }
        self.entries.truncate(self.capacity);
        batch.events
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &NegotiationEvent> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<NegotiationEvent> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<&NegotiationEvent> {
        self.entries.front()
    }

    /// Number of retained events of one kind.
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Drop every entry and restart id numbering.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn emit_n(batch: &mut EventBatch, n: usize) {
        for i in 0..n {
            batch.emit(
                EventKind::ResolutionComplete,
                vec![AgentId(1)],
                format!("event {}", i),
                Priority::Low,
            );
        }
    }

    #[test]
    fn merge_puts_newest_first() {
        let mut log = EventLog::new(50);
        let mut batch = log.batch(1);
        let first = batch.emit(
            EventKind::ConflictDetected,
            vec![AgentId(1), AgentId(2)],
            "first".into(),
            Priority::Medium,
        );
        let second = batch.emit(
            EventKind::PathNegotiation,
            vec![AgentId(1), AgentId(2)],
            "second".into(),
            Priority::Medium,
        );
        let merged = log.merge(batch);

        assert_eq!(merged[0].id, first);
        assert_eq!(log.newest().unwrap().id, second);
        assert_eq!(log.iter().nth(1).unwrap().id, first);
    }

    #[test]
    fn ids_continue_across_batches() {
        let mut log = EventLog::new(50);
        let mut batch = log.batch(1);
        emit_n(&mut batch, 3);
        log.merge(batch);

        let mut batch = log.batch(2);
        let id = batch.emit(EventKind::ResolutionComplete, vec![], String::new(), Priority::Low);
        assert_eq!(id, EventId(4));
        assert_eq!(batch.tick(), 2);
    }

    #[test]
    fn trims_oldest_beyond_capacity() {
        let mut log = EventLog::new(5);
        let mut batch = log.batch(1);
        emit_n(&mut batch, 8);
        log.merge(batch);

        assert_eq!(log.len(), 5);
        assert_eq!(log.newest().unwrap().id, EventId(8));
        assert_eq!(log.iter().last().unwrap().id, EventId(4));
    }

    #[test]
    fn identical_descriptions_are_kept() {
        let mut log = EventLog::new(50);
        let mut batch = log.batch(1);
        for _ in 0..3 {
            batch.emit(EventKind::ResolutionComplete, vec![AgentId(1)], "same".into(), Priority::Low);
        }
        log.merge(batch);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut log = EventLog::new(10);
        let mut batch = log.batch(1);
        emit_n(&mut batch, 2);
        log.merge(batch);
        log.clear();

        assert!(log.is_empty());
        let mut batch = log.batch(1);
        assert_eq!(
            batch.emit(EventKind::ResolutionComplete, vec![], String::new(), Priority::Low),
            EventId(1)
        );
    }

    proptest! {
        #[test]
        fn log_never_exceeds_capacity(batches in proptest::collection::vec(0usize..30, 1..40)) {
            let mut log = EventLog::new(50);
            for (tick, n) in batches.into_iter().enumerate() {
                let mut batch = log.batch(tick as Tick);
                emit_n(&mut batch, n);
                log.merge(batch);
                prop_assert!(log.len() <= 50);
            }
        }
    }
}
