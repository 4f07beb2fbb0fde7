/// Receives committed buffer mutations.
///
/// Notifications arrive strictly after the storage mutation and after
/// every tracked range and marker has been adjusted, and strictly before
/// the undo record for the mutation is finalized. Delivery order across
/// observers is registration order, but nothing may rely on it.
///
/// Observers get spans, not a buffer reference: the buffer is mutably
/// borrowed while the fan-out runs, so a collaborator that needs content
/// reads it afterwards through its own handle.
pub trait BufferMutationObserver {
    /// Text was inserted before `offset`; everything that sat at or after
    /// `offset` moved right by `length`.
    fn did_insert_before(&mut self, offset: usize, length: usize);

    /// Characters `[offset, offset + length)` were removed.
    fn did_delete_at(&mut self, offset: usize, length: usize);

    /// Metadata-only channel: a marker repaint touched `[start, end)`.
    /// No offsets shifted.
    fn did_change_style(&mut self, start: usize, end: usize) {
        let _ = (start, end);
    }
}

/// Handle returned by `Buffer::add_observer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registration table for mutation observers. Removal of an id that is
/// not present is a no-op, because views attach and detach dynamically
/// as documents open and close.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<(ObserverId, Box<dyn BufferMutationObserver>)>,
    next_id: u64,
}

impl ObserverList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Box<dyn BufferMutationObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns true if the id was present.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify_insert(&mut self, offset: usize, length: usize) {
        for (_, observer) in &mut self.observers {
            observer.did_insert_before(offset, length);
        }
    }

    pub fn notify_delete(&mut self, offset: usize, length: usize) {
        for (_, observer) in &mut self.observers {
            observer.did_delete_at(offset, length);
        }
    }

    pub fn notify_style(&mut self, start: usize, end: usize) {
        for (_, observer) in &mut self.observers {
            observer.did_change_style(start, end);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Handle returned by `Buffer::register_change_tracker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId(u64);

/// The dirty span accumulated by one change tracker since its last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy)]
struct ChangeTracker {
    start: usize,
    end: usize,
}

impl ChangeTracker {
    fn reset() -> Self {
        Self {
            start: usize::MAX,
            end: 0,
        }
    }
}

/// Redisplay support: each tracker accumulates the smallest span covering
/// every mutation since it was last reset, so a renderer repaints once
/// per frame instead of once per keystroke.
#[derive(Debug, Default)]
pub struct TrackerSet {
    trackers: std::collections::HashMap<TrackerId, ChangeTracker>,
    next_id: u64,
}

impl TrackerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) -> TrackerId {
        let id = TrackerId(self.next_id);
        self.next_id += 1;
        self.trackers.insert(id, ChangeTracker::reset());
        id
    }

    pub fn unregister(&mut self, id: TrackerId) {
        self.trackers.remove(&id);
    }

    pub fn reset(&mut self, id: TrackerId) {
        if let Some(tracker) = self.trackers.get_mut(&id) {
            *tracker = ChangeTracker::reset();
        }
    }

    /// The accumulated span, or `None` for an unknown id or a tracker
    /// that saw no change since its reset.
    #[must_use]
    pub fn span(&self, id: TrackerId) -> Option<ChangeSpan> {
        let tracker = self.trackers.get(&id)?;
        (tracker.start <= tracker.end).then_some(ChangeSpan {
            start: tracker.start,
            end: tracker.end,
        })
    }

    pub fn did_change(&mut self, start: usize, end: usize, buffer_len: usize) {
        for tracker in self.trackers.values_mut() {
            tracker.start = tracker.start.min(start);
            tracker.end = tracker.end.max(end).min(buffer_len);
        }
    }
}
