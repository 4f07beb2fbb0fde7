/// Handle to a live range registered with a buffer.
///
/// The buffer owns the registration table; callers hold ids, never
/// references, so nothing can dangle when ranges move or die. Dropping a
/// handle without `Buffer::remove_range` just leaks one table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeId(u64);

/// A tracked `[start, end]` offset pair, kept consistent across every
/// buffer mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedRange {
    pub start: usize,
    pub end: usize,
}

impl TrackedRange {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// The set of all live ranges anchored into one buffer.
///
/// Adjustment rules:
/// - text inserted before `offset` pushes every boundary sitting at or
///   after `offset` right — a cursor exactly at the insertion point rides
///   along with the inserted text;
/// - deleting `[offset, offset + length)` pulls every boundary strictly
///   after `offset` left, collapsing boundaries inside the span onto the
///   deletion point.
#[derive(Debug, Default)]
pub struct RangeSet {
    ranges: std::collections::HashMap<RangeId, TrackedRange>,
    next_id: u64,
}

impl RangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, start: usize, end: usize) -> RangeId {
        debug_assert!(start <= end);
        let id = RangeId(self.next_id);
        self.next_id += 1;
        self.ranges.insert(id, TrackedRange { start, end });
        id
    }

    pub fn remove(&mut self, id: RangeId) -> Option<TrackedRange> {
        self.ranges.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: RangeId) -> Option<TrackedRange> {
        self.ranges.get(&id).copied()
    }

    /// Repositions an existing range. Returns false for a dead id.
    pub fn set(&mut self, id: RangeId, start: usize, end: usize) -> bool {
        debug_assert!(start <= end);
        match self.ranges.get_mut(&id) {
            Some(range) => {
                range.start = start;
                range.end = end;
                true
            }
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RangeId, TrackedRange)> + '_ {
        self.ranges.iter().map(|(id, range)| (*id, *range))
    }

    /// `length` characters were inserted before `offset`.
    pub fn did_insert_before(&mut self, offset: usize, length: usize) {
        for range in self.ranges.values_mut() {
            if range.start >= offset {
                range.start += length;
            }
            if range.end >= offset {
                range.end += length;
            }
        }
    }

    /// Characters `[offset, offset + length)` were removed.
    pub fn did_delete_at(&mut self, offset: usize, length: usize) {
        for range in self.ranges.values_mut() {
            if range.start > offset {
                range.start = range.start.saturating_sub(length).max(offset);
            }
            if range.end > offset {
                range.end = range.end.saturating_sub(length).max(offset);
            }
        }
    }
}

#[cfg(test)]
mod range_set_tests {
    use super::*;

    #[test]
    fn test_register_and_remove() {
        let mut ranges = RangeSet::new();

        let a = ranges.insert(1, 4);
        let b = ranges.insert(2, 2);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges.get(a), Some(TrackedRange { start: 1, end: 4 }));

        assert_eq!(ranges.remove(b), Some(TrackedRange { start: 2, end: 2 }));
        assert_eq!(ranges.remove(b), None, "double remove is a no-op");
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn test_insert_before_pushes_boundaries_at_point() {
        let mut ranges = RangeSet::new();

        let before = ranges.insert(0, 1);
        let at_point = ranges.insert(2, 2);
        let after = ranges.insert(3, 5);

        ranges.did_insert_before(2, 3);

        assert_eq!(ranges.get(before), Some(TrackedRange { start: 0, end: 1 }));
        assert_eq!(
            ranges.get(at_point),
            Some(TrackedRange { start: 5, end: 5 }),
            "a boundary exactly at the insertion point rides right"
        );
        assert_eq!(ranges.get(after), Some(TrackedRange { start: 6, end: 8 }));
    }

    #[test]
    fn test_delete_collapses_interior_boundaries() {
        let mut ranges = RangeSet::new();

        let before = ranges.insert(0, 2);
        let inside = ranges.insert(3, 5);
        let straddling = ranges.insert(1, 8);
        let after = ranges.insert(7, 9);
        let at_point = ranges.insert(2, 2);

        // Remove [2, 6).
        ranges.did_delete_at(2, 4);

        assert_eq!(ranges.get(before), Some(TrackedRange { start: 0, end: 2 }));
        assert_eq!(
            ranges.get(inside),
            Some(TrackedRange { start: 2, end: 2 }),
            "boundaries inside the deleted span collapse to the deletion point"
        );
        assert_eq!(ranges.get(straddling), Some(TrackedRange { start: 1, end: 4 }));
        assert_eq!(ranges.get(after), Some(TrackedRange { start: 3, end: 5 }));
        assert_eq!(
            ranges.get(at_point),
            Some(TrackedRange { start: 2, end: 2 }),
            "a boundary at the deletion point itself does not move"
        );
    }

    #[test]
    fn test_start_never_passes_end() {
        let mut ranges = RangeSet::new();
        let id = ranges.insert(4, 6);

        ranges.did_delete_at(0, 10);
        let range = ranges.get(id).unwrap();
        assert!(range.start <= range.end);
        assert_eq!(range, TrackedRange { start: 0, end: 0 });
    }
}
