/// A typed sub-range of the buffer: a syntax class, a spelling state,
/// whatever a text-processing collaborator wants to pin to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub start: usize,
    pub end: usize,
    pub kind: String,
}

/// Ordered, non-overlapping markers over one buffer.
///
/// Painting a span repaints exactly that span: overlapped markers are
/// trimmed or split, equal-kind neighbours fuse back together, and the
/// caller gets back the sub-spans whose kind actually changed — painting
/// a span with the kind it already has reports nothing, so no-op repaints
/// stay invisible to observers.
#[derive(Debug, Default)]
pub struct MarkerSet {
    /// Sorted by `start`; pairwise disjoint; never empty spans.
    markers: Vec<Marker>,
}

impl MarkerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paints `[start, end)` with `kind`. Returns the changed sub-spans.
    pub fn set(&mut self, start: usize, end: usize, kind: &str) -> Vec<(usize, usize)> {
        self.repaint(start, end, Some(kind))
    }

    /// Removes any marking from `[start, end)`. Returns the changed
    /// sub-spans.
    pub fn clear(&mut self, start: usize, end: usize) -> Vec<(usize, usize)> {
        self.repaint(start, end, None)
    }

    /// Returns the marker covering `offset`, if any.
    #[must_use]
    pub fn marker_at(&self, offset: usize) -> Option<&Marker> {
        let index = self.markers.partition_point(|marker| marker.start <= offset);
        let candidate = self.markers[..index].last()?;
        (candidate.end > offset).then_some(candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn repaint(&mut self, start: usize, end: usize, kind: Option<&str>) -> Vec<(usize, usize)> {
        debug_assert!(start < end);

        // Diff pass: walk the current coverage of [start, end) and note
        // every sub-span whose kind differs from the target.
        let mut changes: Vec<(usize, usize)> = Vec::new();
        let mut cursor = start;
        for marker in self
            .markers
            .iter()
            .filter(|marker| marker.end > start && marker.start < end)
        {
            let seg_start = marker.start.max(start);
            if seg_start > cursor && kind.is_some() {
                push_change(&mut changes, cursor, seg_start);
            }
            let seg_end = marker.end.min(end);
            if kind != Some(marker.kind.as_str()) {
                push_change(&mut changes, seg_start, seg_end);
            }
            cursor = seg_end;
        }
        if cursor < end && kind.is_some() {
            push_change(&mut changes, cursor, end);
        }

        if changes.is_empty() {
            return changes;
        }

        // Rebuild pass: trim/split whatever overlaps, drop in the new
        // marker, fuse equal-kind neighbours.
        let mut rebuilt: Vec<Marker> = Vec::with_capacity(self.markers.len() + 2);
        for marker in self.markers.drain(..) {
            if marker.end <= start || marker.start >= end {
                rebuilt.push(marker);
                continue;
            }
            if marker.start < start {
                rebuilt.push(Marker {
                    start: marker.start,
                    end: start,
                    kind: marker.kind.clone(),
                });
            }
            if marker.end > end {
                rebuilt.push(Marker {
                    start: end,
                    end: marker.end,
                    kind: marker.kind,
                });
            }
        }
        if let Some(kind) = kind {
            rebuilt.push(Marker {
                start,
                end,
                kind: kind.to_string(),
            });
        }
        rebuilt.sort_by_key(|marker| marker.start);

        self.markers = Vec::with_capacity(rebuilt.len());
        for marker in rebuilt {
            if let Some(last) = self.markers.last_mut()
                && last.end == marker.start
                && last.kind == marker.kind
            {
                last.end = marker.end;
            } else {
                self.markers.push(marker);
            }
        }

        changes
    }

    /// `length` characters were inserted before `offset`; same boundary
    /// rule as the range tracker, so a marker ending exactly at the
    /// insertion point stretches over the new text.
    pub fn did_insert_before(&mut self, offset: usize, length: usize) {
        for marker in &mut self.markers {
            if marker.start >= offset {
                marker.start += length;
            }
            if marker.end >= offset {
                marker.end += length;
            }
        }
    }

    /// Characters `[offset, offset + length)` were removed; markers fully
    /// inside the span collapse and disappear.
    pub fn did_delete_at(&mut self, offset: usize, length: usize) {
        for marker in &mut self.markers {
            if marker.start > offset {
                marker.start = marker.start.saturating_sub(length).max(offset);
            }
            if marker.end > offset {
                marker.end = marker.end.saturating_sub(length).max(offset);
            }
        }
        self.markers.retain(|marker| marker.start < marker.end);
    }
}

fn push_change(changes: &mut Vec<(usize, usize)>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    // Contiguous changed spans report as one.
    if let Some(last) = changes.last_mut()
        && last.1 == start
    {
        last.1 = end;
    } else {
        changes.push((start, end));
    }
}
