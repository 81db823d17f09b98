//! In-memory series of readings and gap markers for one session

use std::time::Duration;

use crate::types::{GapMarker, Reading, SeriesEntry};

/// Append-only buffer of everything acquired during a session
///
/// Entries are kept in insertion order, which is also chronological order:
/// `elapsed` never decreases from one entry to the next. There is no way to
/// remove or reorder entries.
#[derive(Debug, Default, Clone)]
pub struct SampleBuffer {
    entries: Vec<SeriesEntry>,
    reading_count: usize,
    gap_count: usize,
}

impl SampleBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading
    pub fn push_reading(&mut self, reading: Reading) {
        self.push(SeriesEntry::Reading(reading));
        self.reading_count += 1;
    }

    /// Append a gap marker
    pub fn push_gap(&mut self, elapsed: Duration) {
        self.push(SeriesEntry::Gap(GapMarker { elapsed }));
        self.gap_count += 1;
    }

    fn push(&mut self, entry: SeriesEntry) {
        debug_assert!(
            self.last_elapsed() <= entry.elapsed(),
            "series entries must be chronological"
        );
        self.entries.push(entry);
    }

    /// All entries in order
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    /// Entries appended at or after `index`
    ///
    /// Used to ship only the new part of the series to the UI after a tick.
    pub fn entries_since(&self, index: usize) -> &[SeriesEntry] {
        self.entries.get(index..).unwrap_or(&[])
    }

    /// Iterate over readings only, skipping gaps
    pub fn readings(&self) -> impl Iterator<Item = &Reading> + '_ {
        self.entries.iter().filter_map(SeriesEntry::as_reading)
    }

    /// The most recent reading
    pub fn last_reading(&self) -> Option<&Reading> {
        self.entries.iter().rev().find_map(SeriesEntry::as_reading)
    }

    /// Elapsed time of the newest entry (zero when empty)
    pub fn last_elapsed(&self) -> Duration {
        self.entries
            .last()
            .map(SeriesEntry::elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Number of readings in the buffer
    pub fn reading_count(&self) -> usize {
        self.reading_count
    }

    /// Number of gap markers in the buffer
    pub fn gap_count(&self) -> usize {
        self.gap_count
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
