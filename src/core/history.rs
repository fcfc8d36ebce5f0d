//! Bounded newest-first history of log handles

use std::collections::VecDeque;

/// Keeps the last `capacity` entries, newest first
///
/// Inserting into a full buffer evicts the oldest entry. A capacity of zero
/// retains nothing.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> HistoryBuffer<T> {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY * 10)),
            capacity,
        }
    }

    pub fn record(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Snapshot, newest first
    pub fn all(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
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
}

impl<T: Clone> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
