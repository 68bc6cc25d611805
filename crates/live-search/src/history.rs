use std::collections::VecDeque;

/// Most recent distinct search terms, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `term` and returns whether it was added.
    ///
    /// Blank terms and terms already in the history are ignored; an existing
    /// entry keeps its position. Once full, the oldest entry is evicted.
    pub fn push(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() || self.capacity == 0 || self.contains(term) {
            return false;
        }
        self.entries.push_front(term.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.iter().any(|entry| entry == term)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
