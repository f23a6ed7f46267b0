//! Bounded snapshot stack used for undo.
//!
//! Both undo scopes (the slide graph and the content of a single slide) keep
//! whole-state snapshots rather than diffs. When the stack is full the oldest
//! snapshot is dropped.

/// Default capacity when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

/// A bounded stack of immutable snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> History<T> {
    /// Create an empty history. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a snapshot, evicting the oldest one when full.
    pub fn push(&mut self, snapshot: T) {
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    /// Pop the most recent snapshot.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut history = History::with_capacity(5);
        history.push(1);
        history.push(2);
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.pop(), Some(1));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.pop(), Some(4));
        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), Some(2));
        assert!(history.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let mut history = History::with_capacity(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.pop(), Some("b"));
    }
}
