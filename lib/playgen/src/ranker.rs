//! Priority queue for picking the top-K labels by track count.
//!
//! Insertion is a linear scan over an ascending vector, which is plenty for
//! the few thousand genres or artists a library produces. The scan also fixes
//! the tie-break: a new entry lands in front of the first entry whose priority
//! is strictly greater than its own, behind any equal ones, so among equal
//! priorities the most recently pushed label is popped first.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority queue is empty")]
pub struct QueueEmpty;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub label: String,
    pub priority: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    entries: Vec<RankEntry>,
}

impl Ranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, priority: usize) {
        let entry = RankEntry {
            label: label.into(),
            priority,
        };
        match self.entries.iter().position(|e| e.priority > priority) {
            Some(idx) => self.entries.insert(idx, entry),
            None => self.entries.push(entry),
        }
    }

    /// Removes and returns the highest-priority label.
    pub fn pop(&mut self) -> Result<String, QueueEmpty> {
        self.entries.pop().map(|e| e.label).ok_or(QueueEmpty)
    }

    /// Pops up to `k` labels, highest first. Fewer come back if the queue runs dry.
    pub fn top_k(&mut self, k: usize) -> Vec<String> {
        let mut labels = Vec::with_capacity(k.min(self.entries.len()));
        for _ in 0..k {
            match self.pop() {
                Ok(label) => labels.push(label),
                Err(QueueEmpty) => break,
            }
        }
        labels
    }

    /// Current entries in ascending priority order.
    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_descending_priority_order() {
        let mut ranker = Ranker::new();
        ranker.push("mid", 5);
        ranker.push("low", 1);
        ranker.push("high", 9);
        ranker.push("upper", 7);

        assert_eq!(ranker.pop(), Ok("high".to_string()));
        assert_eq!(ranker.pop(), Ok("upper".to_string()));
        assert_eq!(ranker.pop(), Ok("mid".to_string()));
        assert_eq!(ranker.pop(), Ok("low".to_string()));
        assert_eq!(ranker.pop(), Err(QueueEmpty));
    }

    #[test]
    fn equal_priorities_pop_most_recent_first() {
        let mut ranker = Ranker::new();
        ranker.push("a", 3);
        ranker.push("b", 3);
        ranker.push("c", 3);

        assert_eq!(ranker.top_k(3), vec!["c", "b", "a"]);
    }

    #[test]
    fn ties_are_inserted_after_existing_equal_entries() {
        let mut ranker = Ranker::new();
        ranker.push("x", 2);
        ranker.push("y", 4);
        ranker.push("z", 2);

        let order: Vec<&str> = ranker.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["x", "z", "y"]);
        assert_eq!(ranker.top_k(3), vec!["y", "z", "x"]);
    }

    #[test]
    fn top_k_stops_when_queue_is_exhausted() {
        let mut ranker = Ranker::new();
        ranker.push("only", 1);
        ranker.push("other", 2);

        assert_eq!(ranker.top_k(5), vec!["other", "only"]);
        assert!(ranker.is_empty());
        assert_eq!(ranker.top_k(1), Vec::<String>::new());
    }

    #[test]
    fn top_zero_leaves_queue_untouched() {
        let mut ranker = Ranker::new();
        ranker.push("a", 1);
        assert!(ranker.top_k(0).is_empty());
        assert_eq!(ranker.len(), 1);
    }
}
