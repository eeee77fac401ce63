//! Per-player status ledger.

use celestial_protocol::Status;

/// An ordered multiset of status tags.
///
/// Duplicates matter: three `Nourish` tags add three points to the next
/// resolved card. Insertion order is kept for display but no rule
/// depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLedger {
    tags: Vec<Status>,
}

impl StatusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` copies of `tag`.
    pub fn add(&mut self, tag: Status, n: usize) {
        self.tags.extend(std::iter::repeat_n(tag, n));
    }

    pub fn count(&self, tag: Status) -> usize {
        self.tags.iter().filter(|t| **t == tag).count()
    }

    pub fn has(&self, tag: Status) -> bool {
        self.tags.contains(&tag)
    }

    /// Removes every copy of `tag` and returns how many there were.
    pub fn clear(&mut self, tag: Status) -> usize {
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        before - self.tags.len()
    }

    /// Removes a single copy of `tag`. Returns `false` if none was held.
    pub fn remove_one(&mut self, tag: Status) -> bool {
        match self.tags.iter().position(|t| *t == tag) {
            Some(i) => {
                self.tags.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.tags.iter()
    }

    /// Each distinct tag with its count, in order of first appearance.
    pub fn counts(&self) -> Vec<(Status, usize)> {
        let mut out: Vec<(Status, usize)> = Vec::new();
        for tag in &self.tags {
            match out.iter_mut().find(|(t, _)| t == tag) {
                Some((_, n)) => *n += 1,
                None => out.push((*tag, 1)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_counted() {
        let mut ledger = StatusLedger::new();
        ledger.add(Status::Nourish, 3);
        ledger.add(Status::Awakened, 1);
        assert_eq!(ledger.count(Status::Nourish), 3);
        assert!(ledger.has(Status::Awakened));
        assert!(!ledger.has(Status::Starve));
    }

    #[test]
    fn test_clear_returns_removed_count() {
        let mut ledger = StatusLedger::new();
        ledger.add(Status::Nourish, 2);
        ledger.add(Status::Restrict, 1);
        assert_eq!(ledger.clear(Status::Nourish), 2);
        assert_eq!(ledger.clear(Status::Nourish), 0);
        assert_eq!(ledger.count(Status::Restrict), 1);
    }

    #[test]
    fn test_remove_one_only_takes_one() {
        let mut ledger = StatusLedger::new();
        ledger.add(Status::Starve, 2);
        assert!(ledger.remove_one(Status::Starve));
        assert_eq!(ledger.count(Status::Starve), 1);
        assert!(!ledger.remove_one(Status::Flock));
    }

    #[test]
    fn test_counts_in_first_appearance_order() {
        let mut ledger = StatusLedger::new();
        ledger.add(Status::Dull, 1);
        ledger.add(Status::Nourish, 2);
        ledger.add(Status::Dull, 1);
        assert_eq!(
            ledger.counts(),
            vec![(Status::Dull, 2), (Status::Nourish, 2)]
        );
    }
}
