//! One-time-use ledger of preview handles.

use std::collections::HashSet;

use crate::domain::shared::PreviewId;

/// Preview handles that have been sent to the order committer.
///
/// A handle enters the ledger the moment its commit is dispatched and
/// never leaves it, whatever the commit's outcome.
#[derive(Debug, Clone, Default)]
pub struct PreviewLedger {
    consumed: HashSet<PreviewId>,
}

impl PreviewLedger {
    /// Returns true if the handle has already been committed.
    #[must_use]
    pub fn is_consumed(&self, id: &PreviewId) -> bool {
        self.consumed.contains(id)
    }

    /// Consume a handle. Returns false if it was already consumed.
    pub fn consume(&mut self, id: PreviewId) -> bool {
        self.consumed.insert(id)
    }

    /// Number of consumed handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    /// Returns true if nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_consumed_once() {
        let mut ledger = PreviewLedger::default();
        assert!(ledger.consume(PreviewId::new("p1")));
        assert!(!ledger.consume(PreviewId::new("p1")));
        assert!(ledger.is_consumed(&PreviewId::new("p1")));
        assert!(!ledger.is_consumed(&PreviewId::new("p2")));
        assert_eq!(ledger.len(), 1);
    }
}
