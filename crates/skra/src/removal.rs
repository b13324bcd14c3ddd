//! # Removal Queue — Deferred Entity Destruction
//!
//! Destroying an entity mid-traversal would mutate the node view being
//! walked, so removal decisions made during a pass are buffered here and
//! applied afterwards in one batch. The queue is the "decision" half of the
//! protocol; [`Registry::purge`](crate::registry::Registry::purge) is the
//! "effect" half.
//!
//! The queue is append-only between purges. Duplicate marks are kept as-is;
//! `destroy` reports `false` for an id that is already gone, which makes
//! duplicates harmless at purge time.

use crate::entity::EntityId;

/// Pending entity destructions, in the order they were requested.
pub(crate) struct RemovalQueue {
    pending: Vec<EntityId>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Append an id. Callers are expected to have checked liveness.
    pub fn mark(&mut self, id: EntityId) {
        self.pending.push(id);
    }

    /// Drain the queue, returning the pending ids in mark order. The queue
    /// is left empty regardless of what the caller does with them.
    pub fn take(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_mark_order() {
        let mut queue = RemovalQueue::new();
        let a = EntityId::from_raw(10);
        let b = EntityId::from_raw(11);
        queue.mark(a);
        queue.mark(b);
        queue.mark(a); // duplicates are kept

        assert_eq!(queue.take(), vec![a, b, a]);
    }

    #[test]
    fn take_leaves_queue_empty() {
        let mut queue = RemovalQueue::new();
        queue.mark(EntityId::from_raw(10));
        queue.take();
        assert!(queue.take().is_empty());
    }
}
