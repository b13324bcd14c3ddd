//! # Entity — Lightweight Identifiers for Runtime Objects
//!
//! An [`EntityId`] is just a number. It doesn't "contain" anything; the
//! [`Registry`](crate::registry::Registry) maps ids to their attached
//! components. Separating identity from data is what lets behaviour be
//! composed at runtime instead of baked into an object hierarchy.
//!
//! ## Design: Downward-Scanning Reuse
//!
//! Ids are drawn from the full 32-bit space, starting at `u32::MAX` and
//! counting down. Id `0` is reserved as the invalid sentinel and is never
//! issued. When the cursor reaches `1` it wraps back to the top, and from
//! then on the allocator scans past ids that are still live:
//!
//! ```text
//! cursor: 4294967295 → 4294967294 → ... → 1 → (wrap) → 4294967295 → ...
//!                                               scan skips live ids
//! ```
//!
//! The scan cost is proportional to the run of consecutive live ids at the
//! cursor. When ids are freed in roughly the order they were allocated the
//! cost stays near constant; an adversarial reuse pattern can degrade it
//! toward the size of the live set. That tradeoff buys a very simple
//! allocator with no per-slot bookkeeping.
//!
//! A freed id is not reissued until the cursor has walked the rest of the
//! space, so recycling an id that something still holds a stale copy of
//! takes on the order of four billion allocations.

use std::collections::HashSet;
use std::fmt;

/// A handle to an entity in the [`Registry`](crate::registry::Registry).
///
/// Ids are issued by [`Registry::create`](crate::registry::Registry::create)
/// and are only meaningful to the registry that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// The reserved invalid id. Never assigned to a live entity; returned by
    /// `create()` when the id space is exhausted.
    pub const INVALID: Self = Self(0);

    /// Whether this id could refer to a live entity. `false` only for
    /// [`EntityId::INVALID`].
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The raw integer value. Useful for diagnostics, not for general use.
    pub fn raw(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues unique, reusable entity ids.
///
/// Holds the set of currently live ids and a wrapping cursor. The cursor
/// always moves past an issued id, so allocation never re-examines the id it
/// just handed out.
pub(crate) struct EntityAllocator {
    /// Every id currently issued and not yet released.
    live: HashSet<EntityId>,
    /// Next id to try. Moves downward, wrapping from 1 back to `u32::MAX`.
    cursor: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            live: HashSet::new(),
            cursor: u32::MAX,
        }
    }

    /// Allocate an id that is not currently live.
    ///
    /// Returns [`EntityId::INVALID`] if every non-sentinel id is already
    /// live. The caller decides how loudly to report that.
    pub fn allocate(&mut self) -> EntityId {
        // All 2^32 - 1 usable ids live: the scan below would never terminate.
        if self.live.len() >= u32::MAX as usize {
            return EntityId::INVALID;
        }

        let mut id = self.cursor;
        while self.live.contains(&EntityId(id)) {
            id = if id == 1 { u32::MAX } else { id - 1 };
        }

        if !self.live.insert(EntityId(id)) {
            return EntityId::INVALID;
        }

        self.cursor = if id == 1 { u32::MAX } else { id - 1 };
        EntityId(id)
    }

    /// Return an id to the pool. `false` if it was not live.
    pub fn release(&mut self, id: EntityId) -> bool {
        self.live.remove(&id)
    }

    /// Forget every live id. The cursor keeps its position.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    #[cfg(test)]
    fn live_count(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    fn set_cursor(&mut self, cursor: u32) {
        self.cursor = cursor;
    }
}
