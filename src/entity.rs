//! Entity identifiers and allocation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a simulated object.
///
/// Identifiers are positive integers, unique for the lifetime of the
/// [`Manager`](crate::Manager) that issued them. A killed entity's
/// identifier is never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Rebuild an identifier carried in an action payload.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier allocator. Starts at 1, never reuses.
pub(crate) struct EntityAllocator {
    created: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { created: 0 }
    }

    pub fn allocate(&mut self) -> Entity {
        self.created += 1;
        Entity(self.created)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_positive_and_strictly_increasing() {
        let mut allocator = EntityAllocator::new();

        let e1 = allocator.allocate();
        let e2 = allocator.allocate();
        let e3 = allocator.allocate();

        assert!(e1.raw() > 0);
        assert!(e2 > e1);
        assert!(e3 > e2);
    }

    #[test]
    fn raw_round_trips_through_from_raw() {
        let mut allocator = EntityAllocator::new();
        let entity = allocator.allocate();

        assert_eq!(Entity::from_raw(entity.raw()), entity);
    }
}
