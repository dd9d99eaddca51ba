//! Identifiers for registry entries and loaded models.

use serde::{Deserialize, Serialize};

/// Dense index of a track inside its registry. Stable for the registry's lifetime.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TrackId(pub u32);

impl TrackId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies one model load. Action handles carry the generation they were created for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Generation(pub u32);

/// Monotonic allocator for load generations.
#[derive(Default, Debug)]
pub struct GenerationCounter {
    next: u32,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> Generation {
        let id = Generation(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
