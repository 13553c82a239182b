//! Actor identifiers
//!
//! Ids are handed out in registration order and never reused within a
//! session. Every id also records the session generation it was issued in:
//! tearing a world down bumps the generation, so a handle kept from a
//! previous level can't alias an actor of the new one even though numbering
//! restarts at zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an actor registered in a [`World`](super::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId {
    /// Registration number, also the arena slot
    id: u64,
    /// Session generation the id belongs to
    session: u32,
}

impl ActorId {
    /// A null/invalid actor reference.
    pub const NULL: ActorId = ActorId { id: u64::MAX, session: 0 };

    pub(crate) fn new(id: u64, session: u32) -> Self {
        Self { id, session }
    }

    /// Monotonic registration number
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    pub fn is_null(&self) -> bool {
        self.id == u64::MAX
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.id as usize
    }
}

impl Default for ActorId {
    fn default() -> Self {
        ActorId::NULL
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}@{}", self.id, self.session)
        }
    }
}

/// Issues ids for one world.
#[derive(Debug, Default)]
pub struct IdAllocator {
    /// Next fresh id
    next: u64,
    /// Current session generation
    session: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ActorId {
        let id = ActorId::new(self.next, self.session);
        self.next += 1;
        id
    }

    /// Check that `id` was issued by this allocator in the current session.
    pub fn is_current(&self, id: ActorId) -> bool {
        !id.is_null() && id.session == self.session && id.id < self.next
    }

    /// Number of ids issued this session
    pub fn issued(&self) -> u64 {
        self.next
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    /// Restart numbering and invalidate every id issued so far.
    pub fn reset(&mut self) {
        self.next = 0;
        self.session = self.session.wrapping_add(1);
    }
}
