use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, StratumError};

/// Single-slot arena for the high-frequency submit/accept path.
///
/// Exactly one event may be live (under construction or being
/// processed) at a time. The event is held inline in the guard, so the
/// hot path performs no heap allocation; the arena itself only tracks
/// slot occupancy. Checking out a second event while one is live is
/// [`StratumError::EventArenaBusy`], never silent reuse.
#[derive(Debug, Default)]
pub struct Arena {
    in_flight: AtomicBool,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `event`. Released when the guard drops.
    pub fn checkout<T>(&self, event: T) -> Result<EventGuard<'_, T>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(StratumError::EventArenaBusy);
        }

        Ok(EventGuard { arena: self, event })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Exclusive handle to the arena's slot.
#[derive(Debug)]
pub struct EventGuard<'a, T> {
    arena: &'a Arena,
    event: T,
}

impl<T> Deref for EventGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.event
    }
}

impl<T> DerefMut for EventGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.event
    }
}

impl<T> Drop for EventGuard<'_, T> {
    fn drop(&mut self) {
        self.arena.in_flight.store(false, Ordering::Release);
    }
}
