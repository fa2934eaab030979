//! Restore guard.
//!
//! Re-selecting cells on the grid makes the widget emit its own
//! deselect/select events. The guard marks that window so the deselect
//! handler can tell "we caused this" from "the user did this".
//!
//! Two mechanisms, both always on:
//! - Deadline: the guard is held until `acquired_at + settle` and then reads
//!   as clear on its own. Nothing has to remember to release it, so a restore
//!   that dies halfway (handle dropped, borrow conflict) cannot leave restore
//!   disabled for the rest of the session.
//! - Generation: every acquire bumps a counter. A token only releases the
//!   guard it was issued for, and a check scheduled before a restore can see
//!   that a restore has happened since.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RestoreGuard {
    held_until: Option<Instant>,
    generation: u64,
    settle: Duration,
}

/// Proof of a successful acquire, used for early release.
#[derive(Debug, PartialEq, Eq)]
pub struct RestoreToken {
    generation: u64,
}

impl RestoreToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl RestoreGuard {
    pub fn new(settle: Duration) -> Self {
        Self {
            held_until: None,
            generation: 0,
            settle,
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Number of acquires so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the guard is held at `now`.
    pub fn is_set(&self, now: Instant) -> bool {
        matches!(self.held_until, Some(until) if now < until)
    }

    /// When the current hold ends, if held at `now`.
    pub fn held_until(&self, now: Instant) -> Option<Instant> {
        self.held_until.filter(|&until| now < until)
    }

    /// Take the guard for one settle window. `None` if it is already held.
    pub fn try_acquire(&mut self, now: Instant) -> Option<RestoreToken> {
        if self.is_set(now) {
            return None;
        }
        self.generation += 1;
        self.held_until = Some(now + self.settle);
        Some(RestoreToken { generation: self.generation })
    }

    /// Release early. Ignored (returns false) if the guard has been
    /// re-acquired since the token was issued.
    pub fn release(&mut self, token: RestoreToken) -> bool {
        if token.generation != self.generation {
            return false;
        }
        self.held_until = None;
        true
    }

    /// Drop any hold regardless of generation.
    pub fn reset(&mut self) {
        self.held_until = None;
    }
}
