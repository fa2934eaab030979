use std::time::Instant;

/// Clock abstraction for testability.
/// In production, uses std::time::Instant.
/// In tests, `testing::ManualClock` advances only when told to.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Real clock using std::time::Instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
