//! Time sources
//!
//! A [`Clock`] abstraction so TTL-based components can be driven by a
//! [`MockClock`] in tests instead of sleeping.

mod clock;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
