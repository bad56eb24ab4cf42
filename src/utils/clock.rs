use std::time::Duration;

use rustix::time::{clock_gettime, ClockId};

/// A monotonic clock.
///
/// All animation and throttle timestamps in this crate are `u32`
/// milliseconds sampled from one instance of this clock, owned by the
/// shell. Subsystems never read the time themselves; the current timestamp
/// is threaded through the per-frame tick.
#[derive(Debug, Default)]
pub struct Clock {
    _private: (),
}

impl Clock {
    /// Initialize a new clock
    pub fn new() -> Clock {
        Clock::default()
    }

    /// Returns the elapsed time since an unspecified epoch
    pub fn now(&self) -> Duration {
        let tp = clock_gettime(ClockId::Monotonic);
        Duration::new(tp.tv_sec.max(0) as u64, tp.tv_nsec.clamp(0, 999_999_999) as u32)
    }

    /// Returns the current time in milliseconds
    ///
    /// The monotonic clock does not fit as milliseconds in 32-bit after
    /// roughly 50 days of uptime; a modulo conversion is used, which
    /// matches the timestamps wayland input events carry.
    pub fn now_ms(&self) -> u32 {
        self.now().as_millis() as u32
    }
}
