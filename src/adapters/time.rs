//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] as a free-running `u32` millisecond counter.
//!
//! - **`target_os = "espidf"`**: truncates `esp_timer_get_time()` (µs since
//!   boot), so the value wraps every ~49.7 days like any embedded tick
//!   counter.  Consumers use wrapping arithmetic.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for host
//!   simulation.

use crate::app::ports::ClockPort;

pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the 64-bit system timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for Esp32Clock {
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }
}
