//! DHT22 / AM2302 temperature and humidity sensor.
//!
//! Single-wire protocol: the host pulls the line low for >1 ms, the sensor
//! answers with an 80 µs low / 80 µs high preamble, then clocks out 40 bits.
//! Each bit is a ~50 µs low followed by a high pulse whose width encodes the
//! value (~27 µs = 0, ~70 µs = 1).
//!
//! ```text
//!   byte 0..1  humidity × 10        (big-endian u16)
//!   byte 2..3  temperature × 10     (bit 15 = sign, 15-bit magnitude)
//!   byte 4     checksum = low byte of sum(byte 0..3)
//! ```
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data GPIO (configured by hw_init) with
//! interrupts masked for the ~5 ms transfer.
//! On host/test: returns values injected through [`sim_set_reading`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::error::SensorError;

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode a raw 5-byte frame.  No calibration offset is applied here.
pub fn decode_frame(frame: &[u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity_raw = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature_c = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(ClimateReading {
        temperature_c,
        humidity_pct: f32::from(humidity_raw) / 10.0,
    })
}

// ── Simulation injection ──────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41B0_0000); // 22.0
#[cfg(not(target_os = "espidf"))]
static SIM_HUMIDITY_BITS: AtomicU32 = AtomicU32::new(0x4234_0000); // 45.0
/// 0 = healthy, 1 = timeout, 2 = checksum mismatch.
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT: AtomicU8 = AtomicU8::new(0);

/// Set the raw (pre-offset) values the simulated sensor reports.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_reading(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make the simulated sensor fail with `fault` until cleared with `None`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fault(fault: Option<SensorError>) {
    let code = match fault {
        None | Some(SensorError::InvalidReading) => 0,
        Some(SensorError::Timeout) => 1,
        Some(SensorError::ChecksumMismatch) => 2,
    };
    SIM_FAULT.store(code, Ordering::Relaxed);
}

// ── Driver ────────────────────────────────────────────────────

/// The sensor needs two seconds between conversions; faster polls get the
/// cached sample.
#[cfg(target_os = "espidf")]
const MIN_INTERVAL_US: i64 = 2_000_000;

pub struct DhtSensor {
    gpio: i32,
    offset_c: f32,
    #[cfg(target_os = "espidf")]
    last_sample: Option<(i64, ClimateReading)>,
}

impl DhtSensor {
    pub fn new(gpio: i32, offset_c: f32) -> Self {
        Self {
            gpio,
            offset_c,
            #[cfg(target_os = "espidf")]
            last_sample: None,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Acquire one sample with the calibration offset applied.
    ///
    /// A NaN in either channel is reported as
    /// [`SensorError::InvalidReading`], never as a number.
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let raw = self.acquire()?;
        if raw.temperature_c.is_nan() || raw.humidity_pct.is_nan() {
            return Err(SensorError::InvalidReading);
        }
        Ok(ClimateReading {
            temperature_c: raw.temperature_c + self.offset_c,
            humidity_pct: raw.humidity_pct,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn acquire(&mut self) -> Result<ClimateReading, SensorError> {
        match SIM_FAULT.load(Ordering::Relaxed) {
            1 => return Err(SensorError::Timeout),
            2 => return Err(SensorError::ChecksumMismatch),
            _ => {}
        }
        Ok(ClimateReading {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMIDITY_BITS.load(Ordering::Relaxed)),
        })
    }

    #[cfg(target_os = "espidf")]
    fn acquire(&mut self) -> Result<ClimateReading, SensorError> {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        let now = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        if let Some((at, cached)) = self.last_sample {
            if now - at < MIN_INTERVAL_US {
                return Ok(cached);
            }
        }
        let frame = self.read_frame()?;
        let reading = decode_frame(&frame)?;
        self.last_sample = Some((now, reading));
        Ok(reading)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Result<[u8; 5], SensorError> {
        use esp_idf_svc::sys::{esp_rom_delay_us, gpio_set_level};

        let pin = self.gpio;
        // Start signal.
        // SAFETY: the line was configured open-drain by hw_init; main loop only.
        unsafe {
            gpio_set_level(pin, 0);
            esp_rom_delay_us(1_200);
            gpio_set_level(pin, 1);
        }

        let mut frame = [0u8; 5];
        esp_idf_hal::interrupt::free(|| -> Result<(), SensorError> {
            // Response preamble.
            wait_for_level(pin, false, 100)?;
            wait_for_level(pin, true, 100)?;
            wait_for_level(pin, false, 100)?;

            for bit in 0..40 {
                wait_for_level(pin, true, 80)?;
                let high_us = wait_for_level(pin, false, 100)?;
                if high_us > 40 {
                    frame[bit / 8] |= 0x80 >> (bit % 8);
                }
            }
            Ok(())
        })?;
        Ok(frame)
    }
}

/// Spin until the line reads `level`; returns how long that took in µs.
#[cfg(target_os = "espidf")]
fn wait_for_level(pin: i32, level: bool, timeout_us: i64) -> Result<i64, SensorError> {
    use esp_idf_svc::sys::{esp_timer_get_time, gpio_get_level};

    // SAFETY: counter and input-register reads only.
    let start = unsafe { esp_timer_get_time() };
    loop {
        let elapsed = unsafe { esp_timer_get_time() } - start;
        if (unsafe { gpio_get_level(pin) } != 0) == level {
            return Ok(elapsed);
        }
        if elapsed > timeout_us {
            return Err(SensorError::Timeout);
        }
    }
}
