//! Analog input abstraction

use crate::gpio::PinId;

/// Raw analog reads in the converter's native range.
pub trait AnalogIn {
    /// Read the instantaneous conversion result for a pin
    fn sample(&mut self, pin: PinId) -> u16;

    /// Full-scale conversion count (e.g. 4095 for a 12-bit ADC)
    ///
    /// The core rescales readings from `0..=max_count()` into `0..=255`.
    fn max_count(&self) -> u16 {
        4095
    }
}
