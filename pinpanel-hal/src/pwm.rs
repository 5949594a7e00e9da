//! PWM output abstraction
//!
//! Channels are numbered; channel 0 is reserved for the display backlight
//! and is never handed to a user-configured pin.

use crate::gpio::PinId;

/// PWM channel reserved for the display backlight.
pub const BACKLIGHT_CHANNEL: u8 = 0;

/// PWM channel control
pub trait PwmOut {
    /// Set up a channel's carrier frequency and duty resolution
    fn configure(&mut self, channel: u8, freq_hz: u32, resolution_bits: u8);

    /// Route a channel's output to a pin
    fn attach(&mut self, channel: u8, pin: PinId);

    /// Write the channel duty (0..=255 at 8-bit resolution)
    fn set_duty(&mut self, channel: u8, duty: u8);
}
