//! Digital I/O abstractions
//!
//! The panel reassigns pin roles at runtime, so pins are addressed by a
//! numeric id instead of by owned pin objects. Implementations dispatch the
//! id to the actual hardware registers.

/// A board-level GPIO number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u8);

/// Dynamic digital input/output
///
/// All operations are synchronous and assumed infallible; a platform where
/// GPIO access can fail should classify the failure (fatal vs ignorable)
/// inside its implementation rather than surfacing it to the core.
pub trait DigitalIo {
    /// Configure the pin as an input with the internal pull-up enabled
    fn set_input_pullup(&mut self, pin: PinId);

    /// Configure the pin as a push-pull output
    fn set_output(&mut self, pin: PinId);

    /// Read the current level (true = high)
    fn read(&mut self, pin: PinId) -> bool;

    /// Drive the pin to a level (true = high)
    fn write(&mut self, pin: PinId, high: bool);

    /// Read an active-low input (buttons): true while the pin is low
    fn is_low(&mut self, pin: PinId) -> bool {
        !self.read(pin)
    }
}
