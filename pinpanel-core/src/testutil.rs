//! In-memory hardware doubles for host tests

use heapless::Vec;
use pinpanel_hal::{AnalogIn, DigitalIo, NvStorage, PinId, PwmOut, StorageError};

/// Mock board: pin levels and analog counts are indexed by GPIO number.
pub struct MockIo {
    levels: [bool; 64],
    analog: [u16; 64],
    pub duty: [u8; 16],
    pub written: Vec<(u8, bool), 64>,
    pub inputs_configured: Vec<u8, 32>,
    pub outputs_configured: Vec<u8, 32>,
    pub attached: Vec<(u8, u8), 16>,
}

impl MockIo {
    pub fn new() -> Self {
        Self {
            // Pull-ups idle high
            levels: [true; 64],
            analog: [0; 64],
            duty: [0; 16],
            written: Vec::new(),
            inputs_configured: Vec::new(),
            outputs_configured: Vec::new(),
            attached: Vec::new(),
        }
    }

    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels[pin as usize] = high;
    }

    pub fn set_analog(&mut self, pin: u8, raw: u16) {
        self.analog[pin as usize] = raw;
    }
}

impl DigitalIo for MockIo {
    fn set_input_pullup(&mut self, pin: PinId) {
        let _ = self.inputs_configured.push(pin.0);
    }

    fn set_output(&mut self, pin: PinId) {
        let _ = self.outputs_configured.push(pin.0);
    }

    fn read(&mut self, pin: PinId) -> bool {
        self.levels[pin.0 as usize]
    }

    fn write(&mut self, pin: PinId, high: bool) {
        self.levels[pin.0 as usize] = high;
        let _ = self.written.push((pin.0, high));
    }
}

impl AnalogIn for MockIo {
    fn sample(&mut self, pin: PinId) -> u16 {
        self.analog[pin.0 as usize]
    }
}

impl PwmOut for MockIo {
    fn configure(&mut self, _channel: u8, _freq_hz: u32, _resolution_bits: u8) {}

    fn attach(&mut self, channel: u8, pin: PinId) {
        let _ = self.attached.push((channel, pin.0));
    }

    fn set_duty(&mut self, channel: u8, duty: u8) {
        self.duty[channel as usize] = duty;
    }
}

/// 64-byte EEPROM double, erased to 0xFF like real flash.
pub struct MemStorage {
    pub bytes: [u8; 64],
    pub commits: u32,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; 64],
            commits: 0,
        }
    }
}

impl NvStorage for MemStorage {
    fn read_byte(&mut self, offset: usize) -> Result<u8, StorageError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(StorageError::OutOfRange)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StorageError> {
        match self.bytes.get_mut(offset) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(StorageError::OutOfRange),
        }
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.commits += 1;
        Ok(())
    }
}
