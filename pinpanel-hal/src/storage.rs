//! Non-volatile byte storage abstraction
//!
//! The persisted pin table is a small fixed layout addressed byte-by-byte
//! (EEPROM style), so the trait is offset-based rather than key-value.
//! Writes may be buffered until [`NvStorage::commit`].

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Offset outside the provisioned storage area
    OutOfRange,
    /// Underlying read failed
    Read,
    /// Underlying write failed
    Write,
    /// Commit to the backing medium failed
    Commit,
}

/// Byte-granular persistent storage
pub trait NvStorage {
    /// Read one byte at an offset
    fn read_byte(&mut self, offset: usize) -> Result<u8, StorageError>;

    /// Write one byte at an offset (possibly buffered)
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StorageError>;

    /// Flush buffered writes to the backing medium
    fn commit(&mut self) -> Result<(), StorageError>;
}
