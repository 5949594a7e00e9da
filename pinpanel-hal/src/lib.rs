//! Pinpanel Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the panel core drives. Pin roles
//! are assigned at runtime, so unlike a conventional embedded HAL the
//! digital and analog interfaces are keyed by a dynamic [`gpio::PinId`]
//! rather than by owned pin types. Chip-specific implementations (ESP32-S3,
//! host-side mocks, etc.) sit behind these traits; the core never touches
//! registers directly.
//!
//! # Traits
//!
//! - [`gpio::DigitalIo`] - Digital read/write and pin mode by pin id
//! - [`adc::AnalogIn`] - Raw analog reads
//! - [`pwm::PwmOut`] - PWM channel setup and duty writes
//! - [`storage::NvStorage`] - Byte-granular non-volatile storage
//! - [`render::Renderer`] - Frame render boundary (consumes a snapshot)

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod pwm;
pub mod render;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use adc::AnalogIn;
pub use gpio::{DigitalIo, PinId};
pub use pwm::{PwmOut, BACKLIGHT_CHANNEL};
pub use render::Renderer;
pub use storage::{NvStorage, StorageError};

/// Everything the polling engine needs from the board in one bound.
pub trait PanelIo: DigitalIo + AnalogIn + PwmOut {}

// Blanket implementation for types that implement all three traits
impl<T: DigitalIo + AnalogIn + PwmOut> PanelIo for T {}
