//! Board-agnostic core logic for the configurable GPIO front panel
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Slot model, role assignments, and the persisted configuration layout
//! - Source-resolution engine (digital mirroring, inversion, constants,
//!   analog smoothing, PWM duty)
//! - Blink timers with analog-sourced phase durations
//! - Menu navigation state machine and its side-effect protocol
//! - Top-level panel tick loop with button debounce and mode handling
//! - Runtime statistics for the status footer

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod live;
pub mod menu;
pub mod panel;
pub mod stats;
pub mod timer;

#[cfg(test)]
pub(crate) mod testutil;

pub use panel::{Mode, Panel, PanelView};
