//! Source resolution and the per-tick polling pass

pub mod poll;
pub mod resolver;

pub use poll::{run_pass, FIRST_PIN_CHANNEL};
