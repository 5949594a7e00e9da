//! Pure source resolution
//!
//! Maps a slot's source reference plus the current state table to its new
//! value. No hardware access and no hidden state: the smoothing
//! accumulator and press latches live in [`crate::live::LiveState`], so
//! identical inputs always produce identical outputs.
//!
//! Self-referencing and circular chains are deliberately not detected.
//! Resolution order is index-ascending, so a reference to a slot processed
//! later in the same pass reads that slot's previous-cycle value. That
//! one-cycle latency is documented behavior, not something to correct.

use crate::config::SourceRef;
use crate::live::LiveState;

/// Exponential smoothing factor for analog readings
pub const SMOOTHING_ALPHA: f32 = 0.1;

/// New level for an output slot, or `None` while the source is unset
pub fn output_level(source: SourceRef, live: &LiveState) -> Option<u8> {
    match source {
        SourceRef::Unset => None,
        SourceRef::Direct(slot) => Some(live.value(slot as usize)),
        SourceRef::Inverted(slot) => Some(if live.is_high(slot as usize) { 0 } else { 1 }),
        SourceRef::Constant(value) => Some(value),
    }
}

/// New duty for a PWM slot, or `None` while the source is unset
pub fn pwm_duty(source: SourceRef, live: &LiveState) -> Option<u8> {
    match source {
        SourceRef::Unset => None,
        SourceRef::Constant(duty) => Some(duty),
        SourceRef::Direct(slot) | SourceRef::Inverted(slot) => Some(live.value(slot as usize)),
    }
}

/// One smoothing step toward the instantaneous raw reading
pub fn smooth(previous: f32, raw: u16) -> f32 {
    previous * (1.0 - SMOOTHING_ALPHA) + raw as f32 * SMOOTHING_ALPHA
}

/// Rescale a smoothed reading from the converter's native range to 0..=255
pub fn rescale(smoothed: f32, max_count: u16) -> u8 {
    if max_count == 0 {
        return 0;
    }
    let clamped = (smoothed as u32).min(max_count as u32);
    (clamped * 255 / max_count as u32) as u8
}
