//! Live slot state table
//!
//! One entry per slot: the resolved value (0/1 for digital roles, 0..=255
//! for analog and PWM) plus the transient fields the resolver needs across
//! cycles - the analog smoothing accumulator and the per-slot press latch
//! used by toggle switches. None of this is ever persisted.

use crate::config::SLOT_COUNT;

/// Current resolved state of every slot
#[derive(Debug, Clone)]
pub struct LiveState {
    values: [u8; SLOT_COUNT],
    smoothed: [f32; SLOT_COUNT],
    press_latch: [bool; SLOT_COUNT],
}

impl Default for LiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveState {
    /// All slots at zero
    pub const fn new() -> Self {
        Self {
            values: [0; SLOT_COUNT],
            smoothed: [0.0; SLOT_COUNT],
            press_latch: [false; SLOT_COUNT],
        }
    }

    /// Resolved value of a slot; out-of-range indices read as 0
    ///
    /// Source bytes are not range-checked anywhere, so a misconfigured
    /// reference can land here with a bogus index. Reading it as 0 keeps
    /// every tick total.
    pub fn value(&self, slot: usize) -> u8 {
        self.values.get(slot).copied().unwrap_or(0)
    }

    /// Resolved value as a digital level
    pub fn is_high(&self, slot: usize) -> bool {
        self.value(slot) != 0
    }

    /// Overwrite a slot's resolved value
    pub fn set_value(&mut self, slot: usize, value: u8) {
        if let Some(v) = self.values.get_mut(slot) {
            *v = value;
        }
    }

    /// Flip a digital slot's value and return the new level
    pub fn toggle(&mut self, slot: usize) -> u8 {
        let flipped = if self.is_high(slot) { 0 } else { 1 };
        self.set_value(slot, flipped);
        flipped
    }

    /// Smoothing accumulator for an analog slot
    pub fn smoothed(&self, slot: usize) -> f32 {
        self.smoothed.get(slot).copied().unwrap_or(0.0)
    }

    /// Store the smoothing accumulator
    pub fn set_smoothed(&mut self, slot: usize, value: f32) {
        if let Some(s) = self.smoothed.get_mut(slot) {
            *s = value;
        }
    }

    /// Debounce policy for toggle switches: recognize a press exactly once
    /// per continuous pressed period. Returns true on the recognized edge.
    pub fn press_edge(&mut self, slot: usize, pressed: bool) -> bool {
        let Some(latch) = self.press_latch.get_mut(slot) else {
            return false;
        };
        if pressed {
            if !*latch {
                *latch = true;
                return true;
            }
        } else {
            *latch = false;
        }
        false
    }

    /// Reset one slot's value and transients (role reassignment)
    pub fn clear_slot(&mut self, slot: usize) {
        self.set_value(slot, 0);
        self.set_smoothed(slot, 0.0);
        if let Some(latch) = self.press_latch.get_mut(slot) {
            *latch = false;
        }
    }

    /// Snapshot of all resolved values, for the renderer
    pub fn values(&self) -> &[u8; SLOT_COUNT] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_as_zero() {
        let mut live = LiveState::new();
        live.set_value(5, 7);
        assert_eq!(live.value(5), 7);
        assert_eq!(live.value(100), 0);
        live.set_value(100, 1); // silently ignored
        assert_eq!(live.value(100), 0);
    }

    #[test]
    fn press_edge_fires_once_per_press() {
        let mut live = LiveState::new();
        assert!(live.press_edge(3, true));
        assert!(!live.press_edge(3, true));
        assert!(!live.press_edge(3, true));
        assert!(!live.press_edge(3, false));
        assert!(live.press_edge(3, true));
    }

    #[test]
    fn toggle_flips_between_levels() {
        let mut live = LiveState::new();
        assert_eq!(live.toggle(2), 1);
        assert_eq!(live.toggle(2), 0);
    }
}
