//! Blink timer subsystem
//!
//! Two independent two-phase timers drive the timer-output slots. Each
//! phase's duration is `base * multiplier` milliseconds, where the base is
//! either a literal byte or mirrors the live state of an analog slot.
//! Durations are recomputed once per run-mode pass ([`BlinkTimer::refresh`]);
//! the phase machine itself advances every tick regardless of UI mode.

use crate::live::LiveState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which half of the blink cycle the timer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimerPhase {
    On,
    Off,
}

/// Duration parameters for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseTiming {
    /// Base duration value; overwritten from `source` when one is set
    pub base: u8,
    /// Analog slot whose live state supplies the base, if any
    pub source: Option<u8>,
    /// Duration multiplier
    pub multiplier: u8,
}

impl PhaseTiming {
    /// Literal base with no live source
    pub const fn fixed(base: u8, multiplier: u8) -> Self {
        Self {
            base,
            source: None,
            multiplier,
        }
    }

    fn duration_ms(&self) -> u32 {
        self.base as u32 * self.multiplier as u32
    }
}

/// One two-phase blink timer
#[derive(Debug, Clone)]
pub struct BlinkTimer {
    /// On-phase duration parameters
    pub on: PhaseTiming,
    /// Off-phase duration parameters
    pub off: PhaseTiming,
    on_ms: u32,
    off_ms: u32,
    phase: TimerPhase,
    phase_start: u64,
}

impl BlinkTimer {
    /// New timer, starting in the Off phase at t = 0
    pub fn new(on_base: u8, off_base: u8, multiplier: u8) -> Self {
        let on = PhaseTiming::fixed(on_base, multiplier);
        let off = PhaseTiming::fixed(off_base, multiplier);
        Self {
            on_ms: on.duration_ms(),
            off_ms: off.duration_ms(),
            on,
            off,
            phase: TimerPhase::Off,
            phase_start: 0,
        }
    }

    /// Pull sourced base values from the live state table and recompute
    /// both phase durations. Called once per run-mode pass, before the
    /// slot resolution loop.
    pub fn refresh(&mut self, live: &LiveState) {
        if let Some(slot) = self.on.source {
            self.on.base = live.value(slot as usize);
        }
        if let Some(slot) = self.off.source {
            self.off.base = live.value(slot as usize);
        }
        self.on_ms = self.on.duration_ms();
        self.off_ms = self.off.duration_ms();
    }

    /// Advance the phase machine; returns true when the phase flipped.
    ///
    /// The comparison is strictly greater-than: nothing happens on the tick
    /// where elapsed time equals the duration, the next tick fires it.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let wait = match self.phase {
            TimerPhase::On => self.on_ms,
            TimerPhase::Off => self.off_ms,
        };
        if now_ms > self.phase_start + wait as u64 {
            self.phase = match self.phase {
                TimerPhase::On => TimerPhase::Off,
                TimerPhase::Off => TimerPhase::On,
            };
            self.phase_start = now_ms;
            true
        } else {
            false
        }
    }

    /// Timer output as a slot value (1 while On)
    pub fn output(&self) -> u8 {
        match self.phase {
            TimerPhase::On => 1,
            TimerPhase::Off => 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Computed (on, off) durations in milliseconds, for the renderer
    pub fn intervals_ms(&self) -> (u32, u32) {
        (self.on_ms, self.off_ms)
    }

    /// Phase timing being edited in the menu
    pub fn timing_mut(&mut self, phase: TimerPhase) -> &mut PhaseTiming {
        match phase {
            TimerPhase::On => &mut self.on,
            TimerPhase::Off => &mut self.off,
        }
    }

    /// Set the multiplier for both phases (the menu edits them together)
    pub fn set_multiplier(&mut self, multiplier: u8) {
        self.on.multiplier = multiplier;
        self.off.multiplier = multiplier;
    }
}

/// Factory-default timers of the reference board
pub fn default_timers() -> [BlinkTimer; 2] {
    [BlinkTimer::new(250, 250, 10), BlinkTimer::new(150, 150, 10)]
}
