//! Runtime statistics for the status footer: uptime, loop rate, and the
//! supply voltage readout

use core::fmt::Write;

use heapless::String;

/// Longest uptime string that fits the footer
pub const UPTIME_LEN: usize = 12;

/// Format milliseconds since boot as `H:MM:SS`
pub fn format_uptime(now_ms: u64) -> String<UPTIME_LEN> {
    let total = now_ms / 1000;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let mut out = String::new();
    let _ = write!(out, "{}:{:02}:{:02}", hours, minutes, seconds);
    out
}

/// Supply-sense voltage divider ratio (board halves the rail)
const SUPPLY_DIVIDER: f32 = 2.0;
/// ADC reference in millivolts
const SUPPLY_REF_MV: f32 = 3300.0;
/// Converter counts at full scale (12-bit)
const SUPPLY_FULL_SCALE: f32 = 4096.0;

/// Convert a raw supply-sense reading to rail millivolts
pub fn supply_millivolts(raw: u16) -> u32 {
    (raw as f32 * SUPPLY_DIVIDER * SUPPLY_REF_MV / SUPPLY_FULL_SCALE) as u32
}

/// Frames-per-second counter, recomputed once per second
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: u64,
    fps: u32,
}

impl FpsCounter {
    pub const fn new() -> Self {
        Self {
            frames: 0,
            window_start: 0,
            fps: 0,
        }
    }

    /// Count one loop iteration; rolls the window when a second has passed
    pub fn frame(&mut self, now_ms: u64) {
        self.frames += 1;
        let elapsed = now_ms - self.window_start;
        if elapsed >= 1000 {
            self.fps = (self.frames as u64 * 1000 / elapsed) as u32;
            self.frames = 0;
            self.window_start = now_ms;
        }
    }

    /// Rate measured over the last completed window
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
