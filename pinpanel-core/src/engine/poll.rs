//! Polling engine
//!
//! One pass per run-mode tick: refresh timer base values, then resolve the
//! first 26 slots in index order (physical pins, then the two pushbuttons;
//! timer-output slots are driven by the timer subsystem, not this pass).
//! Hardware reads and writes go through the [`PanelIo`] traits; everything
//! else is computed against the live state table in place.

use pinpanel_hal::{AnalogIn, DigitalIo, PanelIo, PwmOut};

use super::resolver;
use crate::config::{slot_pin, PanelConfig, Role, SourceRef, PB1_SLOT, PB2_SLOT};
use crate::live::LiveState;
use crate::timer::BlinkTimer;

/// First PWM channel handed to user pins (channel 0 is the backlight)
pub const FIRST_PIN_CHANNEL: u8 = 1;

/// Run one resolution pass over slots 0..=25.
///
/// Slot dependencies resolve within the same pass only when the source has
/// a lower index; anything else reads the previous cycle's value.
pub fn run_pass<I: PanelIo>(
    cfg: &PanelConfig,
    live: &mut LiveState,
    timers: &mut [BlinkTimer; 2],
    io: &mut I,
) {
    for timer in timers.iter_mut() {
        timer.refresh(live);
    }

    let mut pwm_channel = FIRST_PIN_CHANNEL;
    for slot in 0..=PB2_SLOT {
        match cfg.role(slot) {
            Role::Unset | Role::TimerOutput => {}

            Role::InputPullup => {
                if let Some(pin) = slot_pin(slot) {
                    live.set_value(slot, io.read(pin) as u8);
                }
            }

            Role::ToggleSwitch => {
                if let Some(pin) = slot_pin(slot) {
                    let pressed = io.is_low(pin);
                    if live.press_edge(slot, pressed) {
                        live.toggle(slot);
                    }
                }
            }

            Role::Output => match cfg.source_ref(slot) {
                SourceRef::Unset => {}
                SourceRef::Constant(value) => {
                    // Fixed outputs are driven here, immediately, and skip
                    // the generic drive path below.
                    live.set_value(slot, value);
                    if let Some(pin) = slot_pin(slot) {
                        io.write(pin, value != 0);
                    }
                }
                source => {
                    if let Some(value) = resolver::output_level(source, live) {
                        live.set_value(slot, value);
                        if let Some(pin) = slot_pin(slot) {
                            io.write(pin, value != 0);
                        }
                    }
                }
            },

            Role::Analog => {
                if let Some(pin) = slot_pin(slot) {
                    let raw = io.sample(pin);
                    let smoothed = resolver::smooth(live.smoothed(slot), raw);
                    live.set_smoothed(slot, smoothed);
                    live.set_value(slot, resolver::rescale(smoothed, io.max_count()));
                }
            }

            Role::Pwm => {
                // Channel numbering must walk the slots exactly as
                // Panel::init_pins does, so unwired slots consume none.
                if slot_pin(slot).is_some() {
                    if let Some(duty) = resolver::pwm_duty(cfg.source_ref(slot), live) {
                        live.set_value(slot, duty);
                    }
                    io.set_duty(pwm_channel, live.value(slot));
                    pwm_channel += 1;
                }
            }

            Role::PushButton => {
                // Slot 24 mirrors the raw level; slot 25 latches a toggle
                // per debounced press, like the momentary/latching pair of
                // the reference front panel.
                if let Some(pin) = slot_pin(slot) {
                    if slot == PB1_SLOT {
                        live.set_value(slot, io.read(pin) as u8);
                    } else {
                        let pressed = io.is_low(pin);
                        if live.press_edge(slot, pressed) {
                            live.toggle(slot);
                        }
                    }
                }
            }
        }
    }
}
