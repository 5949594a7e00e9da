//! Menu screens and their item sets
//!
//! Each screen is an ordered list of selectable items. Several screens are
//! dynamic - they list whatever slots currently hold input-capable or
//! analog roles - so item sets are rebuilt from the live configuration
//! every time a screen is entered, never cached.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::config::{
    PanelConfig, Role, SourceRef, CONFIGURABLE_SLOTS, PB1_SLOT, PB2_SLOT, SLOT_LABELS, TIMER1_SLOT,
    TIMER2_SLOT,
};
use crate::timer::TimerPhase;

/// Upper bound on items per screen (source screen: 10 fixed entries plus a
/// direct/inverted pair per input-capable slot)
pub const MAX_MENU_ITEMS: usize = 40;

/// Longest item label ("INP_PULLUP", "MULTIPLIER")
pub const MAX_LABEL_LEN: usize = 12;

/// The menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuId {
    /// Root screen, also the state the machine resets to
    Root,
    /// Choose which pin to configure
    SelectPin,
    /// Choose the selected pin's role
    SelectRole,
    /// Wire an output's source
    SelectSource,
    /// Fixed PWM duty or analog source
    PwmValue,
    /// Choose which timer to edit
    Timers,
    /// Edit the chosen timer
    TimerEdit,
    /// Phase duration: fixed base or analog source
    TimerPhase,
    /// Timer multiplier
    TimerMultiplier,
    /// Display backlight level
    Brightness,
}

impl MenuId {
    /// Screen heading
    pub fn title(self) -> &'static str {
        match self {
            MenuId::Root => "MENU",
            MenuId::SelectPin => "SELECT PIN",
            MenuId::SelectRole => "SELECT TYPE",
            MenuId::SelectSource => "SET SOURCE",
            MenuId::PwmValue => "PWM",
            MenuId::Timers => "SET TIMERS",
            MenuId::TimerEdit => "SET TIMER",
            MenuId::TimerPhase => "SET TIME",
            MenuId::TimerMultiplier => "MULTIPLIER",
            MenuId::Brightness => "BRIGHTNESS",
        }
    }
}

/// One selectable menu entry, carrying its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Item {
    /// Return to the parent screen
    Back,
    /// Leave menu mode: persist the config and re-init hardware roles
    Exit,
    /// Deconfigure every pin
    ResetAll,
    /// Enter a sub-screen with no other action
    Goto(MenuId),
    /// A configurable pin slot
    Pin(u8),
    /// Assign a role to the selected pin
    Assign(Role),
    /// Wire the selected output to a source
    Source(SourceRef),
    /// Fixed PWM duty for the selected pin
    PwmDuty(u8),
    /// Analog slot driving the selected pin's duty
    PwmSource(u8),
    /// Pick a timer to edit
    Timer(u8),
    /// Pick which phase of the timer to edit
    Phase(TimerPhase),
    /// Fixed base value for the edited phase
    PhaseBase(u8),
    /// Analog slot driving the edited phase's base
    PhaseSource(u8),
    /// Multiplier for both phases of the edited timer
    Multiplier(u8),
    /// Backlight duty
    Brightness(u8),
}

impl Item {
    /// Display label for this entry
    pub fn label(&self) -> String<MAX_LABEL_LEN> {
        let fixed = match *self {
            Item::Back => "BACK",
            Item::Exit => "EXIT",
            Item::ResetAll => "Reset All",
            Item::Goto(MenuId::SelectPin) => "Set Pin",
            Item::Goto(MenuId::Timers) => "Set Timer",
            Item::Goto(MenuId::TimerMultiplier) => "MULTIPLIER",
            Item::Goto(MenuId::Brightness) => "Brightness",
            Item::Goto(id) => id.title(),
            Item::Pin(slot) => slot_label(slot),
            Item::Assign(Role::Unset) => "NOT SET",
            Item::Assign(Role::InputPullup) => "INP_PULLUP",
            Item::Assign(Role::ToggleSwitch) => "ON/OFF SW",
            Item::Assign(Role::Output) => "OUTPUT",
            Item::Assign(Role::Analog) => "ANALOG",
            Item::Assign(role) => role.label(),
            Item::Source(SourceRef::Constant(0)) => "LOW",
            Item::Source(SourceRef::Constant(_)) => "HIGH",
            Item::Source(SourceRef::Direct(slot)) => slot_label(slot),
            Item::Source(SourceRef::Unset) => "",
            Item::Phase(TimerPhase::On) => "ON TIME",
            Item::Phase(TimerPhase::Off) => "OFF TIME",
            other => {
                let mut out = String::new();
                let _ = match other {
                    Item::Source(SourceRef::Inverted(slot)) => {
                        write!(out, "!{}", slot_label(slot))
                    }
                    Item::PwmSource(slot) | Item::PhaseSource(slot) => {
                        write!(out, "PIN {}", slot_label(slot))
                    }
                    Item::Timer(index) => write!(out, "SET T{}", index + 1),
                    Item::PwmDuty(value)
                    | Item::PhaseBase(value)
                    | Item::Multiplier(value)
                    | Item::Brightness(value) => write!(out, "{}", value),
                    _ => Ok(()),
                };
                return out;
            }
        };
        let mut out = String::new();
        let _ = out.push_str(fixed);
        out
    }
}

fn slot_label(slot: u8) -> &'static str {
    SLOT_LABELS.get(slot as usize).copied().unwrap_or("?")
}

/// Build a screen's item list from the current configuration
pub fn build_items(id: MenuId, cfg: &PanelConfig) -> Vec<Item, MAX_MENU_ITEMS> {
    let mut items: Vec<Item, MAX_MENU_ITEMS> = Vec::new();
    let mut push = |item| {
        let _ = items.push(item);
    };

    match id {
        MenuId::Root => {
            push(Item::Exit);
            push(Item::ResetAll);
            push(Item::Goto(MenuId::SelectPin));
            push(Item::Goto(MenuId::Timers));
            push(Item::Goto(MenuId::Brightness));
        }
        MenuId::SelectPin => {
            push(Item::Back);
            for &slot in CONFIGURABLE_SLOTS.iter() {
                push(Item::Pin(slot));
            }
        }
        MenuId::SelectRole => {
            push(Item::Back);
            push(Item::Assign(Role::Unset));
            push(Item::Assign(Role::InputPullup));
            push(Item::Assign(Role::ToggleSwitch));
            push(Item::Assign(Role::Output));
            push(Item::Assign(Role::Analog));
            push(Item::Assign(Role::Pwm));
        }
        MenuId::SelectSource => {
            push(Item::Source(SourceRef::Constant(1)));
            push(Item::Source(SourceRef::Constant(0)));
            for fixed in [TIMER1_SLOT, TIMER2_SLOT, PB1_SLOT, PB2_SLOT] {
                push(Item::Source(SourceRef::Direct(fixed as u8)));
                push(Item::Source(SourceRef::Inverted(fixed as u8)));
            }
            for &slot in cfg.input_capable_slots().iter() {
                push(Item::Source(SourceRef::Direct(slot)));
                push(Item::Source(SourceRef::Inverted(slot)));
            }
        }
        MenuId::PwmValue => {
            for duty in [50, 100, 150] {
                push(Item::PwmDuty(duty));
            }
            for &slot in cfg.analog_slots().iter() {
                push(Item::PwmSource(slot));
            }
        }
        MenuId::Timers => {
            push(Item::Back);
            push(Item::Timer(0));
            push(Item::Timer(1));
        }
        MenuId::TimerEdit => {
            push(Item::Back);
            push(Item::Phase(TimerPhase::On));
            push(Item::Phase(TimerPhase::Off));
            push(Item::Goto(MenuId::TimerMultiplier));
        }
        MenuId::TimerPhase => {
            for base in [1, 50, 100, 150, 250] {
                push(Item::PhaseBase(base));
            }
            for &slot in cfg.analog_slots().iter() {
                push(Item::PhaseSource(slot));
            }
        }
        MenuId::TimerMultiplier => {
            for value in [1, 10, 100, 200, 250] {
                push(Item::Multiplier(value));
            }
        }
        MenuId::Brightness => {
            for value in [50, 100, 150, 200, 250] {
                push(Item::Brightness(value));
            }
        }
    }

    items
}
