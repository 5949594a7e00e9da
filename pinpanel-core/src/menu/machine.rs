//! Menu state machine
//!
//! The running state is the (screen, cursor, selection) triple. Navigation
//! advances the cursor; commit looks the current entry up in the transition
//! table and applies its mutation to the configuration, emitting side
//! effects for the panel layer to run against the hardware and storage.
//! The machine itself never touches the live state table or the HAL.

use heapless::Vec;

use super::screens::{build_items, Item, MenuId, MAX_MENU_ITEMS};
use crate::config::{PanelConfig, Role, SourceRef, CONFIGURABLE_SLOTS};
use crate::timer::{BlinkTimer, TimerPhase};

/// Hardware/storage actions requested by a committed transition, applied
/// by the panel layer after the config mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideEffect {
    /// Configure the slot's pin as an input with pull-up
    ConfigureInput(u8),
    /// Configure the slot's pin as an output
    ConfigureOutput(u8),
    /// Drive the slot's pin low (idempotent deconfigure)
    DriveLow(u8),
    /// Zero the slot's live value and transients
    ClearState(u8),
    /// Commit the configuration store to persistence
    Persist,
    /// Re-initialize hardware modes for every configured slot
    ReinitPins,
    /// Set the display backlight duty
    SetBacklight(u8),
    /// Leave menu mode and return to run mode
    ExitMenu,
}

/// Worst case: reset-all touches every wired pin, detach can touch every
/// physical slot, plus a handful of fixed effects.
pub const MAX_EFFECTS: usize = 32;

/// Side effects emitted by one committed transition
pub type Effects = Vec<SideEffect, MAX_EFFECTS>;

/// The menu navigation machine
#[derive(Debug)]
pub struct MenuMachine {
    screen: MenuId,
    cursor: usize,
    items: Vec<Item, MAX_MENU_ITEMS>,
    selected_slot: u8,
    timer_index: usize,
    phase: TimerPhase,
    action_latch: bool,
}

impl Default for MenuMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuMachine {
    /// New machine parked at the root screen
    pub fn new() -> Self {
        let mut machine = Self {
            screen: MenuId::Root,
            cursor: 0,
            items: Vec::new(),
            selected_slot: 0,
            timer_index: 0,
            phase: TimerPhase::On,
            action_latch: false,
        };
        machine.enter(MenuId::Root, &PanelConfig::new());
        machine
    }

    /// Current screen
    pub fn screen(&self) -> MenuId {
        self.screen
    }

    /// Cursor position within the current screen
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Slot being edited across nested screens
    pub fn selected_slot(&self) -> u8 {
        self.selected_slot
    }

    /// Timer being edited (0 or 1)
    pub fn timer_index(&self) -> usize {
        self.timer_index
    }

    /// Items of the current screen
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Back to the root screen (menu entry / exit to run mode)
    pub fn reset(&mut self, cfg: &PanelConfig) {
        self.enter(MenuId::Root, cfg);
        self.action_latch = false;
    }

    /// Debounced "next" press: advance the cursor modulo the item count.
    /// On the pin chooser the cursor position also latches the selection.
    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.items.len();
        self.latch_selection();
    }

    /// Debounced "commit" press: fire the transition for the current entry.
    ///
    /// The action latch guarantees at most one transition per physical
    /// press; it stays set until [`MenuMachine::release_commit`].
    pub fn commit(
        &mut self,
        cfg: &mut PanelConfig,
        timers: &mut [BlinkTimer; 2],
        effects: &mut Effects,
    ) {
        if self.action_latch {
            return;
        }
        self.action_latch = true;
        self.latch_selection();

        let Some(&item) = self.items.get(self.cursor) else {
            return;
        };
        let next = self.apply(item, cfg, timers, effects);
        self.enter(next, cfg);
    }

    /// Commit button released: allow the next press to fire
    pub fn release_commit(&mut self) {
        self.action_latch = false;
    }

    /// The transition table: applies the entry's mutation and returns the
    /// screen to land on.
    fn apply(
        &mut self,
        item: Item,
        cfg: &mut PanelConfig,
        timers: &mut [BlinkTimer; 2],
        effects: &mut Effects,
    ) -> MenuId {
        let slot = self.selected_slot;
        match item {
            Item::Back => match self.screen {
                MenuId::SelectRole => MenuId::SelectPin,
                _ => MenuId::Root,
            },

            Item::Exit => {
                push(effects, SideEffect::Persist);
                push(effects, SideEffect::ReinitPins);
                push(effects, SideEffect::ExitMenu);
                MenuId::Root
            }

            Item::ResetAll => {
                cfg.clear_all();
                for &wired in CONFIGURABLE_SLOTS.iter() {
                    push(effects, SideEffect::DriveLow(wired));
                }
                MenuId::Root
            }

            Item::Goto(id) => id,

            Item::Pin(picked) => {
                self.selected_slot = picked;
                MenuId::SelectRole
            }

            Item::Assign(role) => {
                detach(cfg, slot, effects);
                cfg.set_role(slot as usize, role);
                cfg.set_source(slot as usize, SourceRef::Unset);
                match role {
                    Role::InputPullup => {
                        push(effects, SideEffect::ConfigureInput(slot));
                        MenuId::Root
                    }
                    Role::ToggleSwitch => {
                        push(effects, SideEffect::ConfigureInput(slot));
                        push(effects, SideEffect::ClearState(slot));
                        MenuId::Root
                    }
                    Role::Output => {
                        push(effects, SideEffect::ConfigureOutput(slot));
                        MenuId::SelectSource
                    }
                    Role::Pwm => MenuId::PwmValue,
                    _ => MenuId::Root,
                }
            }

            Item::Source(source) => {
                cfg.set_source(slot as usize, source);
                MenuId::Root
            }

            Item::PwmDuty(duty) => {
                cfg.set_source(slot as usize, SourceRef::Constant(duty));
                MenuId::Root
            }

            Item::PwmSource(analog) => {
                cfg.set_source(slot as usize, SourceRef::Direct(analog));
                MenuId::Root
            }

            Item::Timer(index) => {
                self.timer_index = index as usize;
                MenuId::TimerEdit
            }

            Item::Phase(phase) => {
                self.phase = phase;
                MenuId::TimerPhase
            }

            Item::PhaseBase(base) => {
                let timing = timers[self.timer_index].timing_mut(self.phase);
                timing.base = base;
                timing.source = None;
                MenuId::TimerEdit
            }

            Item::PhaseSource(analog) => {
                timers[self.timer_index].timing_mut(self.phase).source = Some(analog);
                MenuId::TimerEdit
            }

            Item::Multiplier(value) => {
                timers[self.timer_index].set_multiplier(value);
                MenuId::TimerEdit
            }

            Item::Brightness(duty) => {
                push(effects, SideEffect::SetBacklight(duty));
                MenuId::Root
            }
        }
    }

    /// Enter a screen: cursor to the top, items rebuilt from the current
    /// configuration (dynamic screens pick up role changes this way).
    fn enter(&mut self, id: MenuId, cfg: &PanelConfig) {
        self.screen = id;
        self.cursor = 0;
        self.items = build_items(id, cfg);
    }

    fn latch_selection(&mut self) {
        if self.screen == MenuId::SelectPin {
            if let Some(Item::Pin(slot)) = self.items.get(self.cursor) {
                self.selected_slot = *slot;
            }
        }
    }
}

fn push(effects: &mut Effects, effect: SideEffect) {
    let _ = effects.push(effect);
}

/// Deconfigure slots wired to `slot` and queue their outputs to be driven
/// low, so a role change never leaves a dependent driving a stale level.
fn detach(cfg: &mut PanelConfig, slot: u8, effects: &mut Effects) {
    for dependent in cfg.detach_dependents(slot) {
        push(effects, SideEffect::DriveLow(dependent));
    }
}
