//! Top-level panel: mode handling, button debounce, and the tick loop
//!
//! One cooperative tick per outer loop iteration. Timers advance every
//! tick; the rest of the tick either runs the polling engine (run mode) or
//! the menu machine (menu mode). The two modes are strictly mutually
//! exclusive, which is the only discipline protecting the configuration
//! store and the live state table - there are no locks.

use pinpanel_hal::{
    DigitalIo, NvStorage, PanelIo, PwmOut, Renderer, StorageError, BACKLIGHT_CHANNEL,
};

use crate::config::{
    slot_pin, PanelConfig, Role, PB1_SLOT, PB2_SLOT, PHYSICAL_SLOTS, SLOT_COUNT, TIMER1_SLOT,
    TIMER2_SLOT,
};
use crate::engine::{self, FIRST_PIN_CHANNEL};
use crate::live::LiveState;
use crate::menu::{Effects, Item, MenuId, MenuMachine, SideEffect};
use crate::timer::{default_timers, BlinkTimer};

/// Minimum spacing between accepted presses of one button
pub const DEBOUNCE_MS: u64 = 50;
/// Minimum spacing between combined-press mode toggles
pub const MODE_TOGGLE_MS: u64 = 200;
/// PWM carrier for user pins
pub const PWM_FREQ_HZ: u32 = 5000;
/// PWM duty resolution for user pins
pub const PWM_RESOLUTION_BITS: u8 = 8;

/// Top-level UI mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Polling engine active, menu inert
    Run,
    /// Menu machine active, polling suspended
    Menu,
}

/// Per-button debounce: accepts a press edge no more often than the
/// debounce interval. A press held past a rejected edge is accepted once
/// the interval elapses, matching the reference behavior.
#[derive(Debug)]
struct ButtonTracker {
    held: bool,
    last_press: u64,
}

impl ButtonTracker {
    const fn new() -> Self {
        Self {
            held: false,
            last_press: 0,
        }
    }

    /// Feed the current (active-low) level; true on an accepted press edge
    fn press(&mut self, low: bool, now: u64) -> bool {
        if low {
            if !self.held && now - self.last_press > DEBOUNCE_MS {
                self.held = true;
                self.last_press = now;
                return true;
            }
        } else {
            self.held = false;
        }
        false
    }
}

/// Combined-press gesture tracker: fires once per simultaneous hold, with
/// its own longer debounce window, and re-arms only when both buttons are
/// released.
#[derive(Debug)]
struct ModeToggle {
    latched: bool,
    last_toggle: u64,
}

impl ModeToggle {
    const fn new() -> Self {
        Self {
            latched: false,
            last_toggle: 0,
        }
    }

    fn update(&mut self, both_low: bool, both_high: bool, now: u64) -> bool {
        if both_low {
            if !self.latched && now - self.last_toggle > MODE_TOGGLE_MS {
                self.latched = true;
                self.last_toggle = now;
                return true;
            }
        } else if both_high {
            self.latched = false;
        }
        false
    }
}

/// The whole front panel
#[derive(Debug)]
pub struct Panel {
    cfg: PanelConfig,
    live: LiveState,
    timers: [BlinkTimer; 2],
    menu: MenuMachine,
    mode: Mode,
    next_btn: ButtonTracker,
    commit_btn: ButtonTracker,
    toggle: ModeToggle,
    wait_release: bool,
}

impl Panel {
    /// Load the persisted configuration and start in run mode
    pub fn boot<S: NvStorage>(storage: &mut S) -> Result<Self, StorageError> {
        let cfg = PanelConfig::load(storage)?;
        Ok(Self {
            cfg,
            live: LiveState::new(),
            timers: default_timers(),
            menu: MenuMachine::new(),
            mode: Mode::Run,
            next_btn: ButtonTracker::new(),
            commit_btn: ButtonTracker::new(),
            toggle: ModeToggle::new(),
            wait_release: false,
        })
    }

    /// Apply configured roles to the hardware: pin modes for inputs and
    /// outputs, PWM channel setup in slot order starting above the
    /// backlight channel. Called at boot and again on menu exit.
    pub fn init_pins<I: PanelIo>(&self, io: &mut I) {
        let mut channel = FIRST_PIN_CHANNEL;
        for slot in 0..PHYSICAL_SLOTS {
            let Some(pin) = slot_pin(slot) else {
                continue;
            };
            match self.cfg.role(slot) {
                Role::InputPullup | Role::ToggleSwitch => io.set_input_pullup(pin),
                Role::Output => io.set_output(pin),
                Role::Pwm => {
                    io.configure(channel, PWM_FREQ_HZ, PWM_RESOLUTION_BITS);
                    io.attach(channel, pin);
                    channel += 1;
                }
                _ => {}
            }
        }
        // Front buttons are always pulled-up inputs
        if let Some(pin) = slot_pin(PB1_SLOT) {
            io.set_input_pullup(pin);
        }
        if let Some(pin) = slot_pin(PB2_SLOT) {
            io.set_input_pullup(pin);
        }
    }

    /// One cooperative tick
    pub fn tick<I: PanelIo, S: NvStorage>(
        &mut self,
        io: &mut I,
        storage: &mut S,
        now: u64,
    ) -> Result<(), StorageError> {
        // Timers keep running regardless of mode
        for (timer, slot) in self.timers.iter_mut().zip([TIMER1_SLOT, TIMER2_SLOT]) {
            timer.tick(now);
            self.live.set_value(slot, timer.output());
        }

        let next_low = slot_pin(PB1_SLOT).map(|p| io.is_low(p)).unwrap_or(false);
        let commit_low = slot_pin(PB2_SLOT).map(|p| io.is_low(p)).unwrap_or(false);

        // Combined press toggles mode, overriding both per-button handlers
        if self
            .toggle
            .update(next_low && commit_low, !next_low && !commit_low, now)
        {
            self.mode = match self.mode {
                Mode::Run => {
                    self.menu.reset(&self.cfg);
                    Mode::Menu
                }
                Mode::Menu => Mode::Run,
            };
            self.wait_release = true;
        }
        if self.wait_release && !next_low && !commit_low {
            self.wait_release = false;
        }

        match self.mode {
            Mode::Run => {
                engine::run_pass(&self.cfg, &mut self.live, &mut self.timers, io);
                Ok(())
            }
            Mode::Menu => self.menu_tick(io, storage, next_low, commit_low, now),
        }
    }

    fn menu_tick<I: PanelIo, S: NvStorage>(
        &mut self,
        io: &mut I,
        storage: &mut S,
        next_low: bool,
        commit_low: bool,
        now: u64,
    ) -> Result<(), StorageError> {
        // Suppress both handlers until the mode-toggle gesture is released
        let (next_low, commit_low) = if self.wait_release {
            (false, false)
        } else {
            (next_low, commit_low)
        };

        if self.next_btn.press(next_low, now) {
            self.menu.next();
        }
        if self.commit_btn.press(commit_low, now) {
            let mut effects = Effects::new();
            self.menu.commit(&mut self.cfg, &mut self.timers, &mut effects);
            self.apply_effects(&effects, io, storage)?;
        }
        if !commit_low {
            self.menu.release_commit();
        }
        Ok(())
    }

    fn apply_effects<I: PanelIo, S: NvStorage>(
        &mut self,
        effects: &[SideEffect],
        io: &mut I,
        storage: &mut S,
    ) -> Result<(), StorageError> {
        for &effect in effects {
            match effect {
                SideEffect::ConfigureInput(slot) => {
                    if let Some(pin) = slot_pin(slot as usize) {
                        io.set_input_pullup(pin);
                    }
                }
                SideEffect::ConfigureOutput(slot) => {
                    if let Some(pin) = slot_pin(slot as usize) {
                        io.set_output(pin);
                    }
                }
                SideEffect::DriveLow(slot) => {
                    if let Some(pin) = slot_pin(slot as usize) {
                        io.set_output(pin);
                        io.write(pin, false);
                    }
                }
                SideEffect::ClearState(slot) => self.live.clear_slot(slot as usize),
                SideEffect::Persist => self.cfg.save(storage)?,
                SideEffect::ReinitPins => self.init_pins(io),
                SideEffect::SetBacklight(duty) => io.set_duty(BACKLIGHT_CHANNEL, duty),
                SideEffect::ExitMenu => {
                    self.mode = Mode::Run;
                    self.menu.reset(&self.cfg);
                }
            }
        }
        Ok(())
    }

    /// Current UI mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Configuration store
    pub fn config(&self) -> &PanelConfig {
        &self.cfg
    }

    /// Live state table
    pub fn live(&self) -> &LiveState {
        &self.live
    }

    /// Blink timers
    pub fn timers(&self) -> &[BlinkTimer; 2] {
        &self.timers
    }

    /// Hand the display a snapshot of this tick
    pub fn render<R>(&self, renderer: &mut R)
    where
        R: for<'a> Renderer<PanelView<'a>>,
    {
        renderer.render(&self.view());
    }

    /// Render snapshot for this tick
    pub fn view(&self) -> PanelView<'_> {
        PanelView {
            mode: self.mode,
            config: &self.cfg,
            values: self.live.values(),
            timer_intervals: [self.timers[0].intervals_ms(), self.timers[1].intervals_ms()],
            menu: MenuSnapshot {
                screen: self.menu.screen(),
                title: self.menu.screen().title(),
                cursor: self.menu.cursor(),
                items: self.menu.items(),
                selected_slot: self.menu.selected_slot(),
            },
        }
    }
}

/// Immutable snapshot handed to the renderer once per tick
#[derive(Debug)]
pub struct PanelView<'a> {
    pub mode: Mode,
    pub config: &'a PanelConfig,
    pub values: &'a [u8; SLOT_COUNT],
    pub timer_intervals: [(u32, u32); 2],
    pub menu: MenuSnapshot<'a>,
}

/// Menu portion of the render snapshot
#[derive(Debug)]
pub struct MenuSnapshot<'a> {
    pub screen: MenuId,
    pub title: &'static str,
    pub cursor: usize,
    pub items: &'a [Item],
    pub selected_slot: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceRef;
    use crate::testutil::{MemStorage, MockIo};

    fn boot_panel(storage: &mut MemStorage) -> Panel {
        Panel::boot(storage).unwrap()
    }

    /// Hold both buttons long enough to toggle the mode, then release
    fn toggle_mode(panel: &mut Panel, io: &mut MockIo, storage: &mut MemStorage, t: &mut u64) {
        io.set_level(0, false);
        io.set_level(14, false);
        *t += 300;
        panel.tick(io, storage, *t).unwrap();
        io.set_level(0, true);
        io.set_level(14, true);
        *t += 10;
        panel.tick(io, storage, *t).unwrap();
    }

    /// One debounced press-and-release of a button in menu mode
    fn press(panel: &mut Panel, io: &mut MockIo, storage: &mut MemStorage, pin: u8, t: &mut u64) {
        io.set_level(pin, false);
        *t += 60;
        panel.tick(io, storage, *t).unwrap();
        io.set_level(pin, true);
        *t += 10;
        panel.tick(io, storage, *t).unwrap();
    }

    #[test]
    fn boot_loads_persisted_roles() {
        let mut storage = MemStorage::new();
        storage.bytes[5] = 3; // Output
        storage.bytes[24 + 5] = 201; // constant HIGH
        storage.bytes[6] = 77; // invalid role byte

        let panel = boot_panel(&mut storage);
        assert_eq!(panel.config().role(5), Role::Output);
        assert_eq!(panel.config().source_ref(5), SourceRef::Constant(1));
        assert_eq!(panel.config().role(6), Role::Unset);
    }

    #[test]
    fn run_mode_drives_configured_output() {
        let mut storage = MemStorage::new();
        storage.bytes[5] = 3;
        storage.bytes[24 + 5] = 201;
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        panel.init_pins(&mut io);
        assert!(io.outputs_configured.contains(&17)); // slot 5 -> pin 17

        panel.tick(&mut io, &mut storage, 1).unwrap();
        assert!(io.written.contains(&(17, true)));
        assert_eq!(panel.live().value(5), 1);
    }

    #[test]
    fn pwm_channels_stay_aligned_with_init_across_unwired_slots() {
        let mut storage = MemStorage::new();
        storage.bytes[0] = 5; // Pwm on unwired slot 0, kept by load
        storage.bytes[5] = 5; // Pwm on slot 5 (pin 17)
        storage.bytes[24 + 5] = 150; // fixed duty 50
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();

        panel.init_pins(&mut io);
        assert_eq!(io.attached.as_slice(), &[(1, 17)]);

        // The polling pass must write pin 17's duty to the channel
        // init_pins attached it to.
        panel.tick(&mut io, &mut storage, 1).unwrap();
        assert_eq!(io.duty[1], 50);
        assert_eq!(io.duty[2], 0);
    }

    #[test]
    fn timer_outputs_advance_every_tick_in_both_modes() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();

        // Default timer 1: off phase 2500 ms
        panel.tick(&mut io, &mut storage, 2500).unwrap();
        assert_eq!(panel.live().value(TIMER1_SLOT), 0); // strict >
        panel.tick(&mut io, &mut storage, 2501).unwrap();
        assert_eq!(panel.live().value(TIMER1_SLOT), 1);

        // Still advancing while the menu is open
        let mut t = 2501u64;
        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);
        assert_eq!(panel.mode(), Mode::Menu);
        t += 3000;
        panel.tick(&mut io, &mut storage, t).unwrap();
        assert_eq!(panel.live().value(TIMER1_SLOT), 0); // flipped back off
    }

    #[test]
    fn combined_press_toggles_mode_once_per_gesture() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();

        io.set_level(0, false);
        io.set_level(14, false);
        panel.tick(&mut io, &mut storage, 300).unwrap();
        assert_eq!(panel.mode(), Mode::Menu);

        // Held: no second toggle even past the window
        panel.tick(&mut io, &mut storage, 700).unwrap();
        panel.tick(&mut io, &mut storage, 1200).unwrap();
        assert_eq!(panel.mode(), Mode::Menu);

        // Release, then a fresh gesture toggles back
        io.set_level(0, true);
        io.set_level(14, true);
        panel.tick(&mut io, &mut storage, 1300).unwrap();
        io.set_level(0, false);
        io.set_level(14, false);
        panel.tick(&mut io, &mut storage, 1600).unwrap();
        assert_eq!(panel.mode(), Mode::Run);
    }

    #[test]
    fn mode_toggle_suppresses_menu_buttons_until_release() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();

        io.set_level(0, false);
        io.set_level(14, false);
        panel.tick(&mut io, &mut storage, 300).unwrap();
        assert_eq!(panel.mode(), Mode::Menu);

        // Both still held: neither cursor movement nor commit may fire
        panel.tick(&mut io, &mut storage, 400).unwrap();
        panel.tick(&mut io, &mut storage, 500).unwrap();
        assert_eq!(panel.view().menu.cursor, 0);
        assert_eq!(panel.mode(), Mode::Menu);
    }

    #[test]
    fn menu_navigation_and_commit_walk() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        let mut t = 0u64;

        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);
        assert_eq!(panel.mode(), Mode::Menu);

        // Move the cursor to "Set Pin" (index 2) and commit
        press(&mut panel, &mut io, &mut storage, 0, &mut t);
        press(&mut panel, &mut io, &mut storage, 0, &mut t);
        assert_eq!(panel.view().menu.cursor, 2);
        press(&mut panel, &mut io, &mut storage, 14, &mut t);
        assert_eq!(panel.view().menu.screen, MenuId::SelectPin);
    }

    #[test]
    fn two_presses_within_debounce_window_count_once() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        let mut t = 0u64;
        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);

        // First press accepted
        io.set_level(0, false);
        t += 60;
        panel.tick(&mut io, &mut storage, t).unwrap();
        io.set_level(0, true);
        t += 5;
        panel.tick(&mut io, &mut storage, t).unwrap();
        // Second press only 20 ms after the first: rejected
        io.set_level(0, false);
        t += 15;
        panel.tick(&mut io, &mut storage, t).unwrap();
        io.set_level(0, true);
        t += 5;
        panel.tick(&mut io, &mut storage, t).unwrap();

        assert_eq!(panel.view().menu.cursor, 1);
    }

    #[test]
    fn held_next_button_advances_once() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        let mut t = 0u64;
        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);

        io.set_level(0, false);
        for _ in 0..10 {
            t += 100;
            panel.tick(&mut io, &mut storage, t).unwrap();
        }
        assert_eq!(panel.view().menu.cursor, 1);
    }

    #[test]
    fn exit_commit_persists_and_returns_to_run_mode() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        let mut t = 0u64;
        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);

        // Cursor starts on EXIT
        press(&mut panel, &mut io, &mut storage, 14, &mut t);
        assert_eq!(panel.mode(), Mode::Run);
        assert_eq!(panel.view().menu.screen, MenuId::Root);
        assert_eq!(storage.commits, 1);
    }

    #[test]
    fn render_hands_the_display_a_snapshot() {
        struct TitleGrabber(&'static str);
        impl<'a> Renderer<PanelView<'a>> for TitleGrabber {
            fn render(&mut self, view: &PanelView<'a>) {
                self.0 = view.menu.title;
            }
        }

        let mut storage = MemStorage::new();
        let panel = boot_panel(&mut storage);
        let mut display = TitleGrabber("");
        panel.render(&mut display);
        assert_eq!(display.0, "MENU");
    }

    #[test]
    fn backlight_item_sets_channel_zero() {
        let mut storage = MemStorage::new();
        let mut panel = boot_panel(&mut storage);
        let mut io = MockIo::new();
        let mut t = 0u64;
        toggle_mode(&mut panel, &mut io, &mut storage, &mut t);

        // Root: EXIT, Reset All, Set Pin, Set Timer, Brightness
        for _ in 0..4 {
            press(&mut panel, &mut io, &mut storage, 0, &mut t);
        }
        press(&mut panel, &mut io, &mut storage, 14, &mut t);
        assert_eq!(panel.view().menu.screen, MenuId::Brightness);

        press(&mut panel, &mut io, &mut storage, 14, &mut t);
        assert_eq!(io.duty[BACKLIGHT_CHANNEL as usize], 50);
        assert_eq!(panel.view().menu.screen, MenuId::Root);
    }
}
