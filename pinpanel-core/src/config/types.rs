//! Slot, role, and source reference definitions
//!
//! The panel exposes 28 addressable slots: 24 physical header positions
//! (not all of them wired to a GPIO), two front pushbuttons, and the two
//! blink timer outputs. Slot indices are fixed and meaningful - source
//! references and the persisted layout both address slots by index.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use pinpanel_hal::PinId;

/// Physical header slots (persisted, user-configurable where wired)
pub const PHYSICAL_SLOTS: usize = 24;
/// Front pushbutton 1 (momentary, also the menu "next" button)
pub const PB1_SLOT: usize = 24;
/// Front pushbutton 2 (latching, also the menu "commit" button)
pub const PB2_SLOT: usize = 25;
/// Blink timer 1 output
pub const TIMER1_SLOT: usize = 26;
/// Blink timer 2 output
pub const TIMER2_SLOT: usize = 27;
/// Total addressable slots
pub const SLOT_COUNT: usize = 28;

/// Legacy "no source" sentinel byte (never dereferenced)
pub const SOURCE_UNSET: u8 = 100;

/// Behavioral interpretation of a slot
///
/// Codes 0..=5 are the persistable, user-assignable roles. `PushButton`
/// and `TimerOutput` exist only at their fixed slot indices and are never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Role {
    /// Slot not configured
    #[default]
    Unset = 0,
    /// Digital input with pull-up, state mirrors the raw level
    InputPullup = 1,
    /// Debounced momentary input latched into an on/off state
    ToggleSwitch = 2,
    /// Digital output driven from a source reference
    Output = 3,
    /// Smoothed analog input rescaled to 0..=255
    Analog = 4,
    /// PWM output with fixed or sourced duty
    Pwm = 5,
    /// Fixed front-panel pushbutton (slots 24..=25 only)
    PushButton = 6,
    /// Blink timer output (slots 26..=27 only)
    TimerOutput = 7,
}

impl Role {
    /// Decode a persisted role byte
    ///
    /// Any byte outside the user-assignable range comes back as `Unset`.
    /// This is the only defensive validation the store performs.
    pub fn from_persisted(byte: u8) -> Self {
        match byte {
            1 => Role::InputPullup,
            2 => Role::ToggleSwitch,
            3 => Role::Output,
            4 => Role::Analog,
            5 => Role::Pwm,
            _ => Role::Unset,
        }
    }

    /// Role code as stored in the persisted layout
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Can this slot's state be wired into an output?
    pub fn is_input_capable(self) -> bool {
        matches!(self, Role::InputPullup | Role::ToggleSwitch)
    }

    /// Short display label for configured roles
    pub fn label(self) -> &'static str {
        match self {
            Role::Unset => "",
            Role::InputPullup => "INP",
            Role::ToggleSwitch => "SW",
            Role::Output => "OUT",
            Role::Analog => "ANA",
            Role::Pwm => "PWM",
            Role::PushButton => "PB",
            Role::TimerOutput => "TMR",
        }
    }
}

/// What drives a derived slot's state
///
/// In memory the reference is explicit; the legacy byte ranges
/// (100 sentinel, 100+index inverted, 200+constant, ...) exist only at the
/// persistence boundary. Encoding depends on the slot's role - see
/// [`SourceRef::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SourceRef {
    /// No source assigned
    #[default]
    Unset,
    /// Mirror another slot's state
    Direct(u8),
    /// Logical inverse of another slot's state (Output role only)
    Inverted(u8),
    /// Fixed constant (0/1 for outputs, duty for PWM)
    Constant(u8),
}

impl SourceRef {
    /// Decode a persisted source byte in the context of a role
    ///
    /// Out-of-range slot indices are not validated here; the resolver
    /// reads a missing slot as 0.
    pub fn decode(role: Role, byte: u8) -> Self {
        match role {
            Role::Output => match byte {
                SOURCE_UNSET => SourceRef::Unset,
                b if b < 100 => SourceRef::Direct(b),
                b if b < 200 => SourceRef::Inverted(b - 100),
                b => SourceRef::Constant(b - 200),
            },
            Role::Pwm => match byte {
                SOURCE_UNSET => SourceRef::Unset,
                b if b > 100 => SourceRef::Constant(b - 100),
                b => SourceRef::Direct(b),
            },
            // Other roles carry the sentinel; whatever byte is stored is
            // never dereferenced.
            _ => SourceRef::Unset,
        }
    }

    /// Encode back to the persisted byte ranges for a role
    pub fn encode(self, role: Role) -> u8 {
        match role {
            Role::Pwm => match self {
                SourceRef::Unset => SOURCE_UNSET,
                SourceRef::Constant(duty) => duty.saturating_add(100),
                SourceRef::Direct(idx) | SourceRef::Inverted(idx) => idx,
            },
            _ => match self {
                SourceRef::Unset => SOURCE_UNSET,
                SourceRef::Direct(idx) => idx,
                SourceRef::Inverted(idx) => idx + 100,
                SourceRef::Constant(value) => value.saturating_add(200),
            },
        }
    }
}

/// GPIO wired to each physical slot; `None` for ground/supply/NC positions.
///
/// Slots 2..=7 and 13..=19 are the user-configurable pins of the reference
/// board; 24/25 are the two front buttons.
pub const PIN_MAP: [Option<PinId>; SLOT_COUNT] = [
    None,
    None,
    Some(PinId(43)),
    Some(PinId(44)),
    Some(PinId(18)),
    Some(PinId(17)),
    Some(PinId(21)),
    Some(PinId(16)),
    None,
    None,
    None,
    None,
    None,
    Some(PinId(1)),
    Some(PinId(2)),
    Some(PinId(3)),
    Some(PinId(10)),
    Some(PinId(11)),
    Some(PinId(12)),
    Some(PinId(13)),
    None,
    None,
    None,
    None,
    Some(PinId(0)),
    Some(PinId(14)),
    None,
    None,
];

/// Header label per slot (silkscreen names)
pub const SLOT_LABELS: [&str; SLOT_COUNT] = [
    "G", "G", "43", "44", "18", "17", "21", "16", "NC", "G", "G", "3V", "3V", "1", "2", "3", "10",
    "11", "12", "13", "NC", "NC", "G", "5V", "PB1", "PB2", "T1", "T2",
];

/// Slot indices a user may assign a role to (wired physical pins)
pub const CONFIGURABLE_SLOTS: [u8; 13] = [2, 3, 4, 5, 6, 7, 13, 14, 15, 16, 17, 18, 19];

/// GPIO wired to a slot, if any
pub fn slot_pin(slot: usize) -> Option<PinId> {
    PIN_MAP.get(slot).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn invalid_role_bytes_coerce_to_unset() {
        assert_eq!(Role::from_persisted(0), Role::Unset);
        assert_eq!(Role::from_persisted(5), Role::Pwm);
        for byte in 6..=255u8 {
            assert_eq!(Role::from_persisted(byte), Role::Unset);
        }
    }

    #[test]
    fn output_source_byte_ranges() {
        assert_eq!(SourceRef::decode(Role::Output, 5), SourceRef::Direct(5));
        assert_eq!(SourceRef::decode(Role::Output, 100), SourceRef::Unset);
        assert_eq!(
            SourceRef::decode(Role::Output, 126),
            SourceRef::Inverted(26)
        );
        assert_eq!(SourceRef::decode(Role::Output, 200), SourceRef::Constant(0));
        assert_eq!(SourceRef::decode(Role::Output, 201), SourceRef::Constant(1));
    }

    #[test]
    fn pwm_source_byte_ranges() {
        assert_eq!(SourceRef::decode(Role::Pwm, 5), SourceRef::Direct(5));
        assert_eq!(SourceRef::decode(Role::Pwm, 100), SourceRef::Unset);
        assert_eq!(SourceRef::decode(Role::Pwm, 150), SourceRef::Constant(50));
        assert_eq!(SourceRef::decode(Role::Pwm, 250), SourceRef::Constant(150));
    }

    #[test]
    fn encode_matches_legacy_bytes() {
        assert_eq!(SourceRef::Constant(1).encode(Role::Output), 201);
        assert_eq!(SourceRef::Inverted(24).encode(Role::Output), 124);
        assert_eq!(SourceRef::Direct(26).encode(Role::Output), 26);
        assert_eq!(SourceRef::Constant(50).encode(Role::Pwm), 150);
        assert_eq!(SourceRef::Direct(5).encode(Role::Pwm), 5);
        assert_eq!(SourceRef::Unset.encode(Role::Output), SOURCE_UNSET);
    }

    proptest! {
        #[test]
        fn output_decode_encode_round_trips(byte in 0u8..=255) {
            let decoded = SourceRef::decode(Role::Output, byte);
            prop_assert_eq!(decoded.encode(Role::Output), byte);
        }

        #[test]
        fn pwm_decode_encode_round_trips(byte in 0u8..=255) {
            // 100 decodes to Unset which encodes back to 100, and every
            // other byte partitions cleanly into direct/constant.
            let decoded = SourceRef::decode(Role::Pwm, byte);
            prop_assert_eq!(decoded.encode(Role::Pwm), byte);
        }
    }

    #[test]
    fn configurable_slots_are_wired() {
        for &slot in CONFIGURABLE_SLOTS.iter() {
            assert!(slot_pin(slot as usize).is_some());
        }
        assert!(slot_pin(0).is_none());
        assert!(slot_pin(TIMER1_SLOT).is_none());
        assert!(slot_pin(99).is_none());
    }
}
