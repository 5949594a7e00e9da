//! Configuration store and persistence adapter
//!
//! Persisted layout (48 bytes, no header or checksum): bytes 0..=23 hold
//! the role code per physical slot, bytes 24..=47 the raw source byte per
//! physical slot. Role bytes outside the valid range coerce to `Unset` on
//! load; source bytes are taken verbatim.

use heapless::Vec;
use pinpanel_hal::{NvStorage, StorageError};

use super::types::{
    Role, SourceRef, PB1_SLOT, PB2_SLOT, PHYSICAL_SLOTS, SLOT_COUNT, SOURCE_UNSET, TIMER1_SLOT,
    TIMER2_SLOT,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Offset of the source table within the persisted layout
const SOURCE_BASE: usize = PHYSICAL_SLOTS;

/// Per-slot role and source assignments
///
/// Only the 24 physical slots are stored; the pushbutton and timer slots
/// have fixed roles reported by [`PanelConfig::role`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    roles: [Role; PHYSICAL_SLOTS],
    sources: [u8; PHYSICAL_SLOTS],
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelConfig {
    /// All slots unconfigured
    pub const fn new() -> Self {
        Self {
            roles: [Role::Unset; PHYSICAL_SLOTS],
            sources: [SOURCE_UNSET; PHYSICAL_SLOTS],
        }
    }

    /// Role of a slot, including the fixed roles of the button and timer
    /// slots. Out-of-range indices report `Unset`.
    pub fn role(&self, slot: usize) -> Role {
        match slot {
            PB1_SLOT | PB2_SLOT => Role::PushButton,
            TIMER1_SLOT | TIMER2_SLOT => Role::TimerOutput,
            s => self.roles.get(s).copied().unwrap_or(Role::Unset),
        }
    }

    /// Assign a role to a physical slot; ignored for fixed/out-of-range slots
    pub fn set_role(&mut self, slot: usize, role: Role) {
        if let Some(r) = self.roles.get_mut(slot) {
            *r = role;
        }
    }

    /// Raw persisted source byte of a physical slot
    pub fn raw_source(&self, slot: usize) -> u8 {
        self.sources.get(slot).copied().unwrap_or(SOURCE_UNSET)
    }

    /// Decoded source reference of a slot, in the context of its role
    pub fn source_ref(&self, slot: usize) -> SourceRef {
        SourceRef::decode(self.role(slot), self.raw_source(slot))
    }

    /// Store a source reference, encoding it per the slot's current role
    pub fn set_source(&mut self, slot: usize, source: SourceRef) {
        let role = self.role(slot);
        if let Some(s) = self.sources.get_mut(slot) {
            *s = source.encode(role);
        }
    }

    /// Reset one slot to unconfigured
    pub fn reset_slot(&mut self, slot: usize) {
        self.set_role(slot, Role::Unset);
        if let Some(s) = self.sources.get_mut(slot) {
            *s = SOURCE_UNSET;
        }
    }

    /// Reset every physical slot to unconfigured
    pub fn clear_all(&mut self) {
        for slot in 0..PHYSICAL_SLOTS {
            self.reset_slot(slot);
        }
    }

    /// Deconfigure every slot whose source byte references `slot` directly
    ///
    /// Returns the affected slots so the caller can drive their outputs low.
    /// Inverted references (byte 100+slot) are left alone, matching the
    /// reference behavior.
    pub fn detach_dependents(&mut self, slot: u8) -> Vec<u8, PHYSICAL_SLOTS> {
        let mut detached = Vec::new();
        for i in 0..PHYSICAL_SLOTS {
            if self.sources[i] == slot {
                self.reset_slot(i);
                let _ = detached.push(i as u8);
            }
        }
        detached
    }

    /// Slots currently usable as digital sources (inputs and switches)
    ///
    /// Recomputed on every call; the menu rebuilds its dynamic screens from
    /// this each time they are entered.
    pub fn input_capable_slots(&self) -> Vec<u8, PHYSICAL_SLOTS> {
        let mut slots = Vec::new();
        for i in 0..PHYSICAL_SLOTS {
            if self.roles[i].is_input_capable() {
                let _ = slots.push(i as u8);
            }
        }
        slots
    }

    /// Slots currently configured as analog inputs
    pub fn analog_slots(&self) -> Vec<u8, PHYSICAL_SLOTS> {
        let mut slots = Vec::new();
        for i in 0..PHYSICAL_SLOTS {
            if self.roles[i] == Role::Analog {
                let _ = slots.push(i as u8);
            }
        }
        slots
    }

    /// Load the configuration from storage, coercing invalid role bytes
    pub fn load<S: NvStorage>(storage: &mut S) -> Result<Self, StorageError> {
        let mut cfg = Self::new();
        for i in 0..PHYSICAL_SLOTS {
            cfg.roles[i] = Role::from_persisted(storage.read_byte(i)?);
        }
        for i in 0..PHYSICAL_SLOTS {
            cfg.sources[i] = storage.read_byte(SOURCE_BASE + i)?;
        }
        Ok(cfg)
    }

    /// Write the configuration to storage and commit
    pub fn save<S: NvStorage>(&self, storage: &mut S) -> Result<(), StorageError> {
        for i in 0..PHYSICAL_SLOTS {
            storage.write_byte(i, self.roles[i].as_u8())?;
        }
        for i in 0..PHYSICAL_SLOTS {
            storage.write_byte(SOURCE_BASE + i, self.sources[i])?;
        }
        storage.commit()
    }
}

/// Compile-time check that the layout covers every persisted slot
const _: () = assert!(SOURCE_BASE + PHYSICAL_SLOTS == 48);
const _: () = assert!(SLOT_COUNT == PHYSICAL_SLOTS + 4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemStorage;
    use proptest::prelude::*;

    #[test]
    fn load_coerces_invalid_roles() {
        let mut storage = MemStorage::new();
        storage.bytes[0] = 3; // Output
        storage.bytes[1] = 9; // invalid
        storage.bytes[2] = 255; // erased flash
        storage.bytes[SOURCE_BASE] = 201;
        storage.bytes[SOURCE_BASE + 1] = 177; // kept verbatim

        let cfg = PanelConfig::load(&mut storage).unwrap();
        assert_eq!(cfg.role(0), Role::Output);
        assert_eq!(cfg.role(1), Role::Unset);
        assert_eq!(cfg.role(2), Role::Unset);
        assert_eq!(cfg.raw_source(0), 201);
        assert_eq!(cfg.raw_source(1), 177);
    }

    #[test]
    fn save_writes_fixed_layout_and_commits() {
        let mut cfg = PanelConfig::new();
        cfg.set_role(5, Role::Output);
        cfg.set_source(5, SourceRef::Constant(1));

        let mut storage = MemStorage::new();
        cfg.save(&mut storage).unwrap();
        assert_eq!(storage.bytes[5], 3);
        assert_eq!(storage.bytes[SOURCE_BASE + 5], 201);
        assert_eq!(storage.commits, 1);
    }

    #[test]
    fn fixed_slots_report_fixed_roles() {
        let cfg = PanelConfig::new();
        assert_eq!(cfg.role(PB1_SLOT), Role::PushButton);
        assert_eq!(cfg.role(PB2_SLOT), Role::PushButton);
        assert_eq!(cfg.role(TIMER1_SLOT), Role::TimerOutput);
        assert_eq!(cfg.role(TIMER2_SLOT), Role::TimerOutput);
        assert_eq!(cfg.role(200), Role::Unset);
    }

    #[test]
    fn detach_resets_direct_dependents_only() {
        let mut cfg = PanelConfig::new();
        cfg.set_role(7, Role::Output);
        cfg.set_source(7, SourceRef::Direct(5));
        cfg.set_role(16, Role::Output);
        cfg.set_source(16, SourceRef::Inverted(5));

        let detached = cfg.detach_dependents(5);
        assert_eq!(detached.as_slice(), &[7]);
        assert_eq!(cfg.role(7), Role::Unset);
        assert_eq!(cfg.raw_source(7), SOURCE_UNSET);
        // Inverted reference untouched
        assert_eq!(cfg.role(16), Role::Output);
        assert_eq!(cfg.raw_source(16), 105);
    }

    #[test]
    fn capability_queries_track_config() {
        let mut cfg = PanelConfig::new();
        assert!(cfg.input_capable_slots().is_empty());
        cfg.set_role(4, Role::InputPullup);
        cfg.set_role(13, Role::ToggleSwitch);
        cfg.set_role(5, Role::Analog);
        assert_eq!(cfg.input_capable_slots().as_slice(), &[4, 13]);
        assert_eq!(cfg.analog_slots().as_slice(), &[5]);

        cfg.reset_slot(4);
        assert_eq!(cfg.input_capable_slots().as_slice(), &[13]);
    }

    proptest! {
        #[test]
        fn round_trip_preserves_valid_configs(
            roles in proptest::collection::vec(0u8..=5, PHYSICAL_SLOTS),
            sources in proptest::collection::vec(0u8..=255, PHYSICAL_SLOTS),
        ) {
            let mut storage = MemStorage::new();
            storage.bytes[..PHYSICAL_SLOTS].copy_from_slice(&roles);
            storage.bytes[SOURCE_BASE..SOURCE_BASE + PHYSICAL_SLOTS]
                .copy_from_slice(&sources);

            let cfg = PanelConfig::load(&mut storage).unwrap();
            let mut second = MemStorage::new();
            cfg.save(&mut second).unwrap();
            prop_assert_eq!(&second.bytes[..48], &storage.bytes[..48]);

            let reloaded = PanelConfig::load(&mut second).unwrap();
            prop_assert_eq!(reloaded, cfg);
        }
    }
}
