//! Configuration store, slot model, and the persisted layout

mod store;
mod types;

pub use store::PanelConfig;
pub use types::{
    slot_pin, Role, SourceRef, CONFIGURABLE_SLOTS, PB1_SLOT, PB2_SLOT, PHYSICAL_SLOTS, PIN_MAP,
    SLOT_COUNT, SLOT_LABELS, SOURCE_UNSET, TIMER1_SLOT, TIMER2_SLOT,
};
