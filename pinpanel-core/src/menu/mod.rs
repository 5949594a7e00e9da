//! Menu navigation state machine and its screens

mod machine;
mod screens;

pub use machine::{Effects, MenuMachine, SideEffect, MAX_EFFECTS};
pub use screens::{build_items, Item, MenuId, MAX_LABEL_LEN, MAX_MENU_ITEMS};
