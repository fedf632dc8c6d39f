//! Storage primitives backing the graph containers.

pub mod slot_arena;

pub use slot_arena::{SlotArena, SlotKey};
