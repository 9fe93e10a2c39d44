//! Small serde helpers shared across modules.

pub mod time;
