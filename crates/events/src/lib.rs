//! Status stream for the kiln job engine.
//!
//! This crate provides the event bus and the typed events a running job
//! publishes for external observers (UIs, log stores).

mod bus;
mod types;

pub use bus::{EventBus, JobEvents};
pub use types::*;
