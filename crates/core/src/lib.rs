//! Domain types for the kiln job engine.
//!
//! This crate holds the data model shared by the runner and any surrounding
//! orchestration: jobs, lifecycle phases, and command descriptors. It contains
//! no execution logic.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::CoreError;
