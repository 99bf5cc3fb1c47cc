//! In-memory collaborators for exercising connections without a database.

pub mod fixtures;
mod log;
mod memory;

pub use log::*;
pub use memory::*;
