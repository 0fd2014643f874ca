//! Infrastructure implementations.
//!
//! Ports, their in-memory adapters, configuration, and content import.

pub mod clock;
pub mod config;
pub mod importers;
pub mod memory;
pub mod ports;
