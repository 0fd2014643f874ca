//! Port traits for infrastructure boundaries.
//!
//! Content is stored per owner kind as whole entity snapshots; characters are
//! stored with their choice ledgers. Time is injected so tests stay
//! deterministic.

mod error;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{CharacterRepo, OwnerRepo, UnreadableSnapshot};

// =============================================================================
// Test-Only Mock Repositories (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::MockCharacterRepo;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
