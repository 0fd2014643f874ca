//! Content importers.

mod bundle;

pub use bundle::{BundleImporter, ImportError, ImportSummary, RejectedEntry};
