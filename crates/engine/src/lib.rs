//! Charforge Engine library.
//!
//! Content authoring, validation, and character choices over the
//! `charforge-domain` model.
//!
//! ## Structure
//!
//! - `repositories` - content stores grouped by owner kind
//! - `use_cases/` - authoring, choices, and audit orchestration
//! - `infrastructure/` - ports, in-memory adapters, config, and import
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod repositories;
pub mod use_cases;

pub use app::App;
