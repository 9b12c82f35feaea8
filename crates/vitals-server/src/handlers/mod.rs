//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod audit;
pub mod model;
pub mod planning;
pub mod snapshots;
pub mod users;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use model::*;
pub use planning::*;
pub use snapshots::*;
pub use users::*;
