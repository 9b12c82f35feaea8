//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database init and shared utilities (open_db, load_config, find_user)
//! - `users` - User management commands
//! - `snapshots` - Recording snapshots and showing history
//! - `analytics` - Health, anomaly, and forecast reports
//! - `planning` - Goal planning and investment advice
//! - `model` - Savings model training and status
//! - `serve` - Web server command

pub mod analytics;
pub mod core;
pub mod model;
pub mod planning;
pub mod serve;
pub mod snapshots;
pub mod users;

// Re-export command functions for main.rs
pub use analytics::*;
pub use core::*;
pub use model::*;
pub use planning::*;
pub use serve::*;
pub use snapshots::*;
pub use users::*;
