//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Analytics configuration lookup
//! - `load_predictor` - Load or train the savings model off the async runtime
//! - `find_user` - Resolve a username to a user
//! - `cmd_init` - Initialize the database

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vitals_core::{AnalyticsConfig, Database, SavingsPredictor, User};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load analytics config from an explicit path, the user config dir, or defaults
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    AnalyticsConfig::load(path).context("Failed to load analytics config")
}

/// Load the cached savings model, training it first if needed
pub async fn load_predictor(config: &AnalyticsConfig) -> Result<Arc<SavingsPredictor>> {
    let predictor_config = config.predictor.clone();
    let predictor =
        tokio::task::spawn_blocking(move || SavingsPredictor::shared(&predictor_config))
            .await
            .context("Model training task failed")??;
    Ok(predictor)
}

/// Look up a user by name
pub fn find_user(db: &Database, username: &str) -> Result<User> {
    db.get_user_by_name(username)?.with_context(|| {
        format!(
            "User '{}' not found. Add one with: vitals users add {}",
            username, username
        )
    })
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a snapshot: vitals add --user me --income 5000 --expenses 3000");
    println!("  2. Check your health: vitals health --user me");
    println!("  3. Start the API: vitals serve");

    Ok(())
}
