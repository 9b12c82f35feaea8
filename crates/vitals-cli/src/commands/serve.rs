//! Server command implementation

use std::path::Path;

use anyhow::Result;
use vitals_core::AnalyticsConfig;
use vitals_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    analytics: AnalyticsConfig,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Vitals web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Model cache: {}",
        analytics.predictor.resolved_cache_path().display()
    );
    if allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    if no_encrypt {
        println!();
        println!("   ⚠️  Database encryption DISABLED");
    }
    println!();

    let db = open_db(db_path, no_encrypt)?;
    let config = ServerConfig { allowed_origins };

    vitals_server::serve(db, host, port, analytics, config).await
}
