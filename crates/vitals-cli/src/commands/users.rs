//! User management commands

use anyhow::Result;
use vitals_core::Database;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with: vitals users add <name>");
        return Ok(());
    }

    println!("👤 Users:");
    println!();
    println!("{:>5}  {:<24} {:>9}  Created", "ID", "Username", "Snapshots");
    println!("{}", "-".repeat(56));
    for user in users {
        let count = db.count_snapshots(user.id)?;
        println!(
            "{:>5}  {:<24} {:>9}  {}",
            user.id,
            user.username,
            count,
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub fn cmd_users_add(db: &Database, username: &str) -> Result<()> {
    let user = db.get_or_create_user(username)?;
    println!("✅ User '{}' (id {})", user.username, user.id);
    Ok(())
}
