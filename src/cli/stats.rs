//! CLI `stats` command: document counts per collection plus a database health report.

use anyhow::{Context, Result};

use studiomind::config::AppConfig;
use studiomind::db::{self, DbLocation};
use studiomind::records::{CONVERSATIONS, PROJECTS, TASKS, USER_MEMORY};

/// Print store statistics in the terminal.
pub fn stats(config: &AppConfig) -> Result<()> {
    if let DbLocation::File(path) = DbLocation::parse(&config.storage.url) {
        if !path.exists() {
            println!("Database: not found at {}", path.display());
            println!("Run `studiomind serve` to initialize.");
            return Ok(());
        }
    }

    let conn = db::open_database(&config.storage.url)
        .context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Store:               {}", config.storage.url);
    println!("  Schema version:      {}", report.schema_version);
    println!();

    println!("Documents:");
    for name in [CONVERSATIONS, PROJECTS, TASKS, USER_MEMORY] {
        let count = report
            .collections
            .iter()
            .find(|(collection, _)| collection == name)
            .map_or(0, |(_, count)| *count);
        println!("  {:<16} {}", name, count);
    }
    println!();

    if report.integrity_ok {
        println!("Integrity check:       PASSED");
    } else {
        println!("Integrity check:       FAILED ({})", report.integrity_details);
    }

    Ok(())
}
