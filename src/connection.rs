use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const IN_MEMORY: &str = ":memory:";

pub fn conn(database_url: &str) -> Result<Connection> {
    if database_url == IN_MEMORY {
        let conn = Connection::open_in_memory()?;
        crate::database::create_tables(&conn)?;
        return Ok(conn);
    }

    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let conn = Connection::open(database_url)
        .with_context(|| format!("failed to open database {}", database_url))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;

    // Initialize the database tables
    crate::database::create_tables(&conn)?;

    Ok(conn)
}
