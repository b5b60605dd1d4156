//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system. Tables are generated from the
//! entity schemas, so adding a field to a schema needs a new migration that
//! adds the column.

use ecole_core::types::now_millis;
use ecole_core::{EntityKind, EntitySchema};
use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Bookkeeping column recording when a row was inserted (Unix ms).
pub const INSERTED_AT: &str = "inserted_at";

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "sqlite schema migrated");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: one table per entity kind.
fn apply_v1(conn: &Connection) -> Result<()> {
    for kind in EntityKind::ALL {
        conn.execute_batch(&create_table_sql(kind.schema()))?;
    }

    conn.execute_batch(
        r#"
        CREATE INDEX idx_teacher_advances_teacher_month
            ON teacher_advances (teacher_id, month);
        CREATE INDEX idx_teacher_salaries_teacher_month
            ON teacher_salaries (teacher_id, month);
        CREATE INDEX idx_messages_recipient ON messages (recipient_id);
        CREATE INDEX idx_parent_notifications_parent ON parent_notifications (parent_id);
        "#,
    )?;

    Ok(())
}

/// `CREATE TABLE` statement for a schema.
pub fn create_table_sql(schema: &EntitySchema) -> String {
    let mut columns: Vec<String> = schema
        .fields
        .iter()
        .map(|spec| {
            if spec.column == "id" {
                format!("\"id\" {} PRIMARY KEY", spec.ty.sql_type())
            } else {
                format!("\"{}\" {}", spec.column, spec.ty.sql_type())
            }
        })
        .collect();
    columns.push(format!("\"{}\" INTEGER NOT NULL", INSERTED_AT));

    format!(
        "CREATE TABLE \"{}\" (\n    {}\n);",
        schema.table,
        columns.join(",\n    ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_every_kind_has_a_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        for kind in EntityKind::ALL {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [kind.schema().table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table for {}", kind);
        }
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(EntityKind::Subject.schema());
        assert!(sql.starts_with("CREATE TABLE \"subjects\""));
        assert!(sql.contains("\"id\" TEXT PRIMARY KEY"));
        assert!(sql.contains("\"coefficient\" INTEGER"));
        assert!(sql.contains("\"inserted_at\" INTEGER NOT NULL"));
    }
}
