//! SQLite implementation of the RowStore trait.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ecole_core::types::now_millis;
use ecole_core::{ColumnType, EntitySchema, FieldSpec, OrderBy, RecordId, Row};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::Connection;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::migration::{self, INSERTED_AT};
use crate::remote::RowStore;

/// SQLite-based row store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteRowStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRowStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Internal(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("spawn_blocking failed: {}", e)))?
    }
}

fn quoted(ident: &str) -> String {
    format!("\"{}\"", ident)
}

fn order_clause(order: OrderBy) -> String {
    match order {
        OrderBy::Newest => format!("{} DESC, rowid DESC", quoted(INSERTED_AT)),
        OrderBy::Ascending(column) => format!("{} ASC, rowid ASC", quoted(column)),
        OrderBy::Descending(column) => format!("{} DESC, rowid DESC", quoted(column)),
    }
}

/// Convert a JSON value to the SQL value stored in a column.
fn to_sql(spec: &FieldSpec, value: &Value) -> Result<SqlValue> {
    let mismatch = || {
        StoreError::InvalidData(format!(
            "column `{}` expects {:?}, got {}",
            spec.column, spec.ty, value
        ))
    };

    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    match spec.ty {
        ColumnType::Text => value
            .as_str()
            .map(|s| SqlValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        ColumnType::Integer => value.as_i64().map(SqlValue::Integer).ok_or_else(mismatch),
        ColumnType::Real => value.as_f64().map(SqlValue::Real).ok_or_else(mismatch),
        ColumnType::Boolean => value
            .as_bool()
            .map(|b| SqlValue::Integer(i64::from(b)))
            .ok_or_else(mismatch),
        ColumnType::Json => Ok(SqlValue::Text(value.to_string())),
    }
}

/// Read column `idx` of a result row as JSON.
fn from_sql(row: &rusqlite::Row<'_>, idx: usize, spec: &FieldSpec) -> rusqlite::Result<Value> {
    let value = match spec.ty {
        ColumnType::Text => row.get::<_, Option<String>>(idx)?.map(Value::String),
        ColumnType::Integer => row.get::<_, Option<i64>>(idx)?.map(Value::from),
        ColumnType::Real => row.get::<_, Option<f64>>(idx)?.map(Value::from),
        ColumnType::Boolean => row.get::<_, Option<i64>>(idx)?.map(|b| Value::Bool(b != 0)),
        ColumnType::Json => match row.get::<_, Option<String>>(idx)? {
            Some(text) => Some(serde_json::from_str(&text).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })?),
            None => None,
        },
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Pair each column of a row with its spec and SQL value.
fn bind(schema: &EntitySchema, row: &Row) -> Result<(Vec<&'static str>, Vec<SqlValue>)> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (column, value) in row {
        let spec = schema.column(column).ok_or_else(|| {
            StoreError::InvalidData(format!("unknown column `{}` for {}", column, schema.table))
        })?;
        columns.push(spec.column);
        values.push(to_sql(spec, value)?);
    }
    Ok((columns, values))
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn select(&self, schema: &'static EntitySchema) -> Result<Vec<Row>> {
        self.run(move |conn| {
            let columns: Vec<String> = schema.fields.iter().map(|f| quoted(f.column)).collect();
            let sql = format!(
                "SELECT {} FROM {} ORDER BY {}",
                columns.join(", "),
                quoted(schema.table),
                order_clause(schema.order)
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |r| {
                let mut row = Row::new();
                for (idx, spec) in schema.fields.iter().enumerate() {
                    row.insert(spec.column.to_string(), from_sql(r, idx, spec)?);
                }
                Ok(row)
            })?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            Ok(result)
        })
        .await
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()> {
        self.run(move |conn| {
            let (columns, mut values) = bind(schema, &row)?;
            values.push(SqlValue::Integer(now_millis()));

            let names: Vec<String> = columns
                .iter()
                .copied()
                .chain(std::iter::once(INSERTED_AT))
                .map(quoted)
                .collect();
            let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quoted(schema.table),
                names.join(", "),
                placeholders.join(", ")
            );

            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, schema: &'static EntitySchema, id: &RecordId, row: Row) -> Result<()> {
        let id = id.as_str().to_string();
        self.run(move |conn| {
            let (columns, mut values) = bind(schema, &row)?;
            if columns.is_empty() {
                return Ok(());
            }

            let assignments: Vec<String> = columns
                .iter()
                .enumerate()
                .map(|(i, column)| format!("{} = ?{}", quoted(column), i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE \"id\" = ?{}",
                quoted(schema.table),
                assignments.join(", "),
                columns.len() + 1
            );
            values.push(SqlValue::Text(id));

            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, schema: &'static EntitySchema, id: &RecordId) -> Result<()> {
        let id = id.as_str().to_string();
        self.run(move |conn| {
            let sql = format!("DELETE FROM {} WHERE \"id\" = ?1", quoted(schema.table));
            conn.execute(&sql, [id])?;
            Ok(())
        })
        .await
    }

    async fn exists_any(&self, schema: &'static EntitySchema) -> Result<bool> {
        self.run(move |conn| {
            let sql = format!("SELECT EXISTS (SELECT 1 FROM {})", quoted(schema.table));
            let exists: bool = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(exists)
        })
        .await
    }
}
