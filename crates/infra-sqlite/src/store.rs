// SQLite QueueStore Implementation
// One table per queue name; all reads are either full ordered scans or
// single-row oldest operations, so no secondary indexes are needed.

use async_trait::async_trait;
use relayq_core::domain::StoredEntry;
use relayq_core::port::QueueStore;
use relayq_core::{QueueError, Result};
use sqlx::SqlitePool;
use tracing::error;

/// Queue names become table names, so keep them to identifier characters.
const MAX_QUEUE_NAME_LEN: usize = 64;

// Helper to convert sqlx::Error to a structured message for logging
fn describe_sqlx_error(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code.as_ref() {
                    "5" => format!("database locked (SQLITE_BUSY): {}", db_err.message()),
                    "13" => format!("database full: {}", db_err.message()),
                    _ => format!("database error [{}]: {}", code, db_err.message()),
                }
            } else {
                format!("database error: {}", db_err.message())
            }
        }
        sqlx::Error::RowNotFound => "row not found".to_string(),
        _ => err.to_string(),
    }
}

fn validate_queue_name(queue_name: &str) -> Result<()> {
    let valid = !queue_name.is_empty()
        && queue_name.len() <= MAX_QUEUE_NAME_LEN
        && queue_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !queue_name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(QueueError::InvalidQueueName(queue_name.to_string()))
    }
}

/// Durable Store over an embedded SQLite table.
///
/// Storage failures past `open` are absorbed here: logged and converted to
/// a benign default, never propagated to the queue. Losing a write is less
/// harmful than crashing the host process.
pub struct SqliteQueueStore {
    pool: SqlitePool,
    queue: String,
    table: String,
}

impl SqliteQueueStore {
    /// Validate the queue name and create its backing table if missing.
    pub async fn open(pool: SqlitePool, queue_name: &str) -> Result<Self> {
        validate_queue_name(queue_name)?;
        let table = format!("queue_{}", queue_name);

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts INTEGER NOT NULL,
                payload TEXT NOT NULL
            )
            "#
        ))
        .execute(&pool)
        .await
        .map_err(|e| QueueError::Storage(describe_sqlx_error(&e)))?;

        Ok(Self {
            pool,
            queue: queue_name.to_string(),
            table,
        })
    }

    async fn try_insert(&self, timestamp: i64, payload: &str) -> sqlx::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (ts, payload) VALUES (?, ?)",
            self.table
        ))
        .bind(timestamp)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_count(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await
    }

    async fn try_ordered_scan(&self) -> sqlx::Result<Vec<StoredEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            "SELECT id, ts, payload FROM {} ORDER BY ts ASC, id ASC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn try_peek_oldest(&self) -> sqlx::Result<Option<StoredEntry>> {
        let row: Option<EntryRow> = sqlx::query_as(&format!(
            "SELECT id, ts, payload FROM {} ORDER BY ts ASC, id ASC LIMIT 1",
            self.table
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(EntryRow::into_entry))
    }

    async fn try_remove_oldest(&self) -> sqlx::Result<()> {
        sqlx::query(&format!(
            "DELETE FROM {t} WHERE id = (SELECT id FROM {t} ORDER BY ts ASC, id ASC LIMIT 1)",
            t = self.table
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_clear(&self) -> sqlx::Result<()> {
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn absorb<T>(&self, op: &'static str, result: sqlx::Result<T>, default: T) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(
                    queue = %self.queue,
                    op,
                    error = %describe_sqlx_error(&e),
                    "storage operation failed; using benign default"
                );
                default
            }
        }
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn insert(&self, timestamp: i64, payload: &str) {
        let result = self.try_insert(timestamp, payload).await;
        self.absorb("insert", result, ());
    }

    async fn count(&self) -> i64 {
        let result = self.try_count().await;
        self.absorb("count", result, 0)
    }

    async fn ordered_scan(&self) -> Vec<StoredEntry> {
        let result = self.try_ordered_scan().await;
        self.absorb("ordered_scan", result, Vec::new())
    }

    async fn peek_oldest(&self) -> Option<StoredEntry> {
        let result = self.try_peek_oldest().await;
        self.absorb("peek_oldest", result, None)
    }

    async fn remove_oldest(&self) {
        let result = self.try_remove_oldest().await;
        self.absorb("remove_oldest", result, ());
    }

    async fn clear(&self) {
        let result = self.try_clear().await;
        self.absorb("clear", result, ());
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: i64,
    ts: i64,
    payload: String,
}

impl EntryRow {
    fn into_entry(self) -> StoredEntry {
        StoredEntry {
            id: self.id,
            timestamp: self.ts,
            payload: self.payload,
        }
    }
}
