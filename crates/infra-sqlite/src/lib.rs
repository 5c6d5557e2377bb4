// relayq Infrastructure - SQLite Adapter
// Implements: QueueStore (Durable Store port)

mod connection;
mod store;

pub use connection::create_pool;
pub use store::SqliteQueueStore;

// Note: sqlx::Error conversion is handled by helper functions here
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for
// QueueError in this crate).
