use diesel::connection::SimpleConnection;
use diesel::r2d2::ConnectionManager;
use diesel::sqlite::SqliteConnection;
use r2d2::{CustomizeConnection, Pool};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection SQLite settings applied when the pool opens a connection
///
/// Cascading deletes rely on `foreign_keys`, which SQLite tracks per
/// connection rather than per database file.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self { busy_timeout_ms: 5000 }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool for the given SQLite URL
pub fn init_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}
