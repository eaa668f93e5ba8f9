use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;

use crate::AppHubResult;

use super::alias::{AliasSource, RandomAlias};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the app hub storage.
///
/// The schema (tables `app`, `version`, `package` and the `simple_app` /
/// `detail_version` views) is provisioned by an external migration step;
/// the handle assumes it is already in place.
pub struct Database {
    pub conn: Arc<Mutex<Connection>>,
    pub(crate) aliases: Mutex<Box<dyn AliasSource>>,
}

impl Database {
    /// Opens the database file with foreign keys enforced.
    pub fn new<P: AsRef<Path>>(path: P) -> AppHubResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Database {
            conn: Arc::new(Mutex::new(conn)),
            aliases: Mutex::new(Box::new(RandomAlias::default())),
        }
    }

    /// Replaces the alias source. Tests use this to script alias
    /// generation.
    pub fn with_alias_source(self, source: Box<dyn AliasSource>) -> Self {
        Database {
            aliases: Mutex::new(source),
            ..self
        }
    }
}
