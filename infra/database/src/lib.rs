//! # Database
//!
//! Opens the [SurrealDB](https://surrealdb.com) connection shared by the server and keeps
//! the catalog schema current.
//!
//! * Any engine the `any` connector understands: `mem://`, `ws://`, `http://`,
//!   `rocksdb://` (behind the `storage-rocksdb` feature).
//! * Startup health check with retries and exponential backoff.
//! * Optional root sign-in, then namespace/database selection.
//! * Embedded `.surql` migrations recorded in a `migration` table by version and SHA-256
//!   checksum; editing an applied script aborts startup.
//!
//! ```rust
//! use showroom_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder().url("mem://").session("showroom", "catalog").init().await?;
//!     let report = db.migrate().await?;
//!     assert_eq!(report.applied.len(), 0);
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::MigrationReport;

use migrations::{MigrationRunner, builtin_migrations};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_INITIAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

/// Cheaply clonable handle to an authenticated, session-bound connection.
///
/// Derefs to [`Surreal<Any>`] so callers run queries directly.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }

    /// Applies pending embedded migrations. Already applied versions are verified and
    /// skipped, so calling this again is a no-op.
    ///
    /// # Errors
    /// [`DatabaseError::Migration`] on a failing script or a checksum mismatch.
    pub async fn migrate(&self) -> Result<MigrationReport, DatabaseError> {
        MigrationRunner::new(self.inner.instance.clone(), builtin_migrations()).run().await
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl DatabaseBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Root credentials; leave unset for unauthenticated engines such as `mem://`.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Connects, waits for the engine to report healthy, signs in and selects the session.
    /// Migrations run on every successful init.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] when url, namespace or database is missing.
    /// * [`DatabaseError::Connection`] when the engine cannot start or stays unhealthy.
    /// * [`DatabaseError::Auth`] when root credentials are rejected.
    /// * [`DatabaseError::Migration`] when the schema cannot be brought up to date.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL is required")?;
        let ns = required(self.ns, "Namespace is required")?;
        let db = required(self.db, "Database is required")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        wait_healthy(&instance, &url).await?;

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username: &username, password: &password }).await.map_err(
                |e| DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) },
            )?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        let database = Database { inner: Arc::new(DatabaseInner { instance, ns, db }) };

        let report = database.migrate().await?;
        for version in &report.skipped {
            debug!(version, "Migration already applied");
        }
        for version in &report.applied {
            info!(version, "Applied migration");
        }

        Ok(database)
    }
}

fn required(value: Option<String>, message: &'static str) -> Result<String, DatabaseError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(DatabaseError::Validation { message: message.into(), context: None })
}

async fn wait_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = HEALTH_INITIAL_DELAY;
    for attempt in 1..=HEALTH_ATTEMPTS {
        if instance.health().await.is_ok() {
            return Ok(());
        }
        if attempt < HEALTH_ATTEMPTS {
            warn!(attempt, ?delay, "Database not ready, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
    Err(DatabaseError::Connection {
        message: "Unhealthy after retries".into(),
        context: Some(url.to_owned().into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::Migration;

    #[tokio::test]
    async fn edited_migration_aborts() {
        let db = Database::builder().url("mem://").session("t", "drift").init().await.unwrap();

        let original = vec![Migration::new("0100_probe", "DEFINE TABLE IF NOT EXISTS probe;")];
        let report = MigrationRunner::new((*db).clone(), original).run().await.unwrap();
        assert_eq!(report.applied, vec!["0100_probe".to_owned()]);

        let edited = vec![Migration::new("0100_probe", "DEFINE TABLE IF NOT EXISTS probe2;")];
        let err = MigrationRunner::new((*db).clone(), edited).run().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[tokio::test]
    async fn failing_script_is_not_recorded() {
        let db = Database::builder().url("mem://").session("t", "broken").init().await.unwrap();

        let broken = vec![Migration::new("0100_broken", "THIS IS NOT SURREALQL;")];
        let err = MigrationRunner::new((*db).clone(), broken).run().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. } | DatabaseError::Surreal { .. }));

        let recorded: Option<u64> = db
            .query("RETURN count(SELECT VALUE id FROM migration WHERE record::id(id) = '0100_broken')")
            .await
            .unwrap()
            .take(0)
            .unwrap();
        assert_eq!(recorded, Some(0));
    }
}
