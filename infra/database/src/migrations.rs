use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

/// Schema scripts compiled into the binary, applied in order.
const BUILTIN: &[(&str, &str)] =
    &[("0001_catalog", include_str!("../migrations/0001_catalog.surql"))];

const LEDGER: &str = "
    DEFINE TABLE IF NOT EXISTS migration SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS checksum ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS applied_at ON migration TYPE datetime;
";

#[derive(Debug, Clone)]
pub(crate) struct Migration {
    pub version: &'static str,
    pub script: &'static str,
    pub checksum: String,
}

impl Migration {
    pub(crate) fn new(version: &'static str, script: &'static str) -> Self {
        Self { version, script, checksum: checksum(script) }
    }
}

/// SHA-256 of the script, hex encoded.
pub(crate) fn checksum(script: &str) -> String {
    hex::encode(Sha256::digest(script.as_bytes()))
}

pub(crate) fn builtin_migrations() -> Vec<Migration> {
    BUILTIN.iter().map(|(version, script)| Migration::new(version, script)).collect()
}

/// Versions applied and skipped by one [`MigrationRunner::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    version: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub(crate) const fn new(db: Surreal<Any>, migrations: Vec<Migration>) -> Self {
        Self { db, migrations }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(LEDGER)
            .await
            .context("Defining migration ledger")?
            .check()
            .context("Defining migration ledger")?;

        let applied = self.applied().await?;
        let mut report = MigrationReport::default();

        for migration in &self.migrations {
            if let Some(existing) = applied.get(migration.version) {
                ensure_checksum_match(migration, existing)?;
                report.skipped.push(migration.version.to_owned());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.version.to_owned());
        }

        Ok(report)
    }

    async fn applied(&self) -> Result<FxHashMap<String, String>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT record::id(id) AS version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries.into_iter().map(|entry| (entry.version, entry.checksum)).collect())
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE type::thing('migration', $version)
                CONTENT {{ checksum: $checksum, applied_at: time::now() }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script
        );

        self.db
            .query(query)
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum.clone()))
            .await
            .context(format!("Sending migration {}", migration.version))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                message: e.to_string().into(),
                context: Some(format!("Applying {}", migration.version).into()),
            })?;

        Ok(())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    if existing == migration.checksum {
        return Ok(());
    }
    Err(DatabaseError::Migration {
        message: format!(
            "Checksum mismatch for {} (recorded {existing}, embedded {})",
            migration.version, migration.checksum
        )
        .into(),
        context: Some("Applied migration was modified".into()),
    })
}
