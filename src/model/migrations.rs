/// Custom SQL migration toolkit. The code is implicitly tested by the other model codebase.
use std::borrow::Cow;
use std::str;

use anyhow::{anyhow, bail, ensure, Context};
use rust_embed::RustEmbed;
use sqlx::{Connection, Executor, PgConnection, PgPool, Postgres};
use tracing::{info, warn};

use crate::Result;

#[derive(RustEmbed)]
#[folder = "src/model/migrations/"]
struct MigrationFiles;

/// Brings the schema of `db_name` up to date. Creates the database if it doesn't exist yet.
/// `db_url` is the connection string of the server without a database name.
pub async fn apply(db_url: &str, db_name: &str) -> Result<()> {
    let migrator = Migrator {
        db_url: db_url.to_string(),
        db_name: db_name.to_string(),
    };

    if !migrator.database_exists().await? {
        migrator.create_database().await?;
    }
    migrator.create_migration_table().await?;

    info!("Checking lineage of the migration lists");
    let mut new_migrations: Vec<Cow<'static, str>> = MigrationFiles::iter().collect();
    let mut applied_migrations = migrator.get_migrations().await?;

    new_migrations.sort();
    applied_migrations.sort();

    ensure!(
        applied_migrations.len() <= new_migrations.len(),
        "New migration list is smaller than applied migration list"
    );

    // Make sure that we are in the same lineage with the migrations.
    for (i, a_migration) in applied_migrations.iter().enumerate() {
        match new_migrations.get(i) {
            Some(n_migration) => ensure!(
                a_migration == n_migration,
                "Applied migration can't be found in the expected lineage location in new migration list: {}",
                a_migration
            ),
            None => bail!("Can't find new migration on position: {}", i),
        }
    }

    let pool = PgPool::connect(&format!("{}/{}", db_url, db_name)).await?;
    for migration_file_name in new_migrations.iter().skip(applied_migrations.len()) {
        info!("Applying migration: {}", migration_file_name);
        let file = MigrationFiles::get(migration_file_name)
            .ok_or_else(|| anyhow!("Migration file {} vanished", migration_file_name))?;
        let migration_sql = str::from_utf8(&file.data)?;

        let mut migration = Migration {
            transaction: pool.begin().await?,
        };
        match apply_migration_file(migration_file_name, migration_sql, &mut migration).await {
            Ok(..) => {
                migration.commit().await?;
            }
            Err(e) => {
                migration.rollback().await?;
                bail!(
                    "Failed to apply migration file {}: {}",
                    migration_file_name,
                    e
                );
            }
        }
    }
    pool.close().await;

    Ok(())
}

async fn apply_migration_file(
    migration_file_name: &str,
    migration_sql: &str,
    migration: &mut Migration,
) -> Result<()> {
    let (version, migration_name) = parse_migration_version_name(migration_file_name)?;
    if !migration.is_applied(version, &migration_name).await? {
        migration.execute_migration(migration_sql).await?;
        migration
            .save_applied_migration(version, &migration_name)
            .await?;
    } else {
        warn!("Migration {} is already applied!", migration_file_name);
    }
    Ok(())
}

fn parse_migration_version_name(migration_file_name: &str) -> Result<(i64, String)> {
    let split: Vec<&str> = migration_file_name.split("__").collect();
    ensure!(split.len() == 2, "Incompatible migration file name. Needs to be: %VERSION_NUMBER%__%MIGRATION_NAME_STRING%.sql");
    let version: i64 = split[0]
        .parse()
        .context("VERSION_NUMBER is not a valid i64")?;
    let migration_name = split[1];

    Ok((version, migration_name.to_string()))
}

struct Migrator {
    db_url: String,
    db_name: String,
}

impl Migrator {
    async fn create_database(&self) -> Result<()> {
        let mut conn = PgConnection::connect(&format!("{}/postgres", self.db_url)).await?;

        info!("Creating database {}", &self.db_name);
        sqlx::query(&format!(r#"CREATE DATABASE "{}""#, &self.db_name))
            .execute(&mut conn)
            .await
            .with_context(|| format!("Failed to create database: {}", &self.db_name))?;

        Ok(())
    }

    async fn create_migration_table(&self) -> Result<()> {
        let mut conn = PgConnection::connect(&format!("{}/{}", self.db_url, self.db_name)).await?;

        info!("Checking for migration table");
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS "migration" (
                    "version" BIGINT PRIMARY KEY,
                    "name" TEXT NOT NULL,
                    "created_at" TIMESTAMP WITH TIME ZONE DEFAULT current_timestamp
                );"#,
        )
        .execute(&mut conn)
        .await
        .context("Failed to create migration table")?;

        Ok(())
    }

    async fn database_exists(&self) -> Result<bool> {
        let mut conn = PgConnection::connect(&format!("{}/postgres", self.db_url)).await?;

        info!("Checking if database {} exists", &self.db_name);
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM "pg_database" WHERE "datname" = $1)"#)
                .bind(&self.db_name)
                .fetch_one(&mut conn)
                .await
                .context("Failed to check if database exists")?;
        Ok(exists)
    }

    async fn get_migrations(&self) -> Result<Vec<String>> {
        let mut conn = PgConnection::connect(&format!("{}/{}", self.db_url, self.db_name)).await?;

        let rows: Vec<(i64, String)> =
            sqlx::query_as(r#"SELECT "version", "name" FROM "migration" ORDER BY "version""#)
                .fetch_all(&mut conn)
                .await
                .context("Failed to query migration table")?;

        // Version numbers are zero padded to four digits inside the file names.
        Ok(rows
            .into_iter()
            .map(|(version, migration_name)| format!("{:04}__{}", version, migration_name))
            .collect())
    }
}

struct Migration {
    transaction: sqlx::Transaction<'static, Postgres>,
}

impl Migration {
    async fn commit(self) -> Result<()> {
        self.transaction.commit().await?;

        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.transaction.rollback().await?;

        Ok(())
    }

    async fn is_applied(&mut self, version: i64, migration_name: &str) -> Result<bool> {
        let (applied,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM "migration" WHERE "version"= $1 AND "name" = $2)"#,
        )
        .bind(version)
        .bind(migration_name)
        .fetch_one(&mut *self.transaction)
        .await
        .context("Failed to check migration table")?;
        Ok(applied)
    }

    async fn execute_migration(&mut self, migration_sql: &str) -> Result<()> {
        (&mut *self.transaction).execute(migration_sql).await?;

        Ok(())
    }

    async fn save_applied_migration(&mut self, version: i64, migration_name: &str) -> Result<()> {
        sqlx::query(r#"INSERT INTO "migration" VALUES ($1, $2, DEFAULT)"#)
            .bind(version)
            .bind(migration_name)
            .execute(&mut *self.transaction)
            .await
            .context("Failed to insert migration")?;

        Ok(())
    }
}
