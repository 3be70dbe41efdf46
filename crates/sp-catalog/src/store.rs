//! Catalog storage — CSV fixture loaded into a SQLite table.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::CatalogResult;

/// One row of the CSV fixture. Price is nullable — offerings without an
/// on-demand price exist in the dataset but are never recommended.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    api_name: String,
    vcpus: i64,
    memory_gb: f64,
    on_demand_usd: Option<f64>,
}

/// Open (creating if missing) the catalog database with a bounded pool.
pub async fn connect(db_path: &Path, max_connections: u32) -> CatalogResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Load the CSV fixture into the `instance_catalog` table, replacing any
/// previous contents. Returns the number of rows loaded.
pub async fn load_catalog(pool: &SqlitePool, csv_path: &Path) -> CatalogResult<usize> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: CatalogRecord = result?;
        records.push(record);
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS instance_catalog")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "CREATE TABLE instance_catalog (
             api_name TEXT NOT NULL,
             vcpus INTEGER NOT NULL,
             memory_gb REAL NOT NULL,
             on_demand_usd REAL
         )",
    )
    .execute(&mut *tx)
    .await?;
    for record in &records {
        sqlx::query(
            "INSERT INTO instance_catalog (api_name, vcpus, memory_gb, on_demand_usd)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.api_name)
        .bind(record.vcpus)
        .bind(record.memory_gb)
        .bind(record.on_demand_usd)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(rows = records.len(), csv = %csv_path.display(), "instance catalog loaded");
    Ok(records.len())
}
