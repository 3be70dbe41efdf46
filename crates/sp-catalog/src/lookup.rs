//! Cheapest-instance lookup over the loaded catalog.

use sqlx::SqlitePool;

use crate::error::CatalogResult;

/// CPU floor applied when the user names only a RAM requirement.
pub const DEFAULT_CPU: i64 = 2;

/// RAM floor (GB) applied when the user names only a CPU requirement.
pub const DEFAULT_RAM_GB: f64 = 8.0;

/// A priced instance offering from the catalog.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct InstanceOffer {
    pub api_name: String,
    pub vcpus: i64,
    pub memory_gb: f64,
    pub on_demand_usd: f64,
}

/// Outcome of a best-fit lookup. A miss is a normal result carrying a
/// user-presentable message, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum BestInstance {
    Found(InstanceOffer),
    NoMatch { message: String },
}

/// Find the cheapest priced instance meeting both floors.
///
/// Omitted constraints take [`DEFAULT_CPU`] / [`DEFAULT_RAM_GB`] so a user
/// may name just one of them.
pub async fn find_best_instance(
    pool: &SqlitePool,
    cpu: Option<i64>,
    ram_gb: Option<f64>,
) -> CatalogResult<BestInstance> {
    let cpu = cpu.unwrap_or(DEFAULT_CPU);
    let ram_gb = ram_gb.unwrap_or(DEFAULT_RAM_GB);

    let row: Option<InstanceOffer> = sqlx::query_as(
        "SELECT api_name, vcpus, memory_gb, on_demand_usd
         FROM instance_catalog
         WHERE vcpus >= ? AND memory_gb >= ? AND on_demand_usd IS NOT NULL
         ORDER BY on_demand_usd ASC
         LIMIT 1",
    )
    .bind(cpu)
    .bind(ram_gb)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some(offer) => {
            tracing::info!(cpu, ram_gb, instance = %offer.api_name, "catalog lookup hit");
            BestInstance::Found(offer)
        }
        None => {
            tracing::info!(cpu, ram_gb, "catalog lookup miss");
            BestInstance::NoMatch {
                message: format!(
                    "No instance found with CPU >= {cpu}, RAM >= {ram_gb} GB. Please adjust the requirements."
                ),
            }
        }
    })
}
