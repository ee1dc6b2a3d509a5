use crate::{
    config::PostgresConfig,
    error::{Result, StudioError},
    models::{Section, UsageEvent, UsageStats},
    usage::traits::UsageStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use std::collections::HashMap;
use tokio_postgres::NoTls;

pub struct PostgresUsageStore {
    pool: Pool,
}

impl PostgresUsageStore {
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = config.host;
        cfg.port = config.port;
        cfg.user = config.username;
        cfg.password = config.password;
        cfg.dbname = config.database;

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StudioError::Configuration(format!("Failed to create pool: {}", e)))?;

        let store = Self { pool };
        store.initialize_schema().await?;

        Ok(store)
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StudioError::Storage(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let client = self.client().await?;

        client
            .execute(
                "CREATE TABLE IF NOT EXISTS usage_events (
                id BIGSERIAL PRIMARY KEY,
                user_id TEXT NOT NULL,
                section TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
                &[],
            )
            .await
            .map_err(|e| {
                StudioError::Storage(format!("Failed to create usage_events table: {}", e))
            })?;

        client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_usage_events_created_at ON usage_events(created_at)",
                &[],
            )
            .await
            .map_err(|e| StudioError::Storage(format!("Failed to create usage index: {}", e)))?;

        log::info!("PostgreSQL usage schema initialized");
        Ok(())
    }
}

#[async_trait]
impl UsageStore for PostgresUsageStore {
    async fn record(&self, event: UsageEvent) -> Result<()> {
        let client = self.client().await?;

        client
            .execute(
                "INSERT INTO usage_events (user_id, section, created_at) VALUES ($1, $2, $3)",
                &[&event.user_id, &event.section.as_str(), &event.timestamp],
            )
            .await
            .map_err(|e| StudioError::Storage(format!("Failed to insert usage event: {}", e)))?;

        Ok(())
    }

    async fn stats(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<UsageStats> {
        let client = self.client().await?;

        let rows = client
            .query(
                "SELECT section, COUNT(*) AS events
             FROM usage_events
             WHERE created_at >= $1 AND created_at < $2
             GROUP BY section",
                &[&from, &to],
            )
            .await
            .map_err(|e| StudioError::Storage(format!("Failed to query usage stats: {}", e)))?;

        let mut by_section = HashMap::new();
        let mut total = 0u64;
        for row in rows {
            let section: String = row.get("section");
            let count: i64 = row.get("events");
            total += count as u64;
            match section.parse::<Section>() {
                Ok(section) => {
                    by_section.insert(section, count as u64);
                }
                Err(e) => log::warn!("Skipping usage rows: {}", e),
            }
        }

        let row = client
            .query_one(
                "SELECT COUNT(DISTINCT user_id) AS users
             FROM usage_events
             WHERE created_at >= $1 AND created_at < $2",
                &[&from, &to],
            )
            .await
            .map_err(|e| StudioError::Storage(format!("Failed to count users: {}", e)))?;
        let unique_users: i64 = row.get("users");

        Ok(UsageStats {
            from,
            to,
            total,
            by_section,
            unique_users: unique_users as u64,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let client = self.client().await?;
        Ok(client.simple_query("SELECT 1").await.is_ok())
    }
}
