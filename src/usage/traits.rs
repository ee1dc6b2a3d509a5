use crate::{
    error::Result,
    models::{UsageEvent, UsageStats},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Append-only store for usage analytics.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn record(&self, event: UsageEvent) -> Result<()>;

    /// Aggregates events with `from <= timestamp < to`.
    async fn stats(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<UsageStats>;

    async fn health_check(&self) -> Result<bool>;
}
