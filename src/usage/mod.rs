pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

use crate::{config::Config, error::Result};
use std::sync::Arc;

pub use memory::MemoryUsageStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresUsageStore;
pub use traits::UsageStore;

/// Picks the usage backend from config: Postgres when `USE_PSQL` is set,
/// otherwise the in-memory store. The chosen store is health-checked once.
pub async fn from_config(config: &Config) -> Result<Arc<dyn UsageStore>> {
    let store = build_store(config).await?;

    if store.health_check().await? {
        log::info!("Usage store is healthy");
    } else {
        log::warn!("Usage store failed its health check; usage events may be lost");
    }
    Ok(store)
}

async fn build_store(config: &Config) -> Result<Arc<dyn UsageStore>> {
    if config.use_psql {
        #[cfg(feature = "postgres")]
        {
            let postgres_config = config.postgres.clone().ok_or_else(|| {
                crate::error::StudioError::Configuration("PostgreSQL config required".into())
            })?;
            log::info!("Using PostgreSQL usage store");
            return Ok(Arc::new(PostgresUsageStore::new(postgres_config).await?));
        }
        #[cfg(not(feature = "postgres"))]
        {
            return Err(crate::error::StudioError::Configuration(
                "PostgreSQL feature not enabled".into(),
            ));
        }
    }

    log::info!("Using in-memory usage store");
    Ok(Arc::new(MemoryUsageStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_uses_memory_store() {
        let store = from_config(&Config::new()).await.unwrap();
        assert!(store.health_check().await.unwrap());

        let now = chrono::Utc::now();
        store
            .record(crate::models::UsageEvent::now("user-1", crate::models::Section::Editor))
            .await
            .unwrap();
        let stats = store
            .stats(now - chrono::Duration::minutes(1), now + chrono::Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(stats.total, 1);
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_psql_without_feature_is_configuration_error() {
        use crate::config::PostgresConfig;

        let config = Config::new().with_postgres(PostgresConfig::new());
        assert!(matches!(
            from_config(&config).await,
            Err(crate::error::StudioError::Configuration(_))
        ));
    }
}
