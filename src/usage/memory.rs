use crate::{
    error::Result,
    models::{UsageEvent, UsageStats},
    usage::traits::UsageStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Process-local usage store. Events are lost on restart.
#[derive(Default)]
pub struct MemoryUsageStore {
    events: RwLock<Vec<UsageEvent>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn record(&self, event: UsageEvent) -> Result<()> {
        log::debug!(
            "Recording usage: user={} section={}",
            event.user_id,
            event.section.as_str()
        );
        self.events.write().await.push(event);
        Ok(())
    }

    async fn stats(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<UsageStats> {
        let events = self.events.read().await;

        let mut by_section = HashMap::new();
        let mut users = HashSet::new();
        let mut total = 0u64;
        for event in events
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp < to)
        {
            total += 1;
            *by_section.entry(event.section).or_insert(0u64) += 1;
            users.insert(event.user_id.as_str());
        }

        Ok(UsageStats {
            from,
            to,
            total,
            by_section,
            unique_users: users.len() as u64,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;
    use chrono::{Duration, TimeZone};

    fn event(user: &str, section: Section, hour: u32) -> UsageEvent {
        UsageEvent {
            user_id: user.to_string(),
            section,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_stats_aggregate_within_range() {
        let store = MemoryUsageStore::new();
        store.record(event("alice", Section::Generator, 9)).await.unwrap();
        store.record(event("alice", Section::Editor, 10)).await.unwrap();
        store.record(event("bob", Section::Generator, 11)).await.unwrap();
        store.record(event("carol", Section::Format, 15)).await.unwrap();
        assert_eq!(store.len().await, 4);

        let from = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let stats = store.stats(from, from + Duration::hours(6)).await.unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.unique_users, 2);
        assert_eq!(stats.by_section.get(&Section::Generator), Some(&2));
        assert_eq!(stats.by_section.get(&Section::Editor), Some(&1));
        assert_eq!(stats.by_section.get(&Section::Format), None);
    }

    #[tokio::test]
    async fn test_empty_range() {
        let store = MemoryUsageStore::new();
        store.record(UsageEvent::now("dave", Section::Fashion)).await.unwrap();

        let to = Utc::now() - Duration::days(1);
        let stats = store.stats(to - Duration::days(1), to).await.unwrap();
        assert_eq!(stats.total, 0);
        assert!(stats.by_section.is_empty());
        assert!(store.health_check().await.unwrap());
    }
}
