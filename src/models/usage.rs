use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Generator,
    Editor,
    Format,
    Fashion,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Generator => "generator",
            Section::Editor => "editor",
            Section::Format => "format",
            Section::Fashion => "fashion",
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generator" => Ok(Section::Generator),
            "editor" => Ok(Section::Editor),
            "format" => Ok(Section::Format),
            "fashion" => Ok(Section::Fashion),
            other => Err(format!("unknown section: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub user_id: String,
    pub section: Section,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn now(user_id: impl Into<String>, section: Section) -> Self {
        Self {
            user_id: user_id.into(),
            section,
            timestamp: Utc::now(),
        }
    }
}

/// Event counts for the half-open range `[from, to)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStats {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total: u64,
    pub by_section: HashMap<Section, u64>,
    pub unique_users: u64,
}
