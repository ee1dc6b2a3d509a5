//! Backend for a Gemini image-generation studio.
//!
//! ```no_run
//! use genstudio::{AspectRatio, GeminiConfig, Studio};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let studio = Studio::new(&GeminiConfig::from_env())?;
//!     let data_url = studio
//!         .generate_image("a red boxing glove on white background", AspectRatio::Square, &[])
//!         .await?;
//!     println!("{} bytes of data URL", data_url.len());
//!     Ok(())
//! }
//! ```
//!
//! Features:
//! - `server`: actix-web HTTP endpoints and the `genstudio` binary
//! - `postgres`: PostgreSQL usage analytics store

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;
pub mod usage;

pub use config::{Config, GeminiConfig, PostgresConfig};
pub use error::{Result, StudioError};
pub use gemini::{GeminiClient, ModelBackend};
pub use models::{
    AspectRatio, GeneratedImage, GenerationRequest, InlineImage, PromptMode, Resolution, Section,
    UsageEvent, UsageStats, Workflow,
};
pub use studio::{EscalationPolicy, InvocationOutcome, ModelCandidate, ModelInvoker, Studio};
pub use usage::{MemoryUsageStore, UsageStore};
