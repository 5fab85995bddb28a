//! Domain model and configuration for the voicelog analytics engine.
//!
//! Posts, metric snapshots and the corpus snapshot the engine consumes live
//! here, together with the reference vocabularies and env-driven config.

pub mod app_config;
pub mod config;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod posts;
pub mod vocabulary;

pub use app_config::{AnalyticsConfig, AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use corpus::Corpus;
pub use error::{ConfigError, CoreError};
pub use metrics::{latest_snapshot, MetricSnapshot};
pub use posts::{MediaType, Post, PublishLink, UNTITLED_TOPIC};
pub use vocabulary::{load_vocabulary, parse_vocabulary, Vocabulary};
