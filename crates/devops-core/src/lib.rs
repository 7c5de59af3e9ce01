//! DevOps bot core - configuration and telemetry shared by all crates.
//!
//! - **config**: state directory layout, `.env` loading and [`BotConfig`]
//! - **telemetry**: fire-and-forget event sinks

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{
    config_dir, conversations_file, ensure_all_dirs, env_file, load_env, logs_dir,
    runtime_state_dir, state_dir, telemetry_file, BotConfig, OAuthSettings,
};
pub use error::{ConfigError, Result};
pub use telemetry::{FileTelemetry, NoopTelemetry, TelemetryEvent, TelemetrySink, TracingTelemetry};
