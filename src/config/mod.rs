#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command, ExportFormat, GenerateArgs};
pub use toml_config::BackendConfig;
