pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command, ExportFormat, GenerateArgs};

pub use crate::adapters::{HttpGenerator, LocalStorage, OfflineGenerator, SessionStore};
pub use crate::config::BackendConfig;
pub use crate::core::{engine::Engine, normalizer, pipeline::BreakdownPipeline};
pub use crate::domain::model::{Breakdown, Methodology, Phase, ProjectRequest};
pub use crate::utils::error::{Result, SdlcError};
