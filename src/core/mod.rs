pub mod engine;
pub mod normalizer;
pub mod pipeline;

pub use crate::domain::model::{Breakdown, LoadReport, Phase, ProjectRequest};
pub use crate::domain::ports::{ConfigProvider, Generator, Pipeline, ProjectStore, Storage};
pub use crate::utils::error::Result;
