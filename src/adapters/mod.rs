// Adapters layer: concrete implementations for external systems
// (generator backend, project store, output storage).

pub mod fs;
pub mod generator;
pub mod store;

pub use fs::LocalStorage;
pub use generator::{HttpGenerator, OfflineGenerator, SAMPLE_RESPONSE};
pub use store::SessionStore;
