use crate::domain::model::{
    AnalyticsReport, Breakdown, LoadReport, ProjectHit, ProjectRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Text-generation backend. The returned text *should* contain a structured
/// breakdown but is not guaranteed to; the normalizer copes with anything.
pub trait Generator: Send + Sync {
    /// False when credentials are missing; callers surface this as a
    /// blocking configuration error before any request is made.
    fn is_configured(&self) -> bool;

    fn generate(
        &self,
        request: &ProjectRequest,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Write seam for pipeline output files.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Project persistence. Passed explicitly to whatever owns a session;
/// never ambient state.
pub trait ProjectStore: Send + Sync {
    fn save(
        &self,
        request: &ProjectRequest,
        raw_response: &str,
        breakdown: &Breakdown,
    ) -> Result<u64>;
    fn recent(&self, limit: usize) -> Result<Vec<ProjectHit>>;
    fn search(&self, query: &str, limit: usize) -> Result<Vec<ProjectHit>>;
    fn breakdown_for(&self, id: u64) -> Result<Option<Breakdown>>;
    fn analytics(&self) -> Result<AnalyticsReport>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn model_id(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_secs(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Call the generator and return its raw text reply.
    async fn extract(&self) -> Result<String>;
    /// Normalize raw text into a complete breakdown. Never fails on
    /// malformed text; only infrastructure errors escape.
    async fn transform(&self, raw: &str) -> Result<Breakdown>;
    /// Persist the result and write the export bundle.
    async fn load(&self, raw_response: String, breakdown: Breakdown) -> Result<LoadReport>;
}
