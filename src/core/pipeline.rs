use crate::core::normalizer;
use crate::core::{
    Breakdown, ConfigProvider, Generator, LoadReport, Pipeline, ProjectRequest, ProjectStore,
    Storage,
};
use crate::utils::error::Result;
use crate::utils::export;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const BUNDLE_NAME: &str = "breakdown_bundle.zip";

/// One generation request end to end: generator call, normalization,
/// persistence plus export bundle.
pub struct BreakdownPipeline<G, S, R, C>
where
    G: Generator,
    S: Storage,
    R: ProjectStore,
    C: ConfigProvider,
{
    generator: G,
    storage: S,
    store: R,
    config: C,
    request: ProjectRequest,
}

impl<G, S, R, C> BreakdownPipeline<G, S, R, C>
where
    G: Generator,
    S: Storage,
    R: ProjectStore,
    C: ConfigProvider,
{
    pub fn new(generator: G, storage: S, store: R, config: C, request: ProjectRequest) -> Self {
        Self {
            generator,
            storage,
            store,
            config,
            request,
        }
    }
}

#[async_trait::async_trait]
impl<G, S, R, C> Pipeline for BreakdownPipeline<G, S, R, C>
where
    G: Generator,
    S: Storage,
    R: ProjectStore,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<String> {
        tracing::debug!(
            "Generating breakdown for '{}' ({} weeks, {})",
            self.request.name,
            self.request.duration_weeks,
            self.request.methodology
        );
        self.generator.generate(&self.request).await
    }

    async fn transform(&self, raw: &str) -> Result<Breakdown> {
        // Malformed generator output is not an error here; the normalizer
        // always produces a complete breakdown.
        Ok(normalizer::normalize(raw, self.request.duration_weeks))
    }

    async fn load(&self, raw_response: String, breakdown: Breakdown) -> Result<LoadReport> {
        let project_id = self.store.save(&self.request, &raw_response, &breakdown)?;
        tracing::debug!("Saved project #{}", project_id);

        let json_output = export::to_json(&breakdown)?;
        let csv_output = export::to_csv(&breakdown)?;
        let md_output = export::to_markdown(&breakdown);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("breakdown.json", FileOptions::default())?;
            zip.write_all(json_output.as_bytes())?;

            zip.start_file::<_, ()>("phases.csv", FileOptions::default())?;
            zip.write_all(csv_output.as_bytes())?;

            zip.start_file::<_, ()>("breakdown.md", FileOptions::default())?;
            zip.write_all(md_output.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing export bundle ({} bytes)", zip_data.len());
        self.storage.write_file(BUNDLE_NAME, &zip_data).await?;

        Ok(LoadReport {
            project_id,
            bundle_path: format!("{}/{}", self.config.output_path(), BUNDLE_NAME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalStorage, SessionStore};
    use crate::config::BackendConfig;
    use crate::domain::model::Methodology;
    use crate::utils::error::SdlcError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct CannedGenerator {
        reply: Option<String>,
    }

    impl Generator for CannedGenerator {
        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _request: &ProjectRequest) -> Result<String> {
            self.reply
                .clone()
                .ok_or_else(|| SdlcError::GeneratorError {
                    message: "canned failure".to_string(),
                })
        }
    }

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn request() -> ProjectRequest {
        ProjectRequest {
            name: "Task Manager".to_string(),
            description: "Web-based task tracking".to_string(),
            duration_weeks: 10,
            team_size: "4-10 (Medium)".to_string(),
            project_type: "Web Application".to_string(),
            methodology: Methodology::Agile,
        }
    }

    fn pipeline(
        reply: Option<String>,
        storage: MockStorage,
    ) -> BreakdownPipeline<CannedGenerator, MockStorage, SessionStore, BackendConfig> {
        BreakdownPipeline::new(
            CannedGenerator { reply },
            storage,
            SessionStore::in_memory(),
            BackendConfig::default(),
            request(),
        )
    }

    #[tokio::test]
    async fn transform_absorbs_prose_only_replies() {
        let storage = MockStorage::new();
        let pipeline = pipeline(Some("no structure here".to_string()), storage);
        let breakdown = pipeline.transform("no structure here").await.unwrap();
        assert_eq!(breakdown.phases.len(), 5);
        assert_eq!(breakdown.total_weeks(), 10);
    }

    #[tokio::test]
    async fn load_writes_bundle_with_three_formats() {
        let storage = MockStorage::new();
        let pipeline = pipeline(None, storage.clone());
        let breakdown = pipeline.transform("").await.unwrap();

        let report = pipeline
            .load("raw reply".to_string(), breakdown)
            .await
            .unwrap();
        assert_eq!(report.project_id, 1);
        assert!(report.bundle_path.ends_with(BUNDLE_NAME));

        let zip_data = storage.get_file(BUNDLE_NAME).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(archive.len(), 3);
        assert!(names.contains(&"breakdown.json".to_string()));
        assert!(names.contains(&"phases.csv".to_string()));
        assert!(names.contains(&"breakdown.md".to_string()));
    }

    #[tokio::test]
    async fn extract_propagates_generator_failure() {
        let storage = MockStorage::new();
        let pipeline = pipeline(None, storage);
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, SdlcError::GeneratorError { .. }));
    }

    #[tokio::test]
    async fn local_storage_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        storage.write_file("bundle.zip", b"data").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("bundle.zip")).unwrap(), b"data");
    }
}
