use crate::core::{Breakdown, LoadReport, Pipeline};
use crate::utils::error::Result;

/// Drives one generation request through the pipeline stages.
pub struct Engine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> Engine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<(Breakdown, LoadReport)> {
        tracing::info!("Requesting breakdown from generator...");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Received {} bytes of generator output", raw.len());

        tracing::info!("Normalizing breakdown...");
        let breakdown = self.pipeline.transform(&raw).await?;
        tracing::info!(
            "Normalized {} phases over {} weeks",
            breakdown.phases.len(),
            breakdown.total_weeks()
        );

        tracing::info!("Saving and exporting...");
        let report = self.pipeline.load(raw, breakdown.clone()).await?;
        tracing::info!("Export bundle written to: {}", report.bundle_path);

        Ok((breakdown, report))
    }
}
