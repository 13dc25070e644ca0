use crate::core::ProjectStore;
use crate::domain::model::{
    AnalyticsReport, Breakdown, ProjectHit, ProjectRecord, ProjectRequest,
};
use crate::utils::error::{Result, SdlcError};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Explicit, lifetime-scoped project store. Owned by whatever handles a
/// session and passed where needed; nothing here is ambient state.
///
/// `in_memory` keeps records for the lifetime of the value (tests, demo);
/// `with_file` additionally loads from and persists to a JSON file so CLI
/// runs can see earlier projects.
pub struct SessionStore {
    inner: Mutex<Inner>,
    backing_file: Option<PathBuf>,
}

#[derive(Default)]
struct Inner {
    records: Vec<ProjectRecord>,
    next_id: u64,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                next_id: 1,
            }),
            backing_file: None,
        }
    }

    pub fn with_file(path: PathBuf) -> Result<Self> {
        let records: Vec<ProjectRecord> = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data).map_err(|e| SdlcError::StorageError {
                message: format!("Project file {} is corrupt: {}", path.display(), e),
            })?
        } else {
            Vec::new()
        };

        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Ok(Self {
            inner: Mutex::new(Inner { records, next_id }),
            backing_file: Some(path),
        })
    }

    fn persist(&self, inner: &Inner) -> Result<()> {
        if let Some(path) = &self.backing_file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let data = serde_json::to_string_pretty(&inner.records)?;
            std::fs::write(path, data)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| SdlcError::StorageError {
            message: "Project store lock poisoned".to_string(),
        })
    }
}

fn preview(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

fn hit(record: &ProjectRecord) -> ProjectHit {
    ProjectHit {
        id: record.id,
        name: record.request.name.clone(),
        description: preview(&record.request.description),
        project_type: record.request.project_type.clone(),
        methodology: record.request.methodology.to_string(),
        duration_weeks: record.request.duration_weeks,
        team_size: record.request.team_size.clone(),
        total_phases: record.breakdown.phases.len(),
        created_at: record.created_at,
    }
}

impl ProjectStore for SessionStore {
    fn save(
        &self,
        request: &ProjectRequest,
        raw_response: &str,
        breakdown: &Breakdown,
    ) -> Result<u64> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.records.push(ProjectRecord {
            id,
            request: request.clone(),
            raw_response: raw_response.to_string(),
            breakdown: breakdown.clone(),
            created_at: Utc::now(),
        });
        self.persist(&inner)?;
        Ok(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ProjectHit>> {
        let inner = self.lock()?;
        Ok(inner.records.iter().rev().take(limit).map(hit).collect())
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<ProjectHit>> {
        let needle = query.to_lowercase();
        let inner = self.lock()?;
        Ok(inner
            .records
            .iter()
            .rev()
            .filter(|r| {
                r.request.name.to_lowercase().contains(&needle)
                    || r.request.description.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(hit)
            .collect())
    }

    fn breakdown_for(&self, id: u64) -> Result<Option<Breakdown>> {
        let inner = self.lock()?;
        Ok(inner
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.breakdown.clone()))
    }

    fn analytics(&self) -> Result<AnalyticsReport> {
        let inner = self.lock()?;

        let mut methodology_distribution: HashMap<String, usize> = HashMap::new();
        let mut project_type_distribution: HashMap<String, usize> = HashMap::new();
        let mut duration_sums: HashMap<String, (u64, usize)> = HashMap::new();

        for record in &inner.records {
            *methodology_distribution
                .entry(record.request.methodology.to_string())
                .or_default() += 1;
            *project_type_distribution
                .entry(record.request.project_type.clone())
                .or_default() += 1;
            let entry = duration_sums
                .entry(record.request.project_type.clone())
                .or_insert((0, 0));
            entry.0 += u64::from(record.request.duration_weeks);
            entry.1 += 1;
        }

        let average_duration_by_type = duration_sums
            .into_iter()
            .map(|(project_type, (total, count))| (project_type, total as f64 / count as f64))
            .collect();

        Ok(AnalyticsReport {
            total_projects: inner.records.len(),
            total_breakdowns: inner.records.len(),
            methodology_distribution,
            project_type_distribution,
            average_duration_by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use crate::domain::model::Methodology;

    fn request(name: &str, project_type: &str, weeks: u32) -> ProjectRequest {
        ProjectRequest {
            name: name.to_string(),
            description: format!("{} built for the web", name),
            duration_weeks: weeks,
            team_size: "4-10 (Medium)".to_string(),
            project_type: project_type.to_string(),
            methodology: Methodology::Agile,
        }
    }

    fn seeded_store() -> SessionStore {
        let store = SessionStore::in_memory();
        for (name, kind, weeks) in [
            ("Invoice Portal", "Web Application", 12),
            ("Billing API", "API Service", 8),
            ("Ledger API", "API Service", 16),
        ] {
            let breakdown = normalize("", weeks);
            store
                .save(&request(name, kind, weeks), "raw", &breakdown)
                .unwrap();
        }
        store
    }

    #[test]
    fn save_assigns_sequential_ids() {
        let store = seeded_store();
        let breakdown = normalize("", 4);
        let id = store
            .save(&request("Next", "Web Application", 4), "raw", &breakdown)
            .unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn recent_returns_newest_first() {
        let store = seeded_store();
        let hits = store.recent(2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Ledger API");
        assert_eq!(hits[1].name, "Billing API");
        assert_eq!(hits[0].total_phases, 5);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let store = seeded_store();
        let hits = store.search("ledger", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ledger API");

        let hits = store.search("WEB", 10).unwrap();
        assert_eq!(hits.len(), 3); // every description mentions the web
    }

    #[test]
    fn long_descriptions_are_truncated_in_hits() {
        let store = SessionStore::in_memory();
        let mut req = request("Big", "Web Application", 6);
        req.description = "x".repeat(400);
        let breakdown = normalize("", 6);
        store.save(&req, "raw", &breakdown).unwrap();

        let hits = store.recent(1).unwrap();
        assert_eq!(hits[0].description.chars().count(), 203);
        assert!(hits[0].description.ends_with("..."));
    }

    #[test]
    fn analytics_aggregates_counts_and_averages() {
        let store = seeded_store();
        let report = store.analytics().unwrap();
        assert_eq!(report.total_projects, 3);
        assert_eq!(report.total_breakdowns, 3);
        assert_eq!(report.methodology_distribution["Agile"], 3);
        assert_eq!(report.project_type_distribution["API Service"], 2);
        assert!((report.average_duration_by_type["API Service"] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("projects.json");

        {
            let store = SessionStore::with_file(path.clone()).unwrap();
            let breakdown = normalize("", 10);
            store
                .save(&request("Persisted", "Web Application", 10), "raw", &breakdown)
                .unwrap();
        }

        let store = SessionStore::with_file(path).unwrap();
        let hits = store.recent(10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Persisted");
        assert_eq!(hits[0].id, 1);

        let breakdown = store.breakdown_for(1).unwrap().unwrap();
        assert_eq!(breakdown.phases.len(), 5);
    }

    #[test]
    fn breakdown_for_unknown_id_is_none() {
        let store = seeded_store();
        assert!(store.breakdown_for(99).unwrap().is_none());
    }
}
