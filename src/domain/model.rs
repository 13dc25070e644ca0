use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Development methodology requested for the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Methodology {
    Agile,
    Waterfall,
    Hybrid,
    #[cfg_attr(feature = "cli", value(name = "devops-focused"))]
    #[serde(rename = "DevOps-focused")]
    DevOpsFocused,
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Methodology::Agile => write!(f, "Agile"),
            Methodology::Waterfall => write!(f, "Waterfall"),
            Methodology::Hybrid => write!(f, "Hybrid"),
            Methodology::DevOpsFocused => write!(f, "DevOps-focused"),
        }
    }
}

/// User input describing the project to break down. Immutable once built;
/// discarded after the generation request completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
    pub duration_weeks: u32,
    pub team_size: String,
    pub project_type: String,
    pub methodology: Methodology,
}

/// One stage of the schedule. `percentage` is always recomputed from
/// `duration_weeks` against the actual total; it is never taken from
/// generator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub duration_weeks: u32,
    pub percentage: f64,
    pub description: String,
    pub deliverables: Vec<String>,
    pub activities: Vec<String>,
    pub team_focus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub total_duration_weeks: u32,
    pub methodology: String,
    pub complexity_assessment: String,
}

/// The full normalized schedule. Built once by the normalizer and never
/// mutated afterwards; re-generation produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub project_summary: ProjectSummary,
    pub phases: Vec<Phase>,
    pub recommendations: Vec<String>,
}

impl Breakdown {
    /// Sum of phase durations after normalization. Can differ from the
    /// requested target on the proportional-rescale path (documented drift).
    pub fn total_weeks(&self) -> u32 {
        self.phases.iter().map(|p| p.duration_weeks).sum()
    }
}

/// A stored project with its breakdown, keyed by an id the store assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    pub request: ProjectRequest,
    pub raw_response: String,
    pub breakdown: Breakdown,
    pub created_at: DateTime<Utc>,
}

/// History / search row: enough to list a project without loading the
/// full breakdown. Descriptions are truncated by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectHit {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub project_type: String,
    pub methodology: String,
    pub duration_weeks: u32,
    pub team_size: String,
    pub total_phases: usize,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts for the reporting view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_projects: usize,
    pub total_breakdowns: usize,
    pub methodology_distribution: HashMap<String, usize>,
    pub project_type_distribution: HashMap<String, usize>,
    pub average_duration_by_type: HashMap<String, f64>,
}

/// Outcome of the pipeline's load stage.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub project_id: u64,
    pub bundle_path: String,
}
