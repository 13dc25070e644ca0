//! Best-effort conversion of raw generator text into a valid [`Breakdown`].
//!
//! The generator producing malformed or prose-only output is the expected
//! common case. Every branch of this module terminates in a complete,
//! internally consistent breakdown; nothing here returns an error.
//!
//! Pipeline: structured extraction (fenced block, any fence, brace span,
//! whole text) -> duration reconciliation -> field backfilling. When no
//! structured data is recoverable, a line-pattern scan over the text, and
//! finally a fixed five-phase template, take over.

use crate::domain::model::{Breakdown, Phase, ProjectSummary};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_PHASE_NAME: &str = "Unnamed Phase";
const DEFAULT_PHASE_DESCRIPTION: &str = "Phase description not available";
const DEFAULT_TEAM_FOCUS: &str = "General development";
const DEFAULT_PROJECT_NAME: &str = "Software Project";
const DEFAULT_METHODOLOGY: &str = "Agile";
const DEFAULT_COMPLEXITY: &str = "Medium";

/// Phase weights (percent) for the fixed template, in phase order.
const TEMPLATE_WEIGHTS: [u32; 5] = [15, 20, 40, 20, 5];

/// Generator reply as parsed, before any repair. All fields optional;
/// missing ones are backfilled against the fixed defaults above.
#[derive(Debug, Default, Deserialize)]
struct RawBreakdown {
    #[serde(default)]
    project_summary: Option<RawSummary>,
    #[serde(default)]
    phases: Vec<RawPhase>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSummary {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    total_duration_weeks: Option<f64>,
    #[serde(default)]
    methodology: Option<String>,
    #[serde(default)]
    complexity_assessment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPhase {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    duration_weeks: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    deliverables: Option<Vec<String>>,
    #[serde(default)]
    activities: Option<Vec<String>>,
    #[serde(default)]
    team_focus: Option<String>,
}

/// Turn raw generator text into a breakdown whose phase durations are
/// reconciled against `target_duration`. Never fails outward.
pub fn normalize(raw_text: &str, target_duration: u32) -> Breakdown {
    match extract_structured(raw_text) {
        // A parsed object with no usable phase list is discarded entirely;
        // the text scan still gets a shot at the raw reply.
        Some(raw) if !raw.phases.is_empty() => reconcile(raw, target_duration),
        _ => fallback(raw_text, target_duration),
    }
}

// ---------------------------------------------------------------------------
// Structured extraction
// ---------------------------------------------------------------------------

fn extract_structured(text: &str) -> Option<RawBreakdown> {
    for candidate in candidate_payloads(text) {
        let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) else {
            continue;
        };
        if !value.is_object() {
            continue;
        }
        if let Ok(parsed) = serde_json::from_value::<RawBreakdown>(value) {
            return Some(parsed);
        }
    }
    None
}

/// Candidate JSON payloads, most specific first: a fence tagged `json`,
/// any fenced block, the largest brace-delimited substring, the whole text.
fn candidate_payloads(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    let tagged = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").unwrap();
    for cap in tagged.captures_iter(text) {
        candidates.push(cap[1].to_string());
    }

    let fenced = Regex::new(r"(?s)```\s*(\{.*?\})\s*```").unwrap();
    for cap in fenced.captures_iter(text) {
        candidates.push(cap[1].to_string());
    }

    if let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) {
        if open < close {
            candidates.push(text[open..=close].to_string());
        }
    }

    candidates.push(text.to_string());
    candidates
}

// ---------------------------------------------------------------------------
// Duration reconciliation
// ---------------------------------------------------------------------------

fn reconcile(raw: RawBreakdown, target_duration: u32) -> Breakdown {
    let durations: Vec<f64> = raw
        .phases
        .iter()
        .map(|p| p.duration_weeks.unwrap_or(0.0).max(0.0))
        .collect();
    let sum_weeks: f64 = durations.iter().sum();
    let target = f64::from(target_duration);

    let weeks: Vec<u32> = if sum_weeks == target {
        durations.iter().map(|d| d.round() as u32).collect()
    } else if sum_weeks > 0.0 {
        // Proportional rescale. Each phase rounds independently and the
        // resulting sum is NOT re-verified against the target; the total can
        // drift by a few weeks. Percentages below are computed against the
        // actual total, so they still sum to 100.
        let factor = target / sum_weeks;
        durations
            .iter()
            .map(|d| ((d * factor).round() as u32).max(1))
            .collect()
    } else {
        even_split(target_duration, raw.phases.len())
    };

    let phases = merge_phases(raw.phases, &weeks);

    let summary = raw.project_summary.unwrap_or_default();
    Breakdown {
        project_summary: ProjectSummary {
            name: summary.name.unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            total_duration_weeks: summary
                .total_duration_weeks
                .map(|w| w.round() as u32)
                .unwrap_or(target_duration),
            methodology: summary
                .methodology
                .unwrap_or_else(|| DEFAULT_METHODOLOGY.to_string()),
            complexity_assessment: summary
                .complexity_assessment
                .unwrap_or_else(|| DEFAULT_COMPLEXITY.to_string()),
        },
        phases,
        recommendations: raw.recommendations,
    }
}

/// Backfill every missing phase field against the fixed default record and
/// recompute percentages from the final week counts.
fn merge_phases(raw_phases: Vec<RawPhase>, weeks: &[u32]) -> Vec<Phase> {
    let actual_total: u32 = weeks.iter().sum();
    raw_phases
        .into_iter()
        .zip(weeks)
        .map(|(raw, &duration)| Phase {
            name: raw.name.unwrap_or_else(|| DEFAULT_PHASE_NAME.to_string()),
            duration_weeks: duration,
            percentage: percentage_of(duration, actual_total),
            description: raw
                .description
                .unwrap_or_else(|| DEFAULT_PHASE_DESCRIPTION.to_string()),
            deliverables: raw.deliverables.unwrap_or_default(),
            activities: raw.activities.unwrap_or_default(),
            team_focus: raw
                .team_focus
                .unwrap_or_else(|| DEFAULT_TEAM_FOCUS.to_string()),
        })
        .collect()
}

fn percentage_of(duration: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(duration) / f64::from(total) * 100.0
    }
}

/// Evenly distribute `target` weeks over `count` phases: everyone gets
/// `target / count`, the first `target % count` phases one extra week.
/// The sum is exact by construction.
fn even_split(target: u32, count: usize) -> Vec<u32> {
    let count_u32 = count as u32;
    let base = target / count_u32;
    let extra = (target % count_u32) as usize;
    (0..count)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

// ---------------------------------------------------------------------------
// Fallback construction
// ---------------------------------------------------------------------------

fn fallback(raw_text: &str, target_duration: u32) -> Breakdown {
    let names = scan_phase_names(raw_text);

    let phases = if names.is_empty() {
        default_template_phases(target_duration)
    } else {
        let weeks = even_split(target_duration, names.len());
        let actual_total: u32 = weeks.iter().sum();
        names
            .into_iter()
            .zip(&weeks)
            .map(|(name, &duration)| Phase {
                name,
                duration_weeks: duration,
                percentage: percentage_of(duration, actual_total),
                description: DEFAULT_PHASE_DESCRIPTION.to_string(),
                deliverables: Vec::new(),
                activities: Vec::new(),
                team_focus: DEFAULT_TEAM_FOCUS.to_string(),
            })
            .collect()
    };

    Breakdown {
        project_summary: ProjectSummary {
            name: DEFAULT_PROJECT_NAME.to_string(),
            total_duration_weeks: target_duration,
            methodology: DEFAULT_METHODOLOGY.to_string(),
            complexity_assessment: DEFAULT_COMPLEXITY.to_string(),
        },
        phases,
        recommendations: vec![
            "Review and adjust phases based on project specifics".to_string(),
            "Consider team experience and project complexity".to_string(),
            "Plan for regular reviews and adjustments".to_string(),
        ],
    }
}

/// Scan prose for phase-like lines. Each matcher is tried per line, first
/// capture wins; distinct names are collected in order of appearance.
fn scan_phase_names(text: &str) -> Vec<String> {
    // "1. Phase Name: description" / "Phase Name: 3 weeks" / "Phase 2: Name"
    let matchers = [
        Regex::new(r"(?i)^\s*\d+\.\s*([^:\n]+):\s*\S").unwrap(),
        Regex::new(r"(?i)^\s*([A-Za-z][^:\n]*):\s*(\d+)\s*weeks?").unwrap(),
        Regex::new(r"(?i)^\s*Phase\s*\d*:\s*([^:\n]+)").unwrap(),
    ];

    let mut names = Vec::new();
    for line in text.lines() {
        for matcher in &matchers {
            if let Some(cap) = matcher.captures(line) {
                let name = cap[1].trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
                break;
            }
        }
    }
    names
}

/// The fixed five-phase template with canonical 15/20/40/20/5 weights.
/// Rounding error against the target is absorbed entirely by the third
/// phase (the largest), keeping the sum exact.
fn default_template_phases(target_duration: u32) -> Vec<Phase> {
    let template: [(&str, &str, &[&str], &[&str], &str); 5] = [
        (
            "Requirements & Planning",
            "Gather requirements, analyze feasibility, and create the project plan",
            &["Requirements document", "Project plan", "Technical specifications"],
            &["Stakeholder interviews", "Requirements gathering", "Risk assessment"],
            "Business analysis and planning",
        ),
        (
            "Design & Architecture",
            "Design system architecture, data model, and technical specifications",
            &["System architecture document", "Database design", "UI/UX mockups"],
            &["System design", "Architecture planning", "Technology selection"],
            "System architects and designers",
        ),
        (
            "Development & Implementation",
            "Code development, feature implementation, and integration",
            &["Working software modules", "Code documentation", "Unit tests"],
            &["Coding", "Code reviews", "Module integration"],
            "Development team",
        ),
        (
            "Testing & QA",
            "Comprehensive testing including unit, integration, and acceptance testing",
            &["Test results", "Bug reports", "Test documentation"],
            &["Test execution", "Bug fixing", "Performance testing"],
            "QA and testing team",
        ),
        (
            "Deployment & Launch",
            "Production deployment, user training, and go-live activities",
            &["Production system", "User documentation", "Training materials"],
            &["Production deployment", "User training", "Go-live support"],
            "DevOps and support team",
        ),
    ];

    let mut weeks: Vec<i64> = TEMPLATE_WEIGHTS
        .iter()
        .map(|&w| {
            let exact = f64::from(target_duration) * f64::from(w) / 100.0;
            (exact.round() as i64).max(1)
        })
        .collect();

    let allocated: i64 = weeks.iter().sum();
    let difference = i64::from(target_duration) - allocated;
    if difference != 0 {
        // Floor of 1 still applies; targets below the phase count cannot
        // sum exactly and clamp here instead of going negative.
        weeks[2] = (weeks[2] + difference).max(1);
    }

    let final_weeks: Vec<u32> = weeks.iter().map(|&w| w as u32).collect();
    let actual_total: u32 = final_weeks.iter().sum();

    template
        .into_iter()
        .zip(&final_weeks)
        .map(
            |((name, description, deliverables, activities, team_focus), &duration)| Phase {
                name: name.to_string(),
                duration_weeks: duration,
                percentage: percentage_of(duration, actual_total),
                description: description.to_string(),
                deliverables: deliverables.iter().map(|s| s.to_string()).collect(),
                activities: activities.iter().map(|s| s.to_string()).collect(),
                team_focus: team_focus.to_string(),
            },
        )
        .collect()
}
