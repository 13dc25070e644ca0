//! Serializes a finished breakdown to the three interchangeable textual
//! formats (JSON, CSV, Markdown) plus the on-screen summary and the
//! timeline rows a charting frontend can consume.

use crate::domain::model::Breakdown;
use crate::utils::error::Result;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Write as _;

/// One row of timeline (gantt) data: start/finish are cumulative week
/// offsets from project start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttRow {
    pub task: String,
    pub start: u32,
    pub finish: u32,
    pub duration: u32,
    pub description: String,
    pub team: String,
}

/// Breakdown wrapped with a generation timestamp, pretty-printed.
pub fn to_json(breakdown: &Breakdown) -> Result<String> {
    let export = serde_json::json!({
        "generated_at": Utc::now().to_rfc3339(),
        "sdlc_breakdown": breakdown,
    });
    Ok(serde_json::to_string_pretty(&export)?)
}

/// One row per phase; list fields are semicolon-joined.
pub fn to_csv(breakdown: &Breakdown) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Phase Name",
        "Duration (Weeks)",
        "Percentage",
        "Description",
        "Key Deliverables",
        "Main Activities",
        "Team Focus",
    ])?;

    for phase in &breakdown.phases {
        writer.write_record(&[
            phase.name.clone(),
            phase.duration_weeks.to_string(),
            format!("{:.1}%", phase.percentage),
            phase.description.clone(),
            phase.deliverables.join("; "),
            phase.activities.join("; "),
            phase.team_focus.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| crate::utils::error::SdlcError::StorageError {
        message: format!("CSV output was not valid UTF-8: {}", e),
    })
}

/// Formatted document: title, summary block, phase overview table,
/// per-phase detail sections, recommendations when present.
pub fn to_markdown(breakdown: &Breakdown) -> String {
    let summary = &breakdown.project_summary;
    let mut md = String::new();

    let _ = writeln!(md, "# SDLC Breakdown: {}", summary.name);
    md.push('\n');
    let _ = writeln!(
        md,
        "**Generated on:** {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        md,
        "**Total Duration:** {} weeks",
        summary.total_duration_weeks
    );
    let _ = writeln!(md, "**Methodology:** {}", summary.methodology);
    let _ = writeln!(
        md,
        "**Complexity Assessment:** {}",
        summary.complexity_assessment
    );
    md.push('\n');

    md.push_str("## Phase Overview\n\n");
    md.push_str("| Phase | Duration | Percentage |\n");
    md.push_str("|-------|----------|------------|\n");
    for phase in &breakdown.phases {
        let _ = writeln!(
            md,
            "| {} | {} weeks | {:.1}% |",
            phase.name, phase.duration_weeks, phase.percentage
        );
    }
    md.push('\n');

    md.push_str("## Detailed Phase Breakdown\n\n");
    for (i, phase) in breakdown.phases.iter().enumerate() {
        let _ = writeln!(md, "### Phase {}: {}", i + 1, phase.name);
        md.push('\n');
        let _ = writeln!(
            md,
            "**Duration:** {} weeks ({:.1}%)",
            phase.duration_weeks, phase.percentage
        );
        md.push('\n');
        let _ = writeln!(md, "**Description:** {}", phase.description);
        md.push('\n');

        if !phase.deliverables.is_empty() {
            md.push_str("**Key Deliverables:**\n");
            for deliverable in &phase.deliverables {
                let _ = writeln!(md, "- {}", deliverable);
            }
            md.push('\n');
        }

        if !phase.activities.is_empty() {
            md.push_str("**Main Activities:**\n");
            for activity in &phase.activities {
                let _ = writeln!(md, "- {}", activity);
            }
            md.push('\n');
        }

        if !phase.team_focus.is_empty() {
            let _ = writeln!(md, "**Team Focus:** {}", phase.team_focus);
            md.push('\n');
        }
    }

    if !breakdown.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for rec in &breakdown.recommendations {
            let _ = writeln!(md, "- {}", rec);
        }
        md.push('\n');
    }

    md
}

/// Plain-text summary printed by the CLI after generation.
pub fn summary_text(breakdown: &Breakdown) -> String {
    let summary = &breakdown.project_summary;
    let mut out = String::new();
    let _ = writeln!(out, "Project: {}", summary.name);
    let _ = writeln!(out, "Total Duration: {} weeks", summary.total_duration_weeks);
    let _ = writeln!(out, "Methodology: {}", summary.methodology);
    let _ = writeln!(out, "Number of Phases: {}", breakdown.phases.len());
    out.push('\n');
    out.push_str("Phase Breakdown:\n");
    for phase in &breakdown.phases {
        let _ = writeln!(
            out,
            "  - {}: {} weeks ({:.1}%)",
            phase.name, phase.duration_weeks, phase.percentage
        );
    }
    out
}

/// Timeline rows with cumulative start/finish offsets.
pub fn gantt_rows(breakdown: &Breakdown) -> Vec<GanttRow> {
    let mut current_start = 0u32;
    breakdown
        .phases
        .iter()
        .map(|phase| {
            let row = GanttRow {
                task: phase.name.clone(),
                start: current_start,
                finish: current_start + phase.duration_weeks,
                duration: phase.duration_weeks,
                description: phase.description.clone(),
                team: phase.team_focus.clone(),
            };
            current_start += phase.duration_weeks;
            row
        })
        .collect()
}
