use crate::domain::model::{Methodology, ProjectRequest};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sdlc-planner")]
#[command(about = "AI-assisted SDLC phase breakdown planner")]
pub struct Cli {
    /// Directory for export bundles and the project file
    #[arg(long, global = true, default_value = "./output")]
    pub output: String,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a phase breakdown for a project
    Generate(GenerateArgs),
    /// Run the normalizer on a bundled sample reply (no network)
    Demo {
        #[arg(long, default_value = "12")]
        duration_weeks: u32,
    },
    /// List recently generated projects
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Search stored projects by name or description
    Search {
        query: String,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Aggregate statistics over stored projects
    Stats,
    /// Write one stored breakdown to a single-format file
    Export {
        id: u64,
        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormat,
    },
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    #[arg(long, default_value = "12")]
    pub duration_weeks: u32,

    #[arg(long, default_value = "4-10 (Medium)")]
    pub team_size: String,

    #[arg(long, default_value = "Web Application")]
    pub project_type: String,

    #[arg(long, value_enum, default_value = "agile")]
    pub methodology: Methodology,

    /// TOML file with generator backend settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the generator call and build the default template
    #[arg(long)]
    pub offline: bool,
}

impl GenerateArgs {
    pub fn to_request(&self) -> ProjectRequest {
        ProjectRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            duration_weeks: self.duration_weeks,
            team_size: self.team_size.clone(),
            project_type: self.project_type.clone(),
            methodology: self.methodology,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}
