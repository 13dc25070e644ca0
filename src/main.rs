use clap::Parser;
use sdlc_planner::adapters::SAMPLE_RESPONSE;
use sdlc_planner::config::{Cli, Command, ExportFormat, GenerateArgs};
use sdlc_planner::core::{Generator, LoadReport, ProjectStore};
use sdlc_planner::utils::export;
use sdlc_planner::utils::validation::Validate;
use sdlc_planner::utils::{error::ErrorSeverity, logger};
use sdlc_planner::{
    normalizer, BackendConfig, Breakdown, BreakdownPipeline, Engine, HttpGenerator, LocalStorage,
    OfflineGenerator, ProjectRequest, SdlcError, SessionStore,
};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting sdlc-planner CLI");

    let result = match &cli.command {
        Command::Generate(args) => generate(&cli, args).await,
        Command::Demo { duration_weeks } => demo(*duration_weeks),
        Command::History { limit } => history(&cli, *limit),
        Command::Search { query, limit } => search(&cli, query, *limit),
        Command::Stats => stats(&cli),
        Command::Export { id, format } => export_one(&cli, *id, *format),
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn store_path(output: &str) -> PathBuf {
    Path::new(output).join("projects.json")
}

async fn generate(cli: &Cli, args: &GenerateArgs) -> Result<(), SdlcError> {
    let request = args.to_request();
    request.validate()?;

    let mut config = match &args.config {
        Some(path) => BackendConfig::from_file(path)?,
        None => BackendConfig::from_env(),
    };
    config.output_path = cli.output.clone();
    config.validate()?;

    let storage = LocalStorage::new(cli.output.clone());
    let store = SessionStore::with_file(store_path(&cli.output))?;

    let (breakdown, report) = if args.offline {
        tracing::info!("Offline mode: skipping the generator call");
        run_pipeline(OfflineGenerator, storage, store, config, request).await?
    } else {
        let generator = HttpGenerator::new(config.clone());
        // Surface missing credentials before any generation attempt
        if !generator.is_configured() {
            return Err(SdlcError::ConfigError {
                message: "Generator not configured; set SDLC_API_KEY and SDLC_API_ENDPOINT"
                    .to_string(),
            });
        }
        run_pipeline(generator, storage, store, config, request).await?
    };

    println!("✅ SDLC breakdown generated and saved (project #{})", report.project_id);
    println!("📁 Export bundle: {}", report.bundle_path);
    println!();
    print!("{}", export::summary_text(&breakdown));
    Ok(())
}

async fn run_pipeline<G: Generator>(
    generator: G,
    storage: LocalStorage,
    store: SessionStore,
    config: BackendConfig,
    request: ProjectRequest,
) -> Result<(Breakdown, LoadReport), SdlcError> {
    let pipeline = BreakdownPipeline::new(generator, storage, store, config, request);
    Engine::new(pipeline).run().await
}

fn demo(duration_weeks: u32) -> Result<(), SdlcError> {
    let breakdown = normalizer::normalize(SAMPLE_RESPONSE, duration_weeks);
    println!("✅ Normalized the bundled sample reply");
    println!();
    print!("{}", export::summary_text(&breakdown));
    Ok(())
}

fn history(cli: &Cli, limit: usize) -> Result<(), SdlcError> {
    let store = SessionStore::with_file(store_path(&cli.output))?;
    let hits = store.recent(limit)?;
    if hits.is_empty() {
        println!("No projects generated yet.");
        return Ok(());
    }
    for hit in hits {
        println!(
            "#{} {} [{}, {}] {} weeks, {} phases ({})",
            hit.id,
            hit.name,
            hit.project_type,
            hit.methodology,
            hit.duration_weeks,
            hit.total_phases,
            hit.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn search(cli: &Cli, query: &str, limit: usize) -> Result<(), SdlcError> {
    let store = SessionStore::with_file(store_path(&cli.output))?;
    let hits = store.search(query, limit)?;
    if hits.is_empty() {
        println!("No projects match '{}'.", query);
        return Ok(());
    }
    for hit in hits {
        println!("#{} {}: {}", hit.id, hit.name, hit.description);
    }
    Ok(())
}

fn stats(cli: &Cli) -> Result<(), SdlcError> {
    let store = SessionStore::with_file(store_path(&cli.output))?;
    let report = store.analytics()?;
    println!("Projects: {}", report.total_projects);
    println!("Breakdowns: {}", report.total_breakdowns);

    println!("\nBy methodology:");
    for (methodology, count) in &report.methodology_distribution {
        println!("  {}: {}", methodology, count);
    }

    println!("\nBy project type:");
    for (project_type, count) in &report.project_type_distribution {
        let avg = report
            .average_duration_by_type
            .get(project_type)
            .copied()
            .unwrap_or(0.0);
        println!("  {}: {} (avg {:.1} weeks)", project_type, count, avg);
    }
    Ok(())
}

fn export_one(cli: &Cli, id: u64, format: ExportFormat) -> Result<(), SdlcError> {
    let store = SessionStore::with_file(store_path(&cli.output))?;
    let breakdown = store
        .breakdown_for(id)?
        .ok_or_else(|| SdlcError::StorageError {
            message: format!("No stored project with id {}", id),
        })?;

    let content = match format {
        ExportFormat::Json => export::to_json(&breakdown)?,
        ExportFormat::Csv => export::to_csv(&breakdown)?,
        ExportFormat::Markdown => export::to_markdown(&breakdown),
    };

    std::fs::create_dir_all(&cli.output)?;
    let path = Path::new(&cli.output).join(format!("breakdown_{}.{}", id, format.extension()));
    std::fs::write(&path, content)?;
    println!("📁 Wrote {}", path.display());
    Ok(())
}
