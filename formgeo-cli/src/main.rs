use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use formgeo::confidence::{ConfidenceFactors, ConfidenceScorer};
use formgeo::{ExtractionResult, FieldGeometryPipeline, LayoutConfig, PageGeometryResolver};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "formgeo",
    about = "Field geometry and layout inference for AI-detected PDF form fields",
    version,
    author
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective size and rotation of every page
    Pages {
        /// Input PDF file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },

    /// Convert an AI response into calibrated field geometry
    Extract {
        /// Source PDF file
        #[arg(long)]
        pdf: PathBuf,

        /// AI response JSON file
        #[arg(short, long)]
        response: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Score a set of confidence factors
    Score {
        /// Label match certainty (0-1)
        #[arg(long)]
        label_match: f64,

        /// Position certainty (0-1)
        #[arg(long)]
        position: f64,

        /// Field type certainty (0-1)
        #[arg(long)]
        type_certainty: f64,

        /// A visual boundary was detected around the field
        #[arg(long)]
        visual_boundary: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionReport {
    generated_at: DateTime<Utc>,
    version: &'static str,
    source: String,
    #[serde(flatten)]
    result: ExtractionResult,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "formgeo=debug" } else { "formgeo=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            LayoutConfig::from_json(&json)
                .with_context(|| format!("Invalid layout config {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };
    debug!(?config, "Layout configuration loaded");
    Ok(config)
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pages { input, json } => {
            let bytes = fs::read(&input)
                .with_context(|| format!("Failed to read PDF {}", input.display()))?;
            let pages = PageGeometryResolver::new().resolve(&bytes);
            debug!(pages = pages.len(), input = %input.display(), "Resolved page geometry");

            if json {
                println!("{}", to_json(&pages, false)?);
            } else {
                println!("Page geometry for: {}", input.display());
                println!("==========================================");
                for page in &pages {
                    println!(
                        "Page {}: {:.2} x {:.2} pt, rotation {}",
                        page.page_number, page.width, page.height, page.rotation
                    );
                }
            }
        }

        Commands::Extract {
            pdf,
            response,
            output,
            config,
            compact,
        } => {
            let config = load_config(config.as_deref())?;
            let pdf_bytes =
                fs::read(&pdf).with_context(|| format!("Failed to read PDF {}", pdf.display()))?;
            let response_json = fs::read_to_string(&response)
                .with_context(|| format!("Failed to read AI response {}", response.display()))?;

            let result = FieldGeometryPipeline::with_config(config)
                .run(&pdf_bytes, &response_json)
                .with_context(|| format!("Failed to process AI response {}", response.display()))?;

            let report = ExtractionReport {
                generated_at: Utc::now(),
                version: formgeo::VERSION,
                source: pdf.display().to_string(),
                result,
            };
            let json = to_json(&report, compact)?;

            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(output = %path.display(), "Extraction report written");
                    println!(
                        "Extracted {} fields to {}",
                        report.result.stats.total_fields,
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }

        Commands::Score {
            label_match,
            position,
            type_certainty,
            visual_boundary,
        } => {
            let mut factors = ConfidenceFactors::new(label_match, position, type_certainty);
            if visual_boundary {
                factors = factors.with_visual_boundary(true);
            }
            let result = ConfidenceScorer::new().score(&factors);
            println!("{}", to_json(&result, false)?);
        }
    }

    Ok(())
}
