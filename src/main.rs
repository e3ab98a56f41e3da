use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use element_map::config::load_config;
use element_map::perception::snapshot::load_snapshot;
use element_map::{ElementMapGenerator, ElementMapResult, GeneratorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON element map
    Json,
    /// Compact element listing, as handed to a decision model
    Text,
}

#[derive(Parser, Debug)]
#[command(
    name = "element-map",
    version,
    about = "Fuse accessibility and OCR detections into an addressable element map"
)]
struct Cli {
    /// Snapshot JSON file with screen size, structural and OCR elements
    snapshot: PathBuf,

    /// Path to config file (default: element_map.toml next to the binary or in the current dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the reduced generator: no line grouping, counter-only ids.
    /// Cannot be combined with --config.
    #[arg(long, conflicts_with = "config")]
    basic: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn run(cli: &Cli) -> ElementMapResult<String> {
    let config = if cli.basic {
        GeneratorConfig::basic()
    } else {
        load_config(cli.config.as_deref())?
    };
    let snapshot = load_snapshot(&cli.snapshot)?;

    let generator = ElementMapGenerator::new(config);
    let map = generator.generate(&snapshot.structural, &snapshot.ocr, snapshot.screen());
    tracing::info!(elements = map.len(), "element map ready");

    Ok(match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&map)?,
        OutputFormat::Text => map.to_prompt_text(),
    })
}

fn main() -> ExitCode {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();
    element_map::init_tracing("info");

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "element map generation failed");
            ExitCode::FAILURE
        }
    }
}
