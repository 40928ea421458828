use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use colony_counter::{AnalysisConfig, AnalysisResult, Analyzer, DetectionParameters};

#[derive(Parser, Debug)]
#[command(
    name = "colony",
    about = "Count dark colonies on a plate photo and print the result as JSON",
    version
)]
struct Cli {
    /// Image to analyse (PNG, JPEG, ...)
    #[arg(short = 'i', long = "image")]
    image: PathBuf,

    /// Number of sectors to split the plate into
    #[arg(short = 's', long = "sectors", default_value_t = 1, allow_negative_numbers = true)]
    sectors: i64,

    /// Detection sensitivity, 0-100
    #[arg(short = 'e', long = "sensitivity", default_value_t = 50, allow_negative_numbers = true)]
    sensitivity: i64,

    /// JSON file overriding pipeline tunables
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Also write overview.png and sector_<n>.png into this directory
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
    Ok(config)
}

fn write_png(path: &Path, encoded: &str) -> Result<(), Box<dyn Error>> {
    let bytes = STANDARD.decode(encoded)?;
    fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}

fn write_images(dir: &Path, result: &AnalysisResult) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    write_png(&dir.join("overview.png"), &result.overview_visualization)?;
    for sector in &result.sector_results {
        let name = format!("sector_{}.png", sector.index + 1);
        write_png(&dir.join(name), &sector.cropped_visualization)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let params = DetectionParameters::new(cli.sectors, cli.sensitivity)?;
    let config = load_config(cli.config.as_deref())?;
    let bytes = fs::read(&cli.image)
        .map_err(|e| format!("Failed to read {}: {e}", cli.image.display()))?;

    let result = Analyzer::new(config).analyze(&bytes, &params)?;

    if let Some(dir) = cli.out_dir.as_deref() {
        write_images(dir, &result)?;
    }

    let json = if cli.pretty {
        result.to_json_pretty()?
    } else {
        result.to_json()?
    };
    println!("{json}");
    Ok(())
}
