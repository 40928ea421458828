use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use colony_counter::synthetic::{evenly_spaced, plate};

#[derive(Parser, Debug)]
#[command(
    name = "sample_plate",
    about = "Write a synthetic plate image with evenly spaced square colonies",
    version
)]
struct Cli {
    /// Output image path
    #[arg(short = 'o', long = "out", default_value = "sample_plate.png")]
    out: PathBuf,

    #[arg(long = "width", default_value_t = 400)]
    width: u32,

    #[arg(long = "height", default_value_t = 400)]
    height: u32,

    /// Colonies per row
    #[arg(long = "cols", default_value_t = 5)]
    cols: u32,

    /// Colonies per column
    #[arg(long = "rows", default_value_t = 5)]
    rows: u32,

    /// Side length of each colony in pixels
    #[arg(long = "size", default_value_t = 10)]
    size: u32,

    /// Gray level of the colonies, 0 is black
    #[arg(long = "intensity", default_value_t = 0)]
    intensity: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.width == 0 || cli.height == 0 {
        return Err("width and height must be positive".into());
    }

    let colonies = evenly_spaced(cli.width, cli.height, cli.cols, cli.rows, cli.size, cli.intensity);
    let img = plate(cli.width, cli.height, &colonies);
    img.save(&cli.out)
        .map_err(|e| format!("Failed to save {}: {e}", cli.out.display()))?;
    println!("wrote {} ({} colonies)", cli.out.display(), colonies.len());
    Ok(())
}
