//! CLI demo: render a region of the noise demo world to a PNG.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use carta_map::{MapRenderer, RateLimit, RenderConfig, TickScheduler};
use carta_palette::ColorPalette;
use carta_world::NoiseWorld;

#[derive(Parser, Debug)]
#[command(name = "carta", about = "Top-down map renderer for a demo voxel world")]
struct Args {
    /// Chunk rectangle corners, inclusive.
    #[arg(long, default_value_t = -4, allow_hyphen_values = true)]
    x1: i32,
    #[arg(long, default_value_t = -4, allow_hyphen_values = true)]
    z1: i32,
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    x2: i32,
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    z2: i32,
    /// Worldgen seed.
    #[arg(long, default_value_t = 1337, allow_hyphen_values = true)]
    seed: i32,
    /// Output image path.
    #[arg(long, default_value = "map.png")]
    out: PathBuf,
    /// Chunks processed between suspensions.
    #[arg(long, default_value_t = 4)]
    chunks_per_tick: u32,
    /// Chunk generations between suspensions.
    #[arg(long, default_value_t = 1)]
    gens_per_tick: u32,
    /// Milliseconds per tick; 0 renders without pausing.
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,
    /// Palette TOML file; defaults to the built-in table.
    #[arg(long)]
    palette: Option<PathBuf>,
}

struct SleepTicker {
    tick: Duration,
}

impl TickScheduler for SleepTicker {
    fn yield_tick(&mut self) {
        if !self.tick.is_zero() {
            std::thread::sleep(self.tick);
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let palette = match &args.palette {
        Some(path) => ColorPalette::from_path(path)?,
        None => ColorPalette::builtin(),
    };
    let world = NoiseWorld::new(args.seed);
    let (min_section, max_section) = world.section_range();
    let cfg = RenderConfig {
        chunks_per_tick: args.chunks_per_tick.max(1),
        chunk_loads: RateLimit::Disabled,
        chunk_gens: RateLimit::PerTick(args.gens_per_tick.max(1)),
        min_section,
        max_section,
    };
    let renderer = MapRenderer::new(cfg, Arc::new(palette));
    let mut ticker = SleepTicker {
        tick: Duration::from_millis(args.tick_ms),
    };
    let img = renderer.render(
        world.as_ref(),
        &mut ticker,
        args.x1,
        args.z1,
        args.x2,
        args.z2,
    )?;
    log::info!("rendered {}x{} px", img.width(), img.height());
    let (w, h) = (img.width() as u32, img.height() as u32);
    let out = image::RgbaImage::from_raw(w, h, img.into_raw())
        .ok_or("raster buffer size mismatch")?;
    out.save(&args.out)?;
    println!("wrote {}", args.out.display());
    Ok(())
}
