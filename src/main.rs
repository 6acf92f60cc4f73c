use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use mirrorpaint::activity::{self, ActivityData};
use mirrorpaint::number_line::draw_number_line;
use mirrorpaint::progress::parse_fraction;
use mirrorpaint::rendering::{Context2d, Screenshot, Surface, SurfaceRegistry};
use mirrorpaint::schedule::Ticker;
use mirrorpaint::{MirrorConfig, Rotator};

#[derive(Parser)]
#[command(name = "mirrorpaint", about = "Render smart mirror widgets to PNG")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single progress ring
    Ring {
        #[arg(long)]
        fraction: f64,
        #[arg(long, default_value_t = 100)]
        width: u32,
        #[arg(long, default_value_t = 100)]
        height: u32,
        #[arg(long)]
        out: PathBuf,
        /// Also print the PNG as a data: URL
        #[arg(long)]
        data_url: bool,
    },
    /// Render a number line with one value marked
    NumberLine {
        #[arg(long, allow_hyphen_values = true)]
        min: i64,
        #[arg(long, allow_hyphen_values = true)]
        max: i64,
        #[arg(long, allow_hyphen_values = true)]
        value: i64,
        #[arg(long, default_value_t = 400)]
        width: u32,
        #[arg(long, default_value_t = 80)]
        height: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Render one ring per person from an activity JSON payload
    Activity {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 64)]
        size: u32,
    },
    /// Step the panel rotator on a timer and log which panel is visible
    Rotate {
        #[arg(long)]
        count: usize,
        #[arg(long)]
        ticks: Option<u64>,
        /// Overrides `rotator_interval_ms` from the config
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Redraw a ring from a file holding the current fraction
    Watch {
        #[arg(long)]
        fraction_file: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 100)]
        size: u32,
        #[arg(long)]
        ticks: Option<u64>,
        /// Overrides `redraw_interval_ms` from the config
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn write_screenshot(shot: &Screenshot, out: &Path) -> Result<()> {
    fs::write(out, &shot.png_data).with_context(|| format!("writing {}", out.display()))?;
    info!("Wrote {}x{} PNG to {}", shot.width, shot.height, out.display());
    Ok(())
}

fn write_png(surface: &Surface, out: &Path) -> Result<()> {
    write_screenshot(&surface.to_screenshot()?, out)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MirrorConfig::from_file(path)?,
        None => MirrorConfig::default(),
    };

    match cli.command {
        Command::Ring { fraction, width, height, out, data_url } => {
            let shot = config.ring_renderer().render(width, height, fraction)?.to_screenshot()?;
            write_screenshot(&shot, &out)?;
            if data_url {
                println!("{}", shot.to_data_url());
            }
        }
        Command::NumberLine { min, max, value, width, height, out } => {
            let mut surface = Surface::new(width, height);
            let mut ctx = Context2d::new(&mut surface);
            draw_number_line(&mut ctx, min, max, value, &config.number_line)?;
            write_png(&surface, &out)?;
        }
        Command::Activity { input, out_dir, size } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let data = ActivityData::from_json(&text)?;
            let mut surfaces = config.surface_registry();
            for person in &data.persons {
                let id = person.surface_id();
                if surfaces.get(&id).is_none() {
                    surfaces.insert(id, Surface::new(size, size));
                }
            }
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            for id in activity::draw_activity(&config.ring_renderer(), &mut surfaces, &data) {
                if let Some(surface) = surfaces.get(&id) {
                    write_png(surface, &out_dir.join(format!("{}.png", id)))?;
                }
            }
        }
        Command::Rotate { count, ticks, interval_ms } => {
            let ticker = Ticker::from_millis(interval_ms.unwrap_or(config.rotator_interval_ms))?;
            let mut rotator = Rotator::with_count(count);
            ticker
                .run(ticks, |_| {
                    match rotator.advance().and_then(|i| rotator.panels().get(i)) {
                        Some(panel) => info!("Showing {} ({})", panel.id, panel.src),
                        None => info!("No panels to rotate"),
                    }
                    ControlFlow::Continue(())
                })
                .await;
        }
        Command::Watch { fraction_file, out, size, ticks, interval_ms } => {
            let ticker = Ticker::from_millis(interval_ms.unwrap_or(config.redraw_interval_ms))?;
            let renderer = config.ring_renderer();
            let mut surfaces = SurfaceRegistry::new();
            surfaces.insert("ring", Surface::new(size, size));
            ticker
                .run(ticks, |_| {
                    // a bad read is cosmetic: keep the previous frame and retry next tick
                    let fraction = match fs::read_to_string(&fraction_file)
                        .map_err(mirrorpaint::Error::from)
                        .and_then(|t| parse_fraction(&t))
                    {
                        Ok(f) => f,
                        Err(e) => {
                            warn!("Cannot read fraction from {}: {}", fraction_file.display(), e);
                            return ControlFlow::Continue(());
                        }
                    };
                    renderer.draw_progress(&mut surfaces, "ring", fraction);
                    if let Some(surface) = surfaces.get("ring") {
                        if let Err(e) = write_png(surface, &out) {
                            warn!("{:#}", e);
                        }
                    }
                    ControlFlow::Continue(())
                })
                .await;
        }
    }
    Ok(())
}
