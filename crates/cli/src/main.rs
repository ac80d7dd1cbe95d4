#![deny(unsafe_code)]
//! CLI binary for the starfield engine.
//!
//! Subcommands:
//! - `render` — animate a starfield headlessly for N frames, write a PNG
//! - `trace` — print the draw calls of the last of N frames
//! - `config` — print the effective configuration and its schema

mod error;
mod settings;

use clap::{ArgAction, Parser, Subcommand};
use error::CliError;
use serde_json::json;
use settings::ConfigArgs;
use starfield_core::headless::{MemorySurface, StaticDiscovery};
use starfield_core::{LayoutBox, ManualScheduler, Rgb, StarfieldConfig, StarfieldManager};
use starfield_raster::RasterDiscovery;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starfield", about = "Headless starfield renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log lifecycle events; repeat for per-frame detail.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Animate a starfield for N frames and write a PNG of the last one.
    Render {
        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640.0)]
        width: f64,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 480.0)]
        height: f64,

        /// Number of frames to run.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Background color behind the stars (#rrggbb).
        #[arg(short, long, default_value = "#0b0d17")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "starfield.png")]
        output: PathBuf,

        #[command(flatten)]
        settings: ConfigArgs,
    },
    /// Run N frames on a recording surface and print the last frame's draw calls.
    Trace {
        #[arg(short = 'W', long, default_value_t = 100.0)]
        width: f64,

        #[arg(short = 'H', long, default_value_t = 100.0)]
        height: f64,

        #[arg(short, long, default_value_t = 1)]
        frames: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        settings: ConfigArgs,
    },
    /// Print the effective configuration and the parameter schema.
    Config {
        #[command(flatten)]
        settings: ConfigArgs,
    },
}

fn try_init_logging(verbose: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
}

fn init_logging(verbose: u8) {
    if let Err(e) = try_init_logging(verbose) {
        eprintln!("logging disabled: {e}");
    }
}

fn render(
    config: StarfieldConfig,
    layout: LayoutBox,
    frames: usize,
    seed: u64,
    background: Rgb,
    output: &Path,
) -> Result<serde_json::Value, CliError> {
    let (width, height) = layout.pixel_size();
    starfield_raster::check_dimensions(width, height)?;

    let mut discovery = RasterDiscovery::new(vec![layout]);
    let mut scheduler = ManualScheduler::new();
    let mut manager = StarfieldManager::new(config, seed);
    manager.initialize_all(&mut discovery, &mut scheduler);
    for _ in 0..frames {
        manager.pump(&mut scheduler);
    }

    let starfield = manager
        .iter()
        .next()
        .ok_or_else(|| CliError::Input("no surface to render".into()))?;
    starfield_raster::snapshot::write_png(starfield.surface().context(), background, output)?;

    let halos = starfield
        .stars()
        .iter()
        .filter(|s| s.has_halo(manager.config()))
        .count();
    Ok(json!({
        "width": starfield.surface().context().width(),
        "height": starfield.surface().context().height(),
        "frames": starfield.frames(),
        "seed": seed,
        "stars": starfield.stars().len(),
        "halos": halos,
        "output": output.display().to_string(),
    }))
}

fn trace(
    config: StarfieldConfig,
    layout: LayoutBox,
    frames: usize,
    seed: u64,
) -> Result<serde_json::Value, CliError> {
    let mut discovery = StaticDiscovery::new(vec![MemorySurface::new(layout.width, layout.height)]);
    let mut scheduler = ManualScheduler::new();
    let mut manager = StarfieldManager::new(config, seed);
    manager.initialize_all(&mut discovery, &mut scheduler);

    let ids = manager.ids();
    for _ in 0..frames {
        for &id in &ids {
            if let Some(recorder) = manager
                .get_mut(id)
                .and_then(|s| s.surface_mut().recorder_mut())
            {
                recorder.take_commands();
            }
        }
        manager.pump(&mut scheduler);
    }

    let starfield = manager
        .iter()
        .next()
        .ok_or_else(|| CliError::Input("no surface to trace".into()))?;
    let commands = starfield
        .surface()
        .recorder()
        .map(|r| r.commands().to_vec())
        .unwrap_or_default();
    let halos = starfield
        .stars()
        .iter()
        .filter(|s| s.has_halo(manager.config()))
        .count();
    Ok(json!({
        "frames": starfield.frames(),
        "stars": starfield.stars().len(),
        "halos": halos,
        "commands": commands,
    }))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config { settings } => {
            let config = settings.resolve()?;
            if cli.json {
                let info = json!({
                    "config": config.params(),
                    "schema": StarfieldConfig::param_schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let serde_json::Value::Object(params) = config.params() {
                for (name, value) in params {
                    println!("{name} = {value}");
                }
            }
        }
        Command::Render {
            width,
            height,
            frames,
            seed,
            background,
            output,
            settings,
        } => {
            let config = settings.resolve()?;
            let background = Rgb::from_hex(&background)
                .map_err(|e| CliError::Input(format!("invalid --background: {e}")))?;
            let info = render(
                config,
                LayoutBox::new(width, height),
                frames,
                seed,
                background,
                &output,
            )?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} stars ({}x{}, {frames} frames, seed {seed}) -> {}",
                    info["stars"],
                    info["width"],
                    info["height"],
                    output.display()
                );
            }
        }
        Command::Trace {
            width,
            height,
            frames,
            seed,
            settings,
        } => {
            let config = settings.resolve()?;
            let info = trace(config, LayoutBox::new(width, height), frames, seed)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Some(commands) = info["commands"].as_array() {
                for command in commands {
                    println!("{command}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
