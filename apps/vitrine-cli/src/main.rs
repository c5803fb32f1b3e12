mod config;
mod demo;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitrine_assets::FsTextureLoader;
use vitrine_refractor::TextRasterizer;

use crate::config::SceneFile;

#[derive(Parser)]
#[command(name = "vitrine-cli", about = "Headless driver for the refractor label and scene decor")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Build the full scene, animate it and sweep a pointer across the label
    Demo {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// YAML scene file; every section is optional
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Font for the label text, overriding the scene file
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Write the label raster for some text to an image file
    Raster {
        #[arg(short, long, default_value = "REFRACTION")]
        text: String,
        /// Output image; the format follows the extension
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        font: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vitrine-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", vitrine_common::crate_info());
            println!("scene: {}", vitrine_scene::crate_info());
            println!("assets: {}", vitrine_assets::crate_info());
            println!("input: {}", vitrine_input::crate_info());
            println!("render: {}", vitrine_render::crate_info());
            println!("decor: {}", vitrine_decor::crate_info());
            println!("refractor: {}", vitrine_refractor::crate_info());
        }
        Commands::Demo {
            frames,
            config,
            font,
        } => {
            let mut file = SceneFile::load(config.as_deref())?;
            if font.is_some() {
                file.label.font_path = font;
            }
            let loader = FsTextureLoader::new(file.texture_root(config.as_deref()));
            tracing::info!(root = %loader.root().display(), frames, "starting demo");

            let report = demo::run(&file, &loader, frames)?;
            print!("{}", report.render);
            println!(
                "Frames: {}, walls: {}, hover changes: {}, clicks: {}, scene events: {}, distortion: {}",
                report.frames,
                report.walls,
                report.hover_changes,
                report.clicks,
                report.scene_events,
                if report.distortion_installed {
                    "installed"
                } else {
                    "none"
                }
            );
        }
        Commands::Raster { text, out, font } => {
            let rasterizer = match font {
                Some(path) => TextRasterizer::from_font_file(&path)?,
                None => TextRasterizer::load(None),
            };
            rasterizer
                .rasterize(&text)
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {:?} to {}", text, out.display());
        }
    }

    Ok(())
}
