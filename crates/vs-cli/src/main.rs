//! Vecsprite CLI: headless access to the sprite workbench.
//!
//! Reads an upload response (the parser service JSON) from disk and renders
//! atlases and frames to SVG, or exports shape command lists.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "vecsprite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a dataset and report its diagnostics
    Inspect {
        /// Upload response JSON
        input: PathBuf,
    },

    /// Render the shape atlas to SVG
    Atlas {
        input: PathBuf,

        /// Viewport width the grid is laid out for
        #[arg(short, long, default_value = "800")]
        width: f64,

        /// Cell edge in pixels
        #[arg(long, default_value = "150", value_parser = commands::parse_cell_size)]
        cell_size: f64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one frame of a sprite (or a lone shape) to SVG
    Frame {
        input: PathBuf,

        /// Sprite or shape charId
        #[arg(long)]
        id: u32,

        /// Frame index, wrapped to the sprite's frame count
        #[arg(short, long, default_value = "0")]
        frame: usize,

        #[arg(long, default_value = "800")]
        width: f64,

        #[arg(long, default_value = "600")]
        height: f64,

        /// Ignore instance matrices
        #[arg(long)]
        no_transforms: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a shape's command list as JSON
    Shape {
        input: PathBuf,

        #[arg(long)]
        id: u32,

        /// Normalize against a reference canvas, e.g. `300x200`
        #[arg(long, value_parser = commands::parse_size)]
        normalize: Option<kurbo::Size>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Inspect { input } => commands::inspect(&input),
        Commands::Atlas {
            input,
            width,
            cell_size,
            output,
        } => commands::atlas(&input, width, cell_size, output.as_deref()),
        Commands::Frame {
            input,
            id,
            frame,
            width,
            height,
            no_transforms,
            output,
        } => commands::frame(&input, id, frame, (width, height), !no_transforms, output.as_deref()),
        Commands::Shape { input, id, normalize } => commands::shape(&input, id, normalize),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
