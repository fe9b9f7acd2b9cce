//! Tileboard command-line tool.
//!
//! Builds a board from a config (the bundled card set by default), replays
//! an optional script against it and prints the resulting grid.
//!
//! ```text
//! tileboard [--config PATH] [--dump-config] [SCRIPT]
//! ```

mod script;

use clap::Parser;
use kurbo::{Affine, Point};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tileboard_core::{
    Board, BoardConfig, BoardError, PointerId, Tile, TileId, TileRenderer, TileStyle,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Parser)]
#[command(
    name = "tileboard",
    about = "Replay pointer and board scripts against a Tileboard grid",
    version
)]
struct Args {
    /// Board configuration (JSON). Defaults to the bundled card set.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    dump_config: bool,

    /// Script of board steps to replay.
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,
}

/// Renderer that reports board updates through the log.
struct LogRenderer;

impl TileRenderer for LogRenderer {
    fn create(&mut self, tile: &Tile) {
        log::debug!("create {} {:?} at {}", tile.id(), tile.meta().plain_name(), tile.position());
    }

    fn update_position(&mut self, id: TileId, offset: Point) {
        log::trace!("position {} -> ({:.1}, {:.1})", id, offset.x, offset.y);
    }

    fn update_meta(&mut self, tile: &Tile) {
        log::debug!(
            "meta {} #{} {:?} number_visible={}",
            tile.id(),
            tile.number(),
            tile.meta().plain_name(),
            tile.is_number_visible()
        );
    }

    fn update_style(&mut self, id: TileId, style: TileStyle) {
        log::trace!("style {} {:?}", id, style);
    }

    fn remove(&mut self, id: TileId) {
        log::debug!("remove {}", id);
    }

    fn show_preview(&mut self, pointer: PointerId, offset: Point) {
        log::debug!("preview {} at ({:.1}, {:.1})", pointer, offset.x, offset.y);
    }

    fn remove_preview(&mut self, pointer: PointerId) {
        log::debug!("preview {} removed", pointer);
    }

    fn set_board_transform(&mut self, transform: Affine, shadow: bool) {
        log::trace!("board transform {:?} shadow={}", transform.as_coeffs(), shadow);
    }

    fn show_context_menu(&mut self, tile: TileId, position: Point) {
        log::info!("context menu for {} at ({:.1}, {:.1})", tile, position.x, position.y);
    }

    fn hide_context_menu(&mut self) {
        log::debug!("context menu closed");
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: Args) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => BoardConfig::from_json(&read(path)?)?,
        None => BoardConfig::default(),
    };
    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut board = Board::from_config(&config, LogRenderer)?;
    if let Some(path) = &args.script {
        let steps = script::parse(&read(path)?)?;
        log::info!("Replaying {} steps from {}", steps.len(), path.display());
        let mut runner = script::Runner::new(&mut board);
        runner.run(&steps)?;
        for export in &runner.exports {
            println!("{export}");
        }
    }

    print!("{}", script::render_text(&board));
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Tileboard");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
