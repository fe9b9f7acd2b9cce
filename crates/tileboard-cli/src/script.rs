//! Replay scripts: a JSON list of board operations and pointer events.
//!
//! ```json
//! [
//!   { "op": "add", "name": "Saki", "background": "#f78b8b" },
//!   { "op": "pointer", "event": { "type": "down", "pointer": 1, "position": { "x": 168, "y": 283 } } },
//!   { "op": "wait", "ms": 300 },
//!   { "op": "resize", "rows": 2 }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tileboard_core::{
    Board, BoardResult, JsonExporter, PointerEvent, Position, TileEdit, TileMeta, TileRenderer,
};

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Place a card in the first empty cell.
    Add {
        #[serde(flatten)]
        card: TileMeta,
    },
    /// Feed a pointer event at the current script time.
    Pointer { event: PointerEvent },
    /// Advance script time and run due timers.
    Wait { ms: u64 },
    Resize {
        #[serde(default)]
        rows: Option<usize>,
        #[serde(default)]
        cols: Option<usize>,
    },
    Move { from: Position, to: Position },
    Delete { x: usize, y: usize },
    Edit { x: usize, y: usize, edit: TileEdit },
    Numbers { visible: bool },
    Clear,
    ResetView,
    /// Print the board snapshot as JSON.
    Export {
        #[serde(default = "default_quality")]
        quality: f64,
        #[serde(default)]
        pretty: bool,
    },
}

fn default_quality() -> f64 {
    1.0
}

pub fn parse(json: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(json)
}

/// Drives a board through a script with a virtual clock.
pub struct Runner<'a, R: TileRenderer> {
    board: &'a mut Board<R>,
    start: Instant,
    elapsed: Duration,
    /// Output of `export` steps, in order.
    pub exports: Vec<String>,
}

impl<'a, R: TileRenderer> Runner<'a, R> {
    pub fn new(board: &'a mut Board<R>) -> Self {
        let start = board.now();
        Self {
            board,
            start,
            elapsed: Duration::ZERO,
            exports: Vec::new(),
        }
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Run every step. Declined operations (a full board, a cell without a
    /// tile) are logged and skipped; other errors stop the run.
    pub fn run(&mut self, steps: &[Step]) -> BoardResult<()> {
        for (index, step) in steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", index, step);
            self.step(step)?;
        }
        Ok(())
    }

    fn step(&mut self, step: &Step) -> BoardResult<()> {
        match step {
            Step::Add { card } => {
                if let Err(e) = self.board.add_card(card.clone()) {
                    log::warn!("add {:?}: {}", card.name, e);
                }
            }
            Step::Pointer { event } => {
                let now = self.now();
                self.board.handle_pointer(event.clone(), now);
            }
            Step::Wait { ms } => {
                self.elapsed += Duration::from_millis(*ms);
                let now = self.now();
                self.board.tick(now);
            }
            Step::Resize { rows, cols } => {
                if let Some(rows) = rows {
                    self.board.set_height(*rows)?;
                }
                if let Some(cols) = cols {
                    self.board.set_width(*cols)?;
                }
            }
            Step::Move { from, to } => match self.board.tile_at(*from).map(|t| t.id()) {
                Some(id) => {
                    self.board.move_tile(id, *to)?;
                }
                None => log::warn!("move: no tile at {}", from),
            },
            Step::Delete { x, y } => {
                let pos = Position::new(*x, *y);
                match self.board.tile_at(pos).map(|t| t.id()) {
                    Some(id) => {
                        self.board.delete_tile(id)?;
                    }
                    None => log::warn!("delete: no tile at {}", pos),
                }
            }
            Step::Edit { x, y, edit } => {
                let pos = Position::new(*x, *y);
                match self.board.tile_at(pos).map(|t| t.id()) {
                    Some(id) => {
                        self.board
                            .edit_tile(id, &mut |_: &TileEdit| Some(edit.clone()))?;
                    }
                    None => log::warn!("edit: no tile at {}", pos),
                }
            }
            Step::Numbers { visible } => self.board.set_numbers_visible(*visible),
            Step::Clear => {
                self.board.clear();
            }
            Step::ResetView => self.board.reset_view(),
            Step::Export { quality, pretty } => {
                let mut exporter = JsonExporter { pretty: *pretty };
                let out = self.board.export(&mut exporter, *quality)?;
                self.exports.push(out);
            }
        }
        Ok(())
    }
}

/// Plain-text picture of the board, one line per row.
pub fn render_text<R: TileRenderer>(board: &Board<R>) -> String {
    let mut out = String::new();
    for y in 0..board.height() {
        let cells: Vec<String> = (0..board.width())
            .map(|x| match board.tile_at(Position::new(x, y)) {
                Some(tile) if tile.is_number_visible() => {
                    format!("[{:>2} {}]", tile.number(), tile.meta().plain_name())
                }
                Some(tile) => format!("[{}]", tile.meta().plain_name()),
                None => "[ . ]".to_string(),
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use tileboard_core::RecordingRenderer;

    const SCRIPT: &str = r##"[
        { "op": "add", "name": "A", "background": "#f00" },
        { "op": "add", "name": "B", "background": "#0f0", "font": 45 },
        { "op": "add", "name": "C", "background": "#00f" },
        { "op": "pointer", "event": { "type": "down", "pointer": 1, "position": { "x": 168.0, "y": 283.0 } } },
        { "op": "pointer", "event": { "type": "move", "pointer": 1, "position": { "x": 484.0, "y": 283.0 } } },
        { "op": "pointer", "event": { "type": "up", "pointer": 1, "position": { "x": 484.0, "y": 283.0 } } },
        { "op": "wait", "ms": 600 },
        { "op": "delete", "x": 0, "y": 1 },
        { "op": "export", "quality": 1.2 }
    ]"##;

    #[test]
    fn test_parse_steps() {
        let steps = parse(SCRIPT).unwrap();
        assert_eq!(steps.len(), 9);
        match &steps[1] {
            Step::Add { card } => assert_eq!(card.font_size(), 45),
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(
            steps[4],
            Step::Pointer {
                event: PointerEvent::moved(1, Point::new(484.0, 283.0))
            }
        );
    }

    #[test]
    fn test_run_script() {
        let mut board = Board::with_renderer(2, 2, RecordingRenderer::new()).unwrap();
        let mut runner = Runner::new(&mut board);
        runner.run(&parse(SCRIPT).unwrap()).unwrap();
        assert_eq!(runner.exports.len(), 1);
        assert!(runner.exports[0].contains("\"quality\":1.0"));

        assert_eq!(render_text(&board), "[ 1 B] [ 2 A]\n[ . ] [ . ]\n");
        assert!(board.next_deadline().is_none());
    }

    #[test]
    fn test_missing_tile_is_skipped() {
        let mut board = Board::new(1, 1).unwrap();
        let steps = parse(r#"[{ "op": "delete", "x": 0, "y": 0 }, { "op": "numbers", "visible": false }]"#).unwrap();
        assert!(Runner::new(&mut board).run(&steps).is_ok());
    }

    #[test]
    fn test_invalid_resize_stops_run() {
        let mut board = Board::new(1, 1).unwrap();
        let steps = parse(r#"[{ "op": "resize", "cols": 0 }]"#).unwrap();
        assert!(Runner::new(&mut board).run(&steps).is_err());
    }
}
