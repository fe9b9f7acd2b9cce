//! Tiles (cards) placed on the board.

use crate::animation::{PendingAnimation, TileStyle};
use crate::error::{BoardError, BoardResult};
use crate::position::Position;
use kurbo::{Point, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Stable identifier of a tile in the board's arena.
pub type TileId = Uuid;

/// Font size used when a card does not specify one.
pub const DEFAULT_FONT_SIZE: u32 = 60;

/// Card metadata, as supplied by the startup dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMeta {
    /// Label. May contain inline markup for the renderer.
    pub name: String,
    /// Displayed ordinal. Overwritten by renumbering once placed.
    #[serde(default)]
    pub num: u32,
    /// Background color code (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub background: String,
    /// Image reference (URL or path).
    #[serde(default)]
    pub main_img: String,
    /// Font size of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<u32>,
}

impl TileMeta {
    pub fn new(name: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num: 0,
            background: background.into(),
            main_img: String::new(),
            font: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.main_img = image.into();
        self
    }

    pub fn with_font(mut self, size: u32) -> Self {
        self.font = Some(size);
        self
    }

    /// Font size, falling back to [`DEFAULT_FONT_SIZE`].
    pub fn font_size(&self) -> u32 {
        self.font.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Label with inline markup removed.
    pub fn plain_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut in_tag = false;
        for c in self.name.chars() {
            match c {
                '<' => in_tag = true,
                '>' if in_tag => in_tag = false,
                _ if !in_tag => out.push(c),
                _ => {}
            }
        }
        out
    }
}

/// Editable fields of a tile, exchanged with the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEdit {
    pub name: String,
    pub font_size: u32,
    pub background: String,
    pub image: String,
    pub number_visible: bool,
}

/// Edit-form collaborator.
///
/// Receives the current values and returns the edited ones, or `None` if
/// the user cancelled.
pub trait TileEditor {
    fn edit(&mut self, current: &TileEdit) -> Option<TileEdit>;
}

impl<F> TileEditor for F
where
    F: FnMut(&TileEdit) -> Option<TileEdit>,
{
    fn edit(&mut self, current: &TileEdit) -> Option<TileEdit> {
        self(current)
    }
}

/// A card placed on the board.
#[derive(Debug, Clone)]
pub struct Tile {
    id: TileId,
    meta: TileMeta,
    position: Position,
    number_visible: bool,
    style: TileStyle,
    /// Where the renderer currently shows the tile, in board units.
    visual_offset: Point,
    pending: Option<PendingAnimation>,
}

impl Tile {
    pub(crate) fn new(meta: TileMeta, position: Position, cell: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            meta,
            position,
            number_visible: true,
            style: TileStyle::RESTING,
            visual_offset: position.origin(cell),
            pending: None,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn meta(&self) -> &TileMeta {
        &self.meta
    }

    /// Committed cell of this tile.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Displayed ordinal.
    pub fn number(&self) -> u32 {
        self.meta.num
    }

    pub fn is_number_visible(&self) -> bool {
        self.number_visible
    }

    pub fn style(&self) -> TileStyle {
        self.style
    }

    pub fn visual_offset(&self) -> Point {
        self.visual_offset
    }

    /// Check whether a style revert is still scheduled.
    pub fn has_pending_animation(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Parsed background color, if the code is valid.
    pub fn background_color(&self) -> Option<Color> {
        parse_color(&self.meta.background)
    }

    /// Deadline of the next scheduled style step.
    pub fn next_animation_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(PendingAnimation::next_deadline)
    }

    /// Current values for the edit form.
    pub fn edit_form(&self) -> TileEdit {
        TileEdit {
            name: self.meta.name.clone(),
            font_size: self.meta.font_size(),
            background: self.meta.background.clone(),
            image: self.meta.main_img.clone(),
            number_visible: self.number_visible,
        }
    }

    pub(crate) fn apply_edit(&mut self, edit: TileEdit) -> BoardResult<()> {
        if edit.font_size == 0 {
            return Err(BoardError::InvalidEdit("font size must be positive".into()));
        }
        if parse_color(&edit.background).is_none() {
            return Err(BoardError::InvalidEdit(format!(
                "not a color code: {}",
                edit.background
            )));
        }
        self.meta.name = edit.name;
        self.meta.font = Some(edit.font_size);
        self.meta.background = edit.background;
        self.meta.main_img = edit.image;
        self.number_visible = edit.number_visible;
        Ok(())
    }

    pub(crate) fn into_meta(self) -> TileMeta {
        self.meta
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.meta.num = number;
    }

    pub(crate) fn set_number_visible(&mut self, visible: bool) {
        self.number_visible = visible;
    }

    pub(crate) fn set_style(&mut self, style: TileStyle) {
        self.style = style;
    }

    pub(crate) fn set_visual_offset(&mut self, offset: Point) {
        self.visual_offset = offset;
    }

    /// Install a new pending animation, cancelling the previous one.
    pub(crate) fn start_animation(&mut self, pending: PendingAnimation) {
        if let Some(old) = self.pending.replace(pending) {
            if !old.is_finished() {
                log::trace!("Tile {} superseded a pending transition", self.id);
            }
        }
    }

    pub(crate) fn cancel_animation(&mut self) {
        self.pending = None;
    }

    /// Apply due animation steps and return the resulting style, if any.
    pub(crate) fn poll_animation(&mut self, now: Instant) -> Option<TileStyle> {
        let pending = self.pending.as_mut()?;
        let style = pending.poll(now);
        if pending.is_finished() {
            self.pending = None;
        }
        if let Some(style) = style {
            self.style = style;
        }
        style
    }
}

/// Parse a hex color code (`#rgb`, `#rrggbb`, `#rrggbbaa`).
pub fn parse_color(code: &str) -> Option<Color> {
    let hex = code.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            let r = channel(0..1)? * 17;
            let g = channel(1..2)? * 17;
            let b = channel(2..3)? * 17;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}
