use std::fmt::{Display, Formatter};
use std::ops::Deref;

use generic_array::typenum::{Unsigned, U6, U7};

use super::error::GameError;
use super::grid::{Grid, GridIndex, GridIterator};
use super::PlayerId;

pub type Height = U6;
pub type Width = U7;

pub const HEIGHT: usize = Height::USIZE;
pub const WIDTH: usize = Width::USIZE;

/// Number of same-player cells in a line that wins the game.
pub const LINE_LENGTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardCell(pub Option<PlayerId>);

impl Default for BoardCell {
    fn default() -> Self {
        Self(None)
    }
}

impl Display for BoardCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(player) => write!(f, "{}", player),
            None => f.write_str("0"),
        }
    }
}

impl From<PlayerId> for BoardCell {
    fn from(value: PlayerId) -> Self {
        Self(Some(value))
    }
}

impl Deref for BoardCell {
    type Target = Option<PlayerId>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Column index that is known to be inside the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column(usize);

impl Column {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for Column {
    type Error = GameError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match usize::try_from(value) {
            Ok(col) if col < WIDTH => Ok(Self(col)),
            _ => Err(GameError::column_out_of_range(value)),
        }
    }
}

/// Connect Four playing field. Pieces fall to the lowest empty cell of a column.
#[derive(Clone, Debug, Default)]
pub struct Board {
    field: Grid<BoardCell, Height, Width>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `player` into the lowest empty cell of `column` and returns its row,
    /// or `None` if the column is full.
    pub fn drop_piece(&mut self, column: Column, player: PlayerId) -> Option<usize> {
        let bottom = GridIndex::new(HEIGHT - 1, column.index());
        let (index, _) = self
            .field
            .top_iter(bottom)
            .indexed()
            .find(|(_, cell)| cell.is_none())?;
        self.field[index] = player.into();
        Some(index.row())
    }

    /// Returns `true` if `player` owns [`LINE_LENGTH`] contiguous cells in a row,
    /// a column or either diagonal.
    pub fn check_win(&self, player: PlayerId) -> bool {
        let owned = BoardCell::from(player);
        self.field
            .all_indexed()
            .filter(|(_, cell)| **cell == owned)
            .any(|(start, _)| {
                self.lines_from(start).into_iter().any(|line| {
                    line.take(LINE_LENGTH)
                        .take_while(|&&cell| cell == owned)
                        .count()
                        == LINE_LENGTH
                })
            })
    }

    /// Every line that could start at `start`: horizontal, vertical, diagonal down-right
    /// and diagonal down-left. Iterators end at the board edge.
    fn lines_from(&self, start: GridIndex) -> [GridIterator<'_, BoardCell, Height, Width>; 4] {
        [
            self.field.right_iter(start),
            self.field.bottom_iter(start),
            self.field.bottom_right_iter(start),
            self.field.bottom_left_iter(start),
        ]
    }

    /// Returns `true` when no column accepts another piece.
    pub fn is_full(&self) -> bool {
        self.field
            .right_iter(GridIndex::new(0, 0))
            .all(|cell| cell.is_some())
    }

    /// Renders every row top to bottom as `WIDTH` space-separated cell values.
    pub fn rows(&self) -> Vec<String> {
        self.field
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}
