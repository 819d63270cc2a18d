use super::board::WIDTH;
use super::PlayerId;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GameError {
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),
    #[error("column {found} is out of range (expected: 0-{max_expected})")]
    ColumnOutOfRange { max_expected: usize, found: i64 },
    #[error("column {col} is full")]
    ColumnFull { col: usize },
    #[error("can't make turn on a finished game")]
    GameIsFinished,
    #[error("other player's turn (expected: {expected}, found: {found})")]
    NotYourTurn {
        expected: PlayerId,
        found: PlayerId,
    },
    #[error("failed to switch players in the pool")]
    PlayerPoolCorrupted,
}

impl GameError {
    pub fn column_out_of_range(found: i64) -> Self {
        Self::ColumnOutOfRange {
            max_expected: WIDTH - 1,
            found,
        }
    }

    pub fn column_full(col: usize) -> Self {
        Self::ColumnFull { col }
    }

    pub fn not_your_turn(expected: PlayerId, found: PlayerId) -> Self {
        Self::NotYourTurn { expected, found }
    }
}
