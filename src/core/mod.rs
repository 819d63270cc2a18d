pub mod board;
pub mod grid;

mod connect_four;
mod error;
mod player_pool;

use std::fmt::{Display, Formatter};

pub use board::{Board, BoardCell, Column, HEIGHT, WIDTH};
pub use connect_four::ConnectFour;
pub use error::GameError;
pub use player_pool::{Player, PlayerPool};

pub type GameResult<T> = Result<T, GameError>;
pub type PlayerId = u8;

/// Seats in turn order, the first one moves first.
pub const PLAYER_IDS: [PlayerId; 2] = [1, 2];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FinishedState {
    Win(PlayerId),
    Draw,
    /// The game was abandoned by the given player, `None` when the server shut it down.
    Aborted(Option<PlayerId>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameState {
    Turn(PlayerId),
    Finished(FinishedState),
}

impl GameState {
    pub fn is_finished(&self) -> bool {
        matches!(self, GameState::Finished(_))
    }

    pub fn finished(&self) -> Option<FinishedState> {
        match self {
            GameState::Turn(_) => None,
            GameState::Finished(finished) => Some(*finished),
        }
    }

    /// Player who is allowed to move, `None` once the game is over.
    pub fn current_turn(&self) -> Option<PlayerId> {
        match self {
            GameState::Turn(id) => Some(*id),
            GameState::Finished(_) => None,
        }
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::Turn(id) => write!(f, "player {} to move", id),
            GameState::Finished(FinishedState::Win(id)) => write!(f, "player {} won", id),
            GameState::Finished(FinishedState::Draw) => f.write_str("draw"),
            GameState::Finished(FinishedState::Aborted(Some(id))) => {
                write!(f, "aborted by player {}", id)
            }
            GameState::Finished(FinishedState::Aborted(None)) => f.write_str("aborted"),
        }
    }
}
