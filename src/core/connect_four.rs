use super::board::{Board, Column};
use super::error::GameError;
use super::grid::GridIndex;
use super::player_pool::{Player, PlayerPool};
use super::{FinishedState, GameResult, GameState, PlayerId, PLAYER_IDS};

/// Rules of a single Connect Four game. Holds no locks, callers serialize access.
#[derive(Clone, Debug)]
pub struct ConnectFour {
    players: PlayerPool,
    state: GameState,
    board: Board,
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectFour {
    pub fn new() -> Self {
        Self {
            players: PlayerPool::new(PLAYER_IDS),
            state: GameState::Turn(PLAYER_IDS[0]),
            board: Board::new(),
        }
    }

    /// Drops a piece of player `id` into `column` and returns the cell it landed in
    /// together with the new game state.
    ///
    /// Checks are applied in order: finished game, turn, column range, column capacity.
    /// A rejected move leaves the board and the turn untouched.
    pub fn update(&mut self, id: PlayerId, column: i64) -> GameResult<(GridIndex, GameState)> {
        if self.is_finished() {
            return Err(GameError::GameIsFinished);
        }
        let current = self.get_current_player()?.id();
        if id != current {
            return Err(GameError::not_your_turn(current, id));
        }
        let column = Column::try_from(column)?;
        let row = self
            .board
            .drop_piece(column, id)
            .ok_or(GameError::column_full(column.index()))?;
        let index = GridIndex::new(row, column.index());

        if self.board.check_win(id) {
            return Ok((index, self.set_winner(id)));
        }
        if self.board.is_full() {
            return Ok((index, self.set_draw()));
        }
        Ok((index, self.switch_player()?))
    }

    /// Binds a display name to the seat `id`.
    pub fn register(&mut self, id: PlayerId, name: impl Into<String>) -> GameResult<()> {
        self.players
            .find_mut(id)
            .ok_or(GameError::PlayerNotFound(id))?
            .set_name(name);
        Ok(())
    }

    /// Ends an unfinished game because player `id` left, or the server stopped it when
    /// `id` is `None`. Finished games keep their result.
    pub fn abort(&mut self, id: Option<PlayerId>) -> GameState {
        if !self.is_finished() {
            self.set_state(GameState::Finished(FinishedState::Aborted(id)));
        }
        self.state()
    }

    pub fn player_name(&self, id: PlayerId) -> Option<&str> {
        self.players.find(id).and_then(Player::name)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &PlayerPool {
        &self.players
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    fn set_winner(&mut self, id: PlayerId) -> GameState {
        self.set_state(GameState::Finished(FinishedState::Win(id)));
        self.state()
    }

    fn set_draw(&mut self) -> GameState {
        self.set_state(GameState::Finished(FinishedState::Draw));
        self.state()
    }

    fn get_current_player(&self) -> GameResult<&Player> {
        self.players
            .get_current()
            .ok_or(GameError::PlayerPoolCorrupted)
    }

    fn switch_player(&mut self) -> GameResult<GameState> {
        let next_player = self
            .players
            .next()
            .ok_or(GameError::PlayerPoolCorrupted)?
            .id();
        self.set_state(GameState::Turn(next_player));
        Ok(self.state())
    }
}
