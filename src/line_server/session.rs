use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

use super::error::ServerError;
use super::ServerResult;
use crate::core::{ConnectFour, FinishedState, GameError, GameState, Player, PlayerId};

/// Result of a single move attempt as seen by the participant who made it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveOutcome {
    Accepted { row: usize, column: usize },
    ColumnFull,
    OutOfRange,
    NotYourTurn,
    Win(PlayerId),
    Draw,
    /// The game had already finished before the attempt.
    GameOver(GameState),
}

impl MoveOutcome {
    /// Final state when the move ended the game or found it already over.
    pub fn finished(&self) -> Option<FinishedState> {
        match self {
            MoveOutcome::Win(winner) => Some(FinishedState::Win(*winner)),
            MoveOutcome::Draw => Some(FinishedState::Draw),
            MoveOutcome::GameOver(state) => state.finished(),
            _ => None,
        }
    }
}

/// State broadcast to every handler whenever it changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub registered: usize,
    pub state: GameState,
}

impl Progress {
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_turn_of(&self, id: PlayerId) -> bool {
        self.state.current_turn() == Some(id)
    }
}

/// Read-only view of the game used to render it for a participant.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<String>,
    pub state: GameState,
}

#[derive(Debug)]
struct Inner {
    game: ConnectFour,
    completion: Option<oneshot::Sender<GameState>>,
}

/// Authoritative owner of one game. Clones share the same game.
///
/// Every operation takes the single mutex for its whole duration, so moves, registrations
/// and snapshots never interleave. State changes are published on a watch channel while the
/// lock is held, which keeps the published order equal to the applied order.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<Progress>>,
}

impl Session {
    /// Creates a session together with the receiver that gets the final state exactly once.
    pub fn new() -> (Self, oneshot::Receiver<GameState>) {
        let game = ConnectFour::new();
        let (completion_sender, completion_receiver) = oneshot::channel();
        let (updates, _) = watch::channel(Progress {
            registered: 0,
            state: game.state(),
        });
        let session = Self {
            inner: Arc::new(Mutex::new(Inner {
                game,
                completion: Some(completion_sender),
            })),
            updates: Arc::new(updates),
        };
        (session, completion_receiver)
    }

    /// Latest published progress.
    pub fn progress(&self) -> Progress {
        *self.updates.borrow()
    }

    /// Binds the display name of player `id`.
    pub fn register(&self, id: PlayerId, name: &str) -> ServerResult<()> {
        let mut guard = self.inner.lock()?;
        guard.game.register(id, name)?;
        info!(player = id, name, "player registered");
        self.publish(&guard);
        Ok(())
    }

    /// Validates and applies a move of player `id`.
    pub fn attempt_move(&self, id: PlayerId, column: i64) -> ServerResult<MoveOutcome> {
        let mut guard = self.inner.lock()?;
        let outcome = match guard.game.update(id, column) {
            Ok((index, GameState::Turn(_))) => MoveOutcome::Accepted {
                row: index.row(),
                column: index.col(),
            },
            Ok((_, state @ GameState::Finished(finished))) => {
                Self::complete(&mut guard, state);
                match finished {
                    FinishedState::Win(winner) => MoveOutcome::Win(winner),
                    FinishedState::Draw => MoveOutcome::Draw,
                    FinishedState::Aborted(_) => MoveOutcome::GameOver(state),
                }
            }
            Err(GameError::NotYourTurn { .. }) => MoveOutcome::NotYourTurn,
            Err(GameError::ColumnOutOfRange { .. }) => MoveOutcome::OutOfRange,
            Err(GameError::ColumnFull { .. }) => MoveOutcome::ColumnFull,
            Err(GameError::GameIsFinished) => MoveOutcome::GameOver(guard.game.state()),
            Err(err) => return Err(err.into()),
        };
        debug!(player = id, column, ?outcome, "move attempted");
        if !matches!(
            outcome,
            MoveOutcome::ColumnFull
                | MoveOutcome::OutOfRange
                | MoveOutcome::NotYourTurn
                | MoveOutcome::GameOver(_)
        ) {
            self.publish(&guard);
        }
        Ok(outcome)
    }

    pub fn snapshot(&self) -> ServerResult<Snapshot> {
        let guard = self.inner.lock()?;
        Ok(Snapshot {
            rows: guard.game.board().rows(),
            state: guard.game.state(),
        })
    }

    pub fn player_name(&self, id: PlayerId) -> ServerResult<Option<String>> {
        let guard = self.inner.lock()?;
        Ok(guard.game.player_name(id).map(str::to_string))
    }

    pub fn players(&self) -> ServerResult<Vec<Player>> {
        let guard = self.inner.lock()?;
        Ok(guard.game.players().as_slice().to_vec())
    }

    /// Ends the game because player `id` is gone. No-op on a finished game.
    pub fn abort(&self, id: PlayerId) -> ServerResult<GameState> {
        self.finish_early(Some(id))
    }

    /// Ends the game on behalf of the server. No-op on a finished game.
    pub fn shutdown(&self) -> ServerResult<GameState> {
        self.finish_early(None)
    }

    fn finish_early(&self, id: Option<PlayerId>) -> ServerResult<GameState> {
        let mut guard = self.inner.lock()?;
        if guard.game.is_finished() {
            return Ok(guard.game.state());
        }
        let state = guard.game.abort(id);
        info!(player = ?id, "session aborted");
        Self::complete(&mut guard, state);
        self.publish(&guard);
        Ok(state)
    }

    /// Waits until both players registered or the game finished.
    pub async fn wait_for_players(&self) -> ServerResult<Progress> {
        self.wait_until(|progress| progress.registered == 2 || progress.is_finished())
            .await
    }

    pub async fn wait_for_finish(&self) -> ServerResult<Progress> {
        self.wait_until(Progress::is_finished).await
    }

    /// Waits until it is player `id`'s turn or the game finished.
    pub async fn wait_for_turn(&self, id: PlayerId) -> ServerResult<Progress> {
        self.wait_until(|progress| progress.is_turn_of(id) || progress.is_finished())
            .await
    }

    async fn wait_until(&self, f: impl FnMut(&Progress) -> bool) -> ServerResult<Progress> {
        let mut updates = self.updates.subscribe();
        let progress = updates
            .wait_for(f)
            .await
            .map_err(|_| ServerError::SessionClosed)?;
        Ok(*progress)
    }

    fn publish(&self, inner: &Inner) {
        let progress = Progress {
            registered: inner
                .game
                .players()
                .as_slice()
                .iter()
                .filter(|player| player.is_registered())
                .count(),
            state: inner.game.state(),
        };
        self.updates.send_replace(progress);
    }

    fn complete(inner: &mut Inner, state: GameState) {
        let Some(sender) = inner.completion.take() else {
            return;
        };
        if sender.send(state).is_err() {
            debug!("completion receiver is gone");
        }
    }
}

#[cfg(test)]
pub(super) struct HeldSession<'a> {
    session: &'a Session,
    guard: std::sync::MutexGuard<'a, Inner>,
}

#[cfg(test)]
impl Session {
    /// Takes the session lock until the returned guard is dropped.
    pub(super) fn hold(&self) -> HeldSession<'_> {
        HeldSession {
            session: self,
            guard: self.inner.lock().unwrap(),
        }
    }
}

#[cfg(test)]
impl HeldSession<'_> {
    /// Applies a move without releasing the lock.
    pub(super) fn apply_move(&mut self, id: PlayerId, column: i64) {
        self.guard.game.update(id, column).unwrap();
        self.session.publish(&self.guard);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{HEIGHT, WIDTH};

    fn registered_session() -> (Session, oneshot::Receiver<GameState>) {
        let (session, completion) = Session::new();
        session.register(1, "Alice").unwrap();
        session.register(2, "Bob").unwrap();
        (session, completion)
    }

    #[test]
    fn test_turn_alternates_only_on_accepted_moves() {
        let (session, _completion) = registered_session();

        assert_eq!(
            session.attempt_move(1, 0).unwrap(),
            MoveOutcome::Accepted {
                row: HEIGHT - 1,
                column: 0
            }
        );
        assert_eq!(session.snapshot().unwrap().state, GameState::Turn(2));

        for bad in [WIDTH as i64, -1] {
            assert_eq!(session.attempt_move(2, bad).unwrap(), MoveOutcome::OutOfRange);
            assert_eq!(session.snapshot().unwrap().state, GameState::Turn(2));
        }
        assert_eq!(session.attempt_move(1, 1).unwrap(), MoveOutcome::NotYourTurn);
        assert_eq!(session.snapshot().unwrap().state, GameState::Turn(2));
    }

    #[test]
    fn test_not_your_turn_leaves_board_unchanged() {
        let (session, _completion) = registered_session();
        let before = session.snapshot().unwrap();
        assert_eq!(session.attempt_move(2, 3).unwrap(), MoveOutcome::NotYourTurn);
        assert_eq!(session.snapshot().unwrap(), before);
    }

    #[test]
    fn test_column_fills_then_rejects() {
        let (session, _completion) = registered_session();
        let mut player = 1;
        for k in 0..HEIGHT {
            assert_eq!(
                session.attempt_move(player, 3).unwrap(),
                MoveOutcome::Accepted {
                    row: HEIGHT - 1 - k,
                    column: 3
                }
            );
            player = 3 - player;
        }
        assert_eq!(session.attempt_move(player, 3).unwrap(), MoveOutcome::ColumnFull);
        assert_eq!(session.snapshot().unwrap().state, GameState::Turn(player));
    }

    #[test]
    fn test_win_completes_once() {
        let (session, mut completion) = registered_session();
        for col in 0..3 {
            session.attempt_move(1, col).unwrap();
            session.attempt_move(2, col).unwrap();
        }
        assert!(completion.try_recv().is_err());
        assert_eq!(session.attempt_move(1, 3).unwrap(), MoveOutcome::Win(1));

        let finished = GameState::Finished(FinishedState::Win(1));
        assert_eq!(completion.try_recv().unwrap(), finished);
        assert_eq!(
            session.attempt_move(2, 4).unwrap(),
            MoveOutcome::GameOver(finished)
        );
        // aborting after the win keeps the result
        assert_eq!(session.abort(2).unwrap(), finished);
        assert_eq!(session.progress().state, finished);
    }

    #[test]
    fn test_abort_is_published() {
        let (session, mut completion) = registered_session();
        let aborted = GameState::Finished(FinishedState::Aborted(Some(2)));
        assert_eq!(session.abort(2).unwrap(), aborted);
        assert_eq!(session.progress().state, aborted);
        assert_eq!(completion.try_recv().unwrap(), aborted);
        assert_eq!(
            session.attempt_move(1, 0).unwrap(),
            MoveOutcome::GameOver(aborted)
        );
    }

    #[test]
    fn test_registration_progress() {
        let (session, _completion) = Session::new();
        assert_eq!(session.progress().registered, 0);
        session.register(2, "Bob").unwrap();
        assert_eq!(session.progress().registered, 1);
        assert_eq!(session.player_name(2).unwrap().as_deref(), Some("Bob"));
        assert_eq!(session.player_name(1).unwrap(), None);
        assert!(session.register(3, "Eve").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_turn_wakes_on_move() {
        let (session, _completion) = registered_session();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_for_turn(2).await })
        };
        tokio::task::yield_now().await;
        session.attempt_move(1, 0).unwrap();
        let progress = waiter.await.unwrap().unwrap();
        assert!(progress.is_turn_of(2));
    }

    #[tokio::test]
    async fn test_wait_for_turn_wakes_on_abort() {
        let (session, _completion) = registered_session();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_for_turn(2).await })
        };
        session.abort(1).unwrap();
        let progress = waiter.await.unwrap().unwrap();
        assert!(progress.is_finished());
    }

    #[tokio::test]
    async fn test_wait_for_finish_ignores_moves() {
        let (session, _completion) = registered_session();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_for_finish().await })
        };
        session.attempt_move(1, 0).unwrap();
        session.attempt_move(2, 1).unwrap();
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        session.shutdown().unwrap();
        let progress = waiter.await.unwrap().unwrap();
        assert_eq!(
            progress.state,
            GameState::Finished(FinishedState::Aborted(None))
        );
    }

    #[test]
    fn test_outcome_finished_state() {
        assert_eq!(
            MoveOutcome::Win(2).finished(),
            Some(FinishedState::Win(2))
        );
        assert_eq!(MoveOutcome::Draw.finished(), Some(FinishedState::Draw));
        assert_eq!(
            MoveOutcome::GameOver(GameState::Finished(FinishedState::Aborted(Some(1)))).finished(),
            Some(FinishedState::Aborted(Some(1)))
        );
        assert_eq!(MoveOutcome::NotYourTurn.finished(), None);
        assert_eq!(MoveOutcome::Accepted { row: 5, column: 0 }.finished(), None);
    }

    #[tokio::test]
    async fn test_wait_for_players() {
        let (session, _completion) = Session::new();
        session.register(1, "Alice").unwrap();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_for_players().await })
        };
        session.register(2, "Bob").unwrap();
        let progress = waiter.await.unwrap().unwrap();
        assert_eq!(progress.registered, 2);
        assert_eq!(progress.state, GameState::Turn(1));
    }

    #[test]
    fn test_concurrent_moves_apply_only_valid_turns() {
        let (session, _completion) = registered_session();
        let before = session.snapshot().unwrap();

        // both players hammer their own pair of columns from separate threads
        let handles: Vec<_> = [1u8, 2u8]
            .into_iter()
            .map(|id| {
                let session = session.clone();
                std::thread::spawn(move || {
                    let mut placed = 0;
                    for attempt in 0..50i64 {
                        let column = i64::from(id - 1) * 3 + attempt % 2;
                        match session.attempt_move(id, column).unwrap() {
                            MoveOutcome::Accepted { .. } | MoveOutcome::Win(_) | MoveOutcome::Draw => {
                                placed += 1
                            }
                            _ => {}
                        }
                    }
                    placed
                })
            })
            .collect();
        let placed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let after = session.snapshot().unwrap();
        let count = |rows: &[String]| {
            rows.iter()
                .flat_map(|row| row.split(' '))
                .filter(|cell| *cell != "0")
                .count()
        };
        assert_eq!(count(&after.rows) - count(&before.rows), placed);
        assert!(placed <= 4 * HEIGHT);
    }
}
