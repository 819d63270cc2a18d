use std::fmt::Display;
use std::future::{Future, IntoFuture};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info, warn};

use super::error::ServerError;
use super::protocol::{self, ServerMessage, MAX_LINE_LENGTH};
use super::session::{MoveOutcome, Progress, Session};
use super::ServerResult;
use crate::core::{FinishedState, GameState, PlayerId};

/// Time limits applied to a participant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandlerSettings {
    pub name_timeout: Duration,
    pub turn_timeout: Duration,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            name_timeout: Duration::from_secs(60),
            turn_timeout: Duration::from_secs(300),
        }
    }
}

/// How the game ended for one participant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerResult {
    Won,
    Lost,
    Draw,
    Aborted,
}

/// Something the handler was woken up by.
#[derive(Debug)]
enum Input {
    Line(String),
    Update(Progress),
}

/// Drives the line protocol for a single participant.
pub struct PlayerHandler<R, W> {
    id: PlayerId,
    session: Session,
    lines: FramedRead<R, LinesCodec>,
    writer: W,
    settings: HandlerSettings,
}

impl<R, W> PlayerHandler<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        id: PlayerId,
        session: Session,
        reader: R,
        writer: W,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            id,
            session,
            lines: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH)),
            writer,
            settings,
        }
    }

    /// Plays the game until it finishes. Any connection failure aborts the whole session so
    /// the opponent is released as well.
    pub async fn run(mut self) -> ServerResult<PlayerResult> {
        let result = self.play().await;
        if let Err(err) = &result {
            warn!(player = self.id, "handler failed: {}", err);
            if let Err(abort_err) = self.session.abort(self.id) {
                warn!(player = self.id, "failed to abort session: {}", abort_err);
            }
            if matches!(err, ServerError::TimedOut { .. }) {
                let _ = self.send(ServerMessage::TimedOut).await;
            }
        }
        if let Err(err) = self.writer.shutdown().await {
            debug!(player = self.id, "failed to close connection: {}", err);
        }
        result
    }

    async fn play(&mut self) -> ServerResult<PlayerResult> {
        self.send(ServerMessage::EnterName).await?;
        let session = self.session.clone();
        let name = loop {
            let input = self
                .next_input(
                    Some(self.settings.name_timeout),
                    "a name",
                    session.wait_for_finish(),
                )
                .await?;
            match input {
                Input::Line(line) => break protocol::display_name(&line, self.id),
                Input::Update(progress) => {
                    if let Some(finished) = progress.state.finished() {
                        return self.finish(finished).await;
                    }
                }
            }
        };
        self.session.register(self.id, &name)?;
        info!(player = self.id, name = %name, "player joined");

        if self.session.progress().registered < 2 {
            self.send(ServerMessage::WaitingForOpponentToJoin).await?;
        }
        loop {
            match self
                .next_input(None, "the opponent", session.wait_for_players())
                .await?
            {
                Input::Line(line) => {
                    debug!(player = self.id, line = %line, "input before game start")
                }
                Input::Update(progress) => match progress.state.finished() {
                    Some(finished) => return self.finish(finished).await,
                    None => break,
                },
            }
        }
        self.send(ServerMessage::GameStarts).await?;

        loop {
            let snapshot = self.session.snapshot()?;
            if let GameState::Finished(finished) = snapshot.state {
                return self.finish(finished).await;
            }
            for row in &snapshot.rows {
                self.send(row).await?;
            }

            let outcome = if snapshot.state.current_turn() == Some(self.id) {
                self.take_turn().await?
            } else {
                self.wait_for_turn().await?
            };
            if let Some(finished) = outcome {
                return self.finish(finished).await;
            }
        }
    }

    /// Prompts for a column and submits it. Returns the result once the game is over.
    async fn take_turn(&mut self) -> ServerResult<Option<FinishedState>> {
        self.send(ServerMessage::YourTurn).await?;
        let session = self.session.clone();
        let input = self
            .next_input(
                Some(self.settings.turn_timeout),
                "a move",
                session.wait_for_finish(),
            )
            .await?;
        match input {
            Input::Update(progress) => Ok(progress.state.finished()),
            Input::Line(line) => match protocol::parse_column(&line) {
                Ok(column) => Ok(self.submit(column).await?.finished()),
                Err(err) => {
                    debug!(player = self.id, line = %line, "unparsable move: {}", err);
                    self.send(ServerMessage::InvalidInput).await?;
                    Ok(None)
                }
            },
        }
    }

    /// Blocks until the opponent moved. Lines sent meanwhile are still submitted so the
    /// session can reject them.
    async fn wait_for_turn(&mut self) -> ServerResult<Option<FinishedState>> {
        self.send(ServerMessage::WaitingForMove).await?;
        let session = self.session.clone();
        loop {
            let input = self
                .next_input(None, "the opponent's move", session.wait_for_turn(self.id))
                .await?;
            match input {
                Input::Update(progress) => return Ok(progress.state.finished()),
                Input::Line(line) => {
                    let Ok(column) = protocol::parse_column(&line) else {
                        self.send(ServerMessage::NotYourTurn).await?;
                        continue;
                    };
                    let outcome = self.submit(column).await?;
                    if outcome != MoveOutcome::NotYourTurn {
                        // the opponent moved before the line reached the session, so the
                        // board has to be sent again
                        return Ok(outcome.finished());
                    }
                }
            }
        }
    }

    /// Applies a move and tells the participant why it was rejected, if it was.
    async fn submit(&mut self, column: i64) -> ServerResult<MoveOutcome> {
        let outcome = self.session.attempt_move(self.id, column)?;
        match outcome {
            MoveOutcome::Accepted { row, column } => {
                info!(player = self.id, row, column, "move accepted")
            }
            MoveOutcome::ColumnFull => self.send(ServerMessage::ColumnFull).await?,
            MoveOutcome::OutOfRange => self.send(ServerMessage::InvalidInput).await?,
            MoveOutcome::NotYourTurn => self.send(ServerMessage::NotYourTurn).await?,
            MoveOutcome::Win(_) | MoveOutcome::Draw | MoveOutcome::GameOver(_) => {}
        }
        Ok(outcome)
    }

    /// Sends the closing board and the personalized result line.
    async fn finish(&mut self, finished: FinishedState) -> ServerResult<PlayerResult> {
        let result = match finished {
            FinishedState::Win(winner) if winner == self.id => {
                self.send_board().await?;
                self.send(ServerMessage::YouWin).await?;
                PlayerResult::Won
            }
            FinishedState::Win(winner) => {
                let name = self
                    .session
                    .player_name(winner)?
                    .unwrap_or_else(|| format!("Player {}", winner));
                self.send_board().await?;
                self.send(ServerMessage::PlayerWins {
                    id: winner,
                    name: &name,
                })
                .await?;
                PlayerResult::Lost
            }
            FinishedState::Draw => {
                self.send_board().await?;
                self.send(ServerMessage::Draw).await?;
                PlayerResult::Draw
            }
            FinishedState::Aborted(Some(id)) if id == self.id => PlayerResult::Aborted,
            FinishedState::Aborted(Some(_)) => {
                self.send(ServerMessage::OpponentLeft).await?;
                PlayerResult::Aborted
            }
            FinishedState::Aborted(None) => {
                self.send(ServerMessage::ServerShutdown).await?;
                PlayerResult::Aborted
            }
        };
        info!(player = self.id, ?result, "game over");
        Ok(result)
    }

    async fn send_board(&mut self) -> ServerResult<()> {
        let snapshot = self.session.snapshot()?;
        for row in &snapshot.rows {
            self.send(row).await?;
        }
        Ok(())
    }

    async fn send(&mut self, message: impl Display) -> ServerResult<()> {
        let line = format!("{}\n", message);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Waits for the next line from the participant or for `wake` to resolve, whichever
    /// comes first. `limit` bounds how long to wait for a line.
    async fn next_input(
        &mut self,
        limit: Option<Duration>,
        waiting_for: &str,
        wake: impl Future<Output = ServerResult<Progress>>,
    ) -> ServerResult<Input> {
        let timeout = async move {
            match limit {
                Some(limit) => sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            progress = wake => Ok(Input::Update(progress?)),
            line = self.lines.next() => match line {
                Some(Ok(line)) => Ok(Input::Line(line)),
                Some(Err(err)) => Err(err.into()),
                None => Err(ServerError::Disconnected),
            },
            _ = timeout => {
                let secs = limit.map(|limit| limit.as_secs()).unwrap_or_default();
                Err(ServerError::timed_out(waiting_for, secs))
            }
        }
    }
}

/// Task that runs a [`PlayerHandler`] on the runtime.
pub struct PlayerTask(JoinHandle<ServerResult<PlayerResult>>);

impl IntoFuture for PlayerTask {
    type Output = <JoinHandle<ServerResult<PlayerResult>> as Future>::Output;
    type IntoFuture = JoinHandle<ServerResult<PlayerResult>>;

    fn into_future(self) -> Self::IntoFuture {
        self.0.into_future()
    }
}

impl PlayerTask {
    pub fn spawn<R, W>(handler: PlayerHandler<R, W>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self(tokio::spawn(handler.run()))
    }
}
