use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::ServerError;
use super::handler::{HandlerSettings, PlayerHandler, PlayerTask};
use super::session::Session;
use super::ServerResult;
use crate::core::{GameState, Player, PlayerId, PLAYER_IDS};

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Final state of a hosted game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameReport {
    pub state: GameState,
    pub players: Vec<Player>,
}

impl GameReport {
    pub fn player_name(&self, id: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|player| player.id() == id)
            .and_then(Player::name)
    }
}

/// Accepts participants and hosts one game at a time.
pub struct GameServer {
    listener: TcpListener,
    settings: HandlerSettings,
}

impl GameServer {
    pub async fn bind(addr: impl ToSocketAddrs, settings: HandlerSettings) -> ServerResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, settings })
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Hosts games until one finishes, or until `ct` is cancelled when `keep_running` is set.
    pub async fn run(self, ct: CancellationToken, keep_running: bool) -> ServerResult<()> {
        loop {
            let report = self.run_game(&ct).await?;
            info!(
                state = %report.state,
                first = report.player_name(PLAYER_IDS[0]).unwrap_or("-"),
                second = report.player_name(PLAYER_IDS[1]).unwrap_or("-"),
                "game finished"
            );
            if !keep_running || ct.is_cancelled() {
                break;
            }
        }
        Ok(())
    }

    /// Seats the next two connections in one session and waits for the game to end.
    ///
    /// The game may end before the second seat is taken if the first participant leaves.
    /// Cancelling `ct` shuts the session down and both participants are told so.
    pub async fn run_game(&self, ct: &CancellationToken) -> ServerResult<GameReport> {
        let (session, mut completion) = Session::new();
        let mut tasks = Vec::with_capacity(PLAYER_IDS.len());
        let mut finished = None;

        for id in PLAYER_IDS {
            tokio::select! {
                biased;
                _ = ct.cancelled() => {
                    info!("cancelled while waiting for players");
                    session.shutdown()?;
                    break;
                }
                state = &mut completion => {
                    finished = Some(state.map_err(|_| ServerError::CompletionDropped)?);
                    break;
                }
                stream = self.accept(id) => {
                    let (reader, writer) = stream.into_split();
                    let handler =
                        PlayerHandler::new(id, session.clone(), reader, writer, self.settings);
                    tasks.push(PlayerTask::spawn(handler));
                }
            }
        }

        let state = match finished {
            Some(state) => state,
            None => Self::wait_for_completion(&session, &mut completion, ct).await?,
        };
        info!(%state, "session completed");
        Self::join(tasks).await;

        Ok(GameReport {
            state,
            players: session.players()?,
        })
    }

    async fn accept(&self, id: PlayerId) -> TcpStream {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(player = id, %addr, "connection accepted");
                    return stream;
                }
                Err(err) => {
                    warn!("failed to accept connection: {}", err);
                    sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn wait_for_completion(
        session: &Session,
        completion: &mut oneshot::Receiver<GameState>,
        ct: &CancellationToken,
    ) -> ServerResult<GameState> {
        tokio::select! {
            biased;
            state = &mut *completion => state.map_err(|_| ServerError::CompletionDropped),
            _ = ct.cancelled() => {
                info!("cancelled while the game is running");
                session.shutdown()?;
                completion.await.map_err(|_| ServerError::CompletionDropped)
            }
        }
    }

    async fn join(tasks: Vec<PlayerTask>) {
        for (id, task) in PLAYER_IDS.into_iter().zip(tasks) {
            let mut handle = task.into_future();
            match timeout(JOIN_TIMEOUT, &mut handle).await {
                Ok(Ok(Ok(result))) => info!(player = id, ?result, "handler finished"),
                Ok(Ok(Err(err))) if err.is_connection_failure() => {
                    info!(player = id, "handler lost its connection: {}", err)
                }
                Ok(Ok(Err(err))) => warn!(player = id, "handler failed: {}", err),
                Ok(Err(err)) => error!(player = id, "handler task failed: {}", err),
                Err(_) => {
                    warn!(player = id, "handler did not finish in time");
                    handle.abort();
                }
            }
        }
    }
}
