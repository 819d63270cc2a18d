use std::sync::PoisonError;

use tokio::task::JoinError;
use tokio_util::codec::LinesCodecError;

use crate::core::GameError;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read line: {0}")]
    Codec(#[from] LinesCodecError),
    #[error("peer closed the connection")]
    Disconnected,
    #[error("no input received in {secs}s while waiting for {waiting_for}")]
    TimedOut { waiting_for: String, secs: u64 },
    #[error("failed to lock session mutex: {reason}")]
    MutexPoison { reason: String },
    #[error("session finished without reporting a result")]
    CompletionDropped,
    #[error("session state channel closed")]
    SessionClosed,
    #[error("player task failed: {0}")]
    Join(#[from] JoinError),
    #[error(transparent)]
    GameError(#[from] GameError),
}

impl<T> From<PoisonError<T>> for ServerError {
    fn from(value: PoisonError<T>) -> Self {
        Self::MutexPoison {
            reason: value.to_string(),
        }
    }
}

impl ServerError {
    pub fn timed_out(waiting_for: impl Into<String>, secs: u64) -> Self {
        Self::TimedOut {
            waiting_for: waiting_for.into(),
            secs,
        }
    }

    /// Errors that mean the participant is gone or unresponsive.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            ServerError::Io(_)
                | ServerError::Codec(_)
                | ServerError::Disconnected
                | ServerError::TimedOut { .. }
        )
    }
}
