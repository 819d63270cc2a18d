//! Plain-text TCP front end: one line per message, one task per participant.

pub mod handler;
pub mod listener;
pub mod protocol;
pub mod session;

mod error;

pub use error::ServerError;
pub use handler::{HandlerSettings, PlayerHandler, PlayerResult, PlayerTask};
pub use listener::{GameReport, GameServer};
pub use session::{MoveOutcome, Progress, Session, Snapshot};

pub type ServerResult<T> = Result<T, ServerError>;
