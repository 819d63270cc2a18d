use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

use crate::core::{PlayerId, WIDTH};

/// Longest line accepted from a participant, excluding the terminator.
pub const MAX_LINE_LENGTH: usize = 256;

/// Lines the server sends to a participant. Board rows are sent verbatim and are not part
/// of this enum.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerMessage<'a> {
    EnterName,
    WaitingForOpponentToJoin,
    GameStarts,
    YourTurn,
    WaitingForMove,
    InvalidInput,
    ColumnFull,
    NotYourTurn,
    YouWin,
    PlayerWins { id: PlayerId, name: &'a str },
    Draw,
    OpponentLeft,
    ServerShutdown,
    TimedOut,
}

impl Display for ServerMessage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMessage::EnterName => f.write_str("Enter your name:"),
            ServerMessage::WaitingForOpponentToJoin => {
                f.write_str("Waiting for an opponent to join...")
            }
            ServerMessage::GameStarts => f.write_str("Game starts!"),
            ServerMessage::YourTurn => f.write_str("Your turn!"),
            ServerMessage::WaitingForMove => f.write_str("Waiting for opponent's move..."),
            ServerMessage::InvalidInput => write!(
                f,
                "Invalid input. Please enter a number between 0 and {}.",
                WIDTH - 1
            ),
            ServerMessage::ColumnFull => {
                f.write_str("Column is full. Please choose another column.")
            }
            ServerMessage::NotYourTurn => f.write_str("It's not your turn."),
            ServerMessage::YouWin => f.write_str("Congratulations! You win!"),
            ServerMessage::PlayerWins { id, name } => write!(f, "Player {} ({}) wins!", id, name),
            ServerMessage::Draw => f.write_str("It's a draw!"),
            ServerMessage::OpponentLeft => f.write_str("Opponent disconnected. Game over."),
            ServerMessage::ServerShutdown => f.write_str("Server is shutting down. Game over."),
            ServerMessage::TimedOut => f.write_str("You took too long to respond. Game over."),
        }
    }
}

/// Parses a column index typed by a participant. Surrounding whitespace is ignored,
/// range checks are left to the session.
pub fn parse_column(line: &str) -> Result<i64, ParseIntError> {
    line.trim().parse()
}

/// Display name for a participant, falling back to the seat when the line is blank.
pub fn display_name(line: &str, id: PlayerId) -> String {
    let name = line.trim();
    if name.is_empty() {
        format!("Player {}", id)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_column() {
        assert_eq!(parse_column("3"), Ok(3));
        assert_eq!(parse_column(" 6 \r"), Ok(6));
        assert_eq!(parse_column("7"), Ok(7));
        assert_eq!(parse_column("-1"), Ok(-1));
        assert!(parse_column("abc").is_err());
        assert!(parse_column("").is_err());
        assert!(parse_column("1.5").is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("  Alice \r", 1), "Alice");
        assert_eq!(display_name("   ", 2), "Player 2");
    }

    #[test]
    fn test_message_wording() {
        assert_eq!(
            ServerMessage::InvalidInput.to_string(),
            "Invalid input. Please enter a number between 0 and 6."
        );
        assert_eq!(
            ServerMessage::PlayerWins { id: 1, name: "Alice" }.to_string(),
            "Player 1 (Alice) wins!"
        );
    }
}
