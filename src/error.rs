use crate::game::GameStatus;

/// Failures surfaced by the table. Round outcomes are never errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("cannot draw from an empty deck")]
    EmptyDeck,

    #[error("bet of {bet} exceeds the account balance of {account}")]
    InvalidBetAmount { bet: u32, account: i64 },

    #[error("a table needs at least one deck, got {0}")]
    InvalidDeckCount(u8),

    #[error("no round has been dealt yet")]
    NoActiveRound,

    #[error("round is already over ({0:?})")]
    RoundOver(GameStatus),

    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
