use serde::Serialize;
use thiserror::Error;
use crate::action::ActionKind;
use crate::state::Stage;
use crate::{Character, MatchId};

/// Errors raised by the match store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("match {0} already exists")]
    Duplicate(MatchId),
}

/// Every way an intent can be rejected.
///
/// Validation errors are raised before the match is touched, so a rejected
/// intent never leaves a partial change behind.
#[derive(Debug, Error)]
pub enum CoupError {
    #[error("not player {player}'s turn, player {current_turn} must act")]
    NotYourTurn { player: usize, current_turn: usize },

    #[error("not allowed in stage [{actual}], expected [{expected}]")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("action [{0}] requires a target")]
    MissingTarget(ActionKind),

    #[error("player {0} is not a valid target")]
    InvalidTarget(usize),

    #[error("player with {coins} coins must coup")]
    MustCoup { coins: u32 },

    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("invalid action name [{0}]")]
    InvalidActionName(String),

    #[error("invalid character [{0}]")]
    InvalidCharacter(String),

    #[error("action [{0}] can not be challenged")]
    ActionNotChallengeable(ActionKind),

    #[error("action [{action}] can't be blocked by {role}")]
    InvalidBlock { action: ActionKind, role: Character },

    #[error("a blocking role must be supplied for a counteraction")]
    MissingBlockingRole,

    #[error("player {player} has no {role} in hand")]
    CardNotFound { player: usize, role: Character },

    #[error("only player {expected} may lose influence now")]
    WrongPlayer { expected: usize, actual: usize },

    #[error("player {0} can not take part")]
    InvalidPlayer(usize),

    #[error("player count {0} is out of range")]
    InvalidPlayerCount(usize),

    #[error("match {0} not found")]
    NotFound(MatchId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoupError {
    pub fn code(&self) -> &'static str {
        match self {
            CoupError::NotYourTurn { .. } => "NotYourTurn",
            CoupError::WrongStage { .. } => "WrongStage",
            CoupError::MissingTarget(_) => "MissingTarget",
            CoupError::InvalidTarget(_) => "InvalidTarget",
            CoupError::MustCoup { .. } => "MustCoup",
            CoupError::InsufficientFunds { .. } => "InsufficientFunds",
            CoupError::InvalidActionName(_) => "InvalidActionName",
            CoupError::InvalidCharacter(_) => "InvalidCharacter",
            CoupError::ActionNotChallengeable(_) => "ActionNotChallengeable",
            CoupError::InvalidBlock { .. } => "InvalidBlock",
            CoupError::MissingBlockingRole => "MissingBlockingRole",
            CoupError::CardNotFound { .. } => "CardNotFound",
            CoupError::WrongPlayer { .. } => "WrongPlayer",
            CoupError::InvalidPlayer(_) => "InvalidPlayer",
            CoupError::InvalidPlayerCount(_) => "InvalidPlayerCount",
            CoupError::NotFound(_) => "NotFound",
            CoupError::Store(_) => "Store",
        }
    }
}

/// Error body handed to the transport layer instead of a match record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl From<&CoupError> for ErrorResponse {
    fn from(error: &CoupError) -> Self {
        ErrorResponse {
            code: error.code(),
            message: error.to_string(),
        }
    }
}
