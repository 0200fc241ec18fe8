pub mod action;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod intent;
pub mod manager;
pub mod state;
pub mod store;

pub use action::ActionKind;
pub use config::{ConfigError, EngineConfig};
pub use error::{CoupError, ErrorResponse, StoreError};
pub use intent::Intent;
pub use manager::{Deletion, MatchManager};
pub use state::{CurrentAction, LossKind, Match, MatchId, PendingLoss, Player, Stage};
pub use store::{MatchStore, MemoryStore};

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

/// Copies of each character in the court deck.
pub const COPIES_PER_CHARACTER: usize = 3;

/// Coins in circulation: treasury plus every player's balance.
pub const TOTAL_COINS: u32 = 50;

pub const STARTING_COINS: u32 = 2;
pub const STARTING_HAND: usize = 2;

pub const MIN_PLAYERS: usize = 2;
// 15 cards, 2 per player, and an exchange needs 2 cards left in the deck
pub const MAX_PLAYERS: usize = 6;

/// At this balance a player must coup.
pub const FORCED_COUP_COINS: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

impl Character {
    pub fn name(&self) -> &'static str {
        match self {
            Duke => "Duke",
            Assassin => "Assassin",
            Captain => "Captain",
            Ambassador => "Ambassador",
            Contessa => "Contessa",
        }
    }

    fn index(&self) -> usize {
        match self {
            Duke => 0,
            Assassin => 1,
            Captain => 2,
            Ambassador => 3,
            Contessa => 4,
        }
    }
}

impl Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Character {
    type Err = CoupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CHARACTER_VARIANTS
            .iter()
            .copied()
            .find(|character| character.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoupError::InvalidCharacter(s.to_string()))
    }
}

/// Per-character token counts, indexed in `CHARACTER_VARIANTS` order.
pub(crate) fn count_characters<'a>(cards: impl Iterator<Item = &'a Character>) -> [usize; 5] {
    let mut counts = [0; 5];
    for card in cards {
        counts[card.index()] += 1;
    }
    counts
}
