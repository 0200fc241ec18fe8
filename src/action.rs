use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::Character::{self, Ambassador, Assassin, Captain, Contessa, Duke};
use crate::CoupError;

/// The seven actions a player may choose on their turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Income,
    ForeignAid,
    Tax,
    Steal,
    Exchange,
    Assassinate,
    Coup,
}

pub static ACTION_VARIANTS: [ActionKind; 7] = [
    ActionKind::Income,
    ActionKind::ForeignAid,
    ActionKind::Tax,
    ActionKind::Steal,
    ActionKind::Exchange,
    ActionKind::Assassinate,
    ActionKind::Coup,
];

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Income => "income",
            ActionKind::ForeignAid => "foreign_aid",
            ActionKind::Tax => "tax",
            ActionKind::Steal => "steal",
            ActionKind::Exchange => "exchange",
            ActionKind::Assassinate => "assassinate",
            ActionKind::Coup => "coup",
        }
    }

    /// Coins paid into the treasury when the action is declared.
    pub fn cost(&self) -> u32 {
        match self {
            ActionKind::Assassinate => 3,
            ActionKind::Coup => 7,
            _ => 0,
        }
    }

    /// Roles that prove the action when challenged. Empty means it can't be challenged.
    pub fn proof_roles(&self) -> &'static [Character] {
        match self {
            ActionKind::Tax => &[Duke],
            ActionKind::Steal => &[Captain],
            ActionKind::Exchange => &[Ambassador],
            ActionKind::Assassinate => &[Assassin],
            ActionKind::Income | ActionKind::ForeignAid | ActionKind::Coup => &[],
        }
    }

    /// Roles that may block the action. Empty means it can't be blocked.
    pub fn blocking_roles(&self) -> &'static [Character] {
        match self {
            ActionKind::ForeignAid => &[Duke],
            ActionKind::Steal => &[Captain, Ambassador],
            ActionKind::Assassinate => &[Contessa],
            _ => &[],
        }
    }

    pub fn is_challengeable(&self) -> bool {
        !self.proof_roles().is_empty()
    }

    pub fn is_blockable(&self) -> bool {
        !self.blocking_roles().is_empty()
    }

    pub fn requires_target(&self) -> bool {
        matches!(self, ActionKind::Steal | ActionKind::Assassinate | ActionKind::Coup)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = CoupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_VARIANTS
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| CoupError::InvalidActionName(s.to_string()))
    }
}
