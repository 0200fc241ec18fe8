use std::collections::VecDeque;
use std::fmt::{Debug, Display, Formatter};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::action::ActionKind;
use crate::{count_characters, Character, CoupError, CHARACTER_VARIANTS, COPIES_PER_CHARACTER, MAX_PLAYERS, MIN_PLAYERS, STARTING_COINS, STARTING_HAND, TOTAL_COINS};

pub type MatchId = String;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Action,
    Challenge,
    Counteract,
    ResolveAction,
    LoseInfluence,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Action => "action",
            Stage::Challenge => "challenge",
            Stage::Counteract => "counteract",
            Stage::ResolveAction => "resolve_action",
            Stage::LoseInfluence => "lose_influence",
        })
    }
}

/// The action under way this turn, stored as `"pending"` or the action name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CurrentAction {
    Pending,
    Declared(ActionKind),
}

impl From<CurrentAction> for String {
    fn from(action: CurrentAction) -> Self {
        match action {
            CurrentAction::Pending => "pending".to_string(),
            CurrentAction::Declared(kind) => kind.name().to_string(),
        }
    }
}

impl TryFrom<String> for CurrentAction {
    type Error = CoupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "pending" {
            Ok(CurrentAction::Pending)
        } else {
            Ok(CurrentAction::Declared(value.parse()?))
        }
    }
}

/// Why a player owes an influence card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    // lost a challenge, card is revealed
    Challenge,
    // coup or assassination, card is revealed
    Targeted,
    // returning cards after an exchange, card goes back into the deck face down
    ExchangeReturn,
}

impl LossKind {
    pub fn reveals(&self) -> bool {
        !matches!(self, LossKind::ExchangeReturn)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLoss {
    pub player: usize,
    pub kind: LossKind,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hand: Vec<Character>,
    pub coins: u32,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub start_timestamp: u64,
    pub treasury: u32,
    pub player_count: usize,
    pub players: Vec<Player>,
    pub court_deck: Vec<Character>,
    pub revealed_cards: Vec<Character>,
    pub current_turn: usize,
    pub current_stage: Stage,
    pub current_action: CurrentAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_target: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_cards_before_exchange: Option<usize>,
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    pub pending_losses: VecDeque<PendingLoss>,
    pub message: String,
}

impl Debug for Match {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("{} | T {} | {} {} | ${}\n", self.id, self.current_turn, self.current_stage, String::from(self.current_action), self.treasury).as_str())?;
        for (player_idx, player) in self.players.iter().enumerate() {
            f.write_str(format!("\tP {player_idx}: ${} | {:?}\n", player.coins, player.hand).as_str())?;
        }
        Ok(())
    }
}

impl Match {
    /// Shuffles a full court deck and deals each player their starting cards and coins.
    pub fn new<R: Rng + Sized>(id: MatchId, player_count: usize, start_timestamp: u64, rng: &mut R) -> Result<Self, CoupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(CoupError::InvalidPlayerCount(player_count));
        }

        let mut deck: Vec<Character> = CHARACTER_VARIANTS.iter()
            .flat_map(|&card| std::iter::repeat(card).take(COPIES_PER_CHARACTER))
            .collect();

        deck.shuffle(rng);

        let players: Vec<Player> = (0..player_count).map(|player_idx| Player {
            name: format!("player{player_idx}"),
            hand: deck.split_off(deck.len() - STARTING_HAND),
            coins: STARTING_COINS,
        }).collect();

        Ok(Self {
            id,
            start_timestamp,
            treasury: TOTAL_COINS - STARTING_COINS * player_count as u32,
            player_count,
            players,
            court_deck: deck,
            revealed_cards: vec![],
            current_turn: 0,
            current_stage: Stage::Action,
            current_action: CurrentAction::Pending,
            current_target: None,
            num_cards_before_exchange: None,
            pending_losses: VecDeque::new(),
            message: "Game Started! Player 0 take action.".to_string(),
        })
    }

    /// False for an index that names no player.
    pub fn is_eliminated(&self, player_idx: usize) -> bool {
        self.players.get(player_idx).is_some_and(|player| player.hand.is_empty())
    }

    /// A live player index, other than `exclude_idx` when given.
    pub(crate) fn is_live_player(&self, player_idx: usize, exclude_idx: Option<usize>) -> bool {
        player_idx < self.players.len()
            && !self.is_eliminated(player_idx)
            && Some(player_idx) != exclude_idx
    }

    /// Live players other than `exclude_idx`, in turn order after them.
    pub fn other_player_indexes(&self, exclude_idx: usize) -> Vec<usize> {
        (1..self.players.len())
            .map(|n| (exclude_idx + n) % self.players.len())
            .filter(|player_idx| !self.is_eliminated(*player_idx))
            .collect()
    }

    pub fn declared_action(&self) -> Option<ActionKind> {
        match self.current_action {
            CurrentAction::Pending => None,
            CurrentAction::Declared(kind) => Some(kind),
        }
    }

    pub fn winner(&self) -> Option<usize> {
        let mut alive = (0..self.players.len()).filter(|&player_idx| !self.is_eliminated(player_idx));
        match (alive.next(), alive.next()) {
            (Some(player_idx), None) => Some(player_idx),
            _ => None,
        }
    }

    /// Tokens of each character across deck, hands and revealed cards.
    pub fn card_counts(&self) -> [usize; 5] {
        count_characters(
            self.court_deck.iter()
                .chain(self.revealed_cards.iter())
                .chain(self.players.iter().flat_map(|player| player.hand.iter()))
        )
    }

    pub fn total_coins(&self) -> u32 {
        self.treasury + self.players.iter().map(|player| player.coins).sum::<u32>()
    }
}
