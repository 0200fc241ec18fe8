use std::fmt::{Debug, Formatter};
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::action::ACTION_VARIANTS;
use crate::{ActionKind, Character, CoupError, Match, Stage, FORCED_COUP_COINS};

/// One request against a match, built once per call and passed by value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Act {
        player: usize,
        action: ActionKind,
        target: Option<usize>,
    },
    Challenge {
        challenger: Option<usize>,
    },
    Counteract {
        challenger: Option<usize>,
        blocking_role: Option<Character>,
    },
    LoseInfluence {
        player: usize,
        role: Character,
    },
}

impl Debug for Intent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Act { player, action, target: Some(target) } => {
                f.write_fmt(format_args!("Player {player} takes [{action}] against {target}"))
            }
            Intent::Act { player, action, target: None } => {
                f.write_fmt(format_args!("Player {player} takes [{action}]"))
            }
            Intent::Challenge { challenger: Some(challenger) } => {
                f.write_fmt(format_args!("Player {challenger} challenges"))
            }
            Intent::Challenge { challenger: None } => {
                f.write_str("Nobody challenges")
            }
            Intent::Counteract { challenger: Some(challenger), blocking_role } => {
                f.write_fmt(format_args!("Player {challenger} blocks with {:?}", blocking_role))
            }
            Intent::Counteract { challenger: None, .. } => {
                f.write_str("Nobody blocks")
            }
            Intent::LoseInfluence { player, role } => {
                f.write_fmt(format_args!("Player {player} loses {role}"))
            }
        }
    }
}

impl Match {
    /// Every intent the current state accepts.
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = Vec::with_capacity(self.players.len() * 4);
        let actor = self.current_turn;

        match self.current_stage {
            Stage::Action => {
                let coins = self.players[actor].coins;
                let opponents = self.other_player_indexes(actor);

                for action in ACTION_VARIANTS {
                    if coins >= FORCED_COUP_COINS && action != ActionKind::Coup {
                        continue;
                    }
                    if coins < action.cost() {
                        continue;
                    }

                    if action.requires_target() {
                        for &target in &opponents {
                            intents.push(Intent::Act { player: actor, action, target: Some(target) });
                        }
                    } else {
                        intents.push(Intent::Act { player: actor, action, target: None });
                    }
                }
            }
            Stage::Challenge => {
                intents.push(Intent::Challenge { challenger: None });
                for challenger in self.other_player_indexes(actor) {
                    intents.push(Intent::Challenge { challenger: Some(challenger) });
                }
            }
            Stage::Counteract => {
                intents.push(Intent::Counteract { challenger: None, blocking_role: None });
                if let Some(action) = self.declared_action() {
                    for challenger in self.other_player_indexes(actor) {
                        for &role in action.blocking_roles() {
                            intents.push(Intent::Counteract { challenger: Some(challenger), blocking_role: Some(role) });
                        }
                    }
                }
            }
            Stage::LoseInfluence => {
                if let Some(loss) = self.pending_losses.front() {
                    let mut roles: Vec<Character> = vec![];
                    for &role in &self.players[loss.player].hand {
                        if !roles.contains(&role) {
                            roles.push(role);
                        }
                    }
                    for role in roles {
                        intents.push(Intent::LoseInfluence { player: loss.player, role });
                    }
                }
            }
            // only ever seen mid-resolution
            Stage::ResolveAction => {}
        }

        intents
    }

    /// Applies one intent, leaving the match untouched when it is rejected.
    pub fn apply<R: Rng + Sized>(&mut self, intent: Intent, rng: &mut R) -> Result<(), CoupError> {
        match intent {
            Intent::Act { player, action, target } => {
                self.submit_action(player, action, target, rng)
            }
            Intent::Challenge { challenger } => {
                self.resolve_challenge(challenger, rng)
            }
            Intent::Counteract { challenger, blocking_role } => {
                self.resolve_counteract(challenger, blocking_role, rng)
            }
            Intent::LoseInfluence { player, role } => {
                self.resolve_lose_influence(player, role, rng)
            }
        }
    }
}
