//! Turn and stage transitions for a single match.

use rand::Rng;
use tracing::debug;
use crate::state::{CurrentAction, LossKind, PendingLoss};
use crate::{ActionKind, Character, CoupError, Match, Stage, FORCED_COUP_COINS};

const EXCHANGE_DRAW: usize = 2;

impl Match {
    fn expect_stage(&self, expected: Stage) -> Result<(), CoupError> {
        if self.current_stage != expected {
            return Err(CoupError::WrongStage { expected, actual: self.current_stage });
        }
        Ok(())
    }

    /// The declared action while a turn is in flight.
    fn action_in_flight(&self, expected: Stage) -> Result<ActionKind, CoupError> {
        self.expect_stage(expected)?;
        self.declared_action()
            .ok_or(CoupError::WrongStage { expected: Stage::Action, actual: self.current_stage })
    }

    fn check_opponent(&self, challenger_idx: usize) -> Result<(), CoupError> {
        if !self.is_live_player(challenger_idx, Some(self.current_turn)) {
            return Err(CoupError::InvalidPlayer(challenger_idx));
        }
        Ok(())
    }

    fn describe_action(&self, action: ActionKind) -> String {
        let mut description = format!("action [{action}]");
        if let Some(target) = self.current_target {
            description.push_str(&format!(" with target [{target}]"));
        }
        match action.proof_roles() {
            [] => description.push_str(" which can not be challenged"),
            roles => description.push_str(&format!(" proved by [{}]", join_roles(roles))),
        }
        description
    }

    pub fn submit_action<R: Rng + Sized>(&mut self, player_idx: usize, action: ActionKind, target: Option<usize>, rng: &mut R) -> Result<(), CoupError> {
        if player_idx >= self.players.len() {
            return Err(CoupError::InvalidPlayer(player_idx));
        }
        if player_idx != self.current_turn {
            return Err(CoupError::NotYourTurn { player: player_idx, current_turn: self.current_turn });
        }
        self.expect_stage(Stage::Action)?;

        let target = if action.requires_target() {
            let target = target.ok_or(CoupError::MissingTarget(action))?;
            if !self.is_live_player(target, Some(player_idx)) {
                return Err(CoupError::InvalidTarget(target));
            }
            Some(target)
        } else {
            None
        };

        let coins = self.players[player_idx].coins;
        if coins >= FORCED_COUP_COINS && action != ActionKind::Coup {
            return Err(CoupError::MustCoup { coins });
        }

        // the cost is sunk from here on
        self.pay_coins(player_idx, action.cost())?;
        self.current_action = CurrentAction::Declared(action);
        self.current_target = target;

        debug!(match_id = %self.id, player = player_idx, %action, ?target, "action declared");

        if action.is_challengeable() {
            self.current_stage = Stage::Challenge;
            self.message = format!(
                "Player {player_idx} has chosen {}. Any player may issue a challenge, or submit no challenges to continue",
                self.describe_action(action)
            );
        } else if action.is_blockable() {
            self.current_stage = Stage::Counteract;
            self.message = format!(
                "Player {player_idx} has chosen {}. Any player may attempt to block with [{}], or submit no counteraction to continue",
                self.describe_action(action),
                join_roles(action.blocking_roles())
            );
        } else {
            self.resolve_action(action, rng);
        }

        Ok(())
    }

    pub fn resolve_challenge<R: Rng + Sized>(&mut self, challenger: Option<usize>, rng: &mut R) -> Result<(), CoupError> {
        let action = self.action_in_flight(Stage::Challenge)?;
        let actor = self.current_turn;

        let Some(challenger) = challenger else {
            if action.is_blockable() {
                self.current_stage = Stage::Counteract;
                self.message = format!(
                    "No challenge to action [{action}]. Any player may attempt to block with [{}], or submit no counteraction to continue",
                    join_roles(action.blocking_roles())
                );
            } else {
                self.resolve_action(action, rng);
            }
            return Ok(());
        };

        if !action.is_challengeable() {
            return Err(CoupError::ActionNotChallengeable(action));
        }
        self.check_opponent(challenger)?;

        let proof = action
            .proof_roles()
            .iter()
            .copied()
            .find(|role| self.players[actor].hand.contains(role));

        match proof {
            Some(role) => {
                debug!(match_id = %self.id, actor, challenger, %role, "challenge failed");

                self.replace_card(actor, role, rng)?;
                self.pending_losses.push_back(PendingLoss { player: challenger, kind: LossKind::Challenge });
                self.apply_effect(action, rng);
                self.message = format!(
                    "Challenge failed, player {challenger} lose influence; Player {actor} reveals {role} and has drawn a new card from court deck"
                );
                self.settle();
            }
            None => {
                debug!(match_id = %self.id, actor, challenger, "challenge succeeded");

                self.pending_losses.push_back(PendingLoss { player: actor, kind: LossKind::Challenge });
                self.current_stage = Stage::LoseInfluence;
                self.message = format!("Challenge succeeded, player {actor} lose influence");
            }
        }

        Ok(())
    }

    pub fn resolve_counteract<R: Rng + Sized>(&mut self, challenger: Option<usize>, blocking_role: Option<Character>, rng: &mut R) -> Result<(), CoupError> {
        let action = self.action_in_flight(Stage::Counteract)?;

        let Some(challenger) = challenger else {
            self.resolve_action(action, rng);
            return Ok(());
        };

        self.check_opponent(challenger)?;
        let role = blocking_role.ok_or(CoupError::MissingBlockingRole)?;
        if !action.blocking_roles().contains(&role) {
            return Err(CoupError::InvalidBlock { action, role });
        }

        // a declared block stands, there is no challenge to it
        debug!(match_id = %self.id, challenger, %role, %action, "action blocked");
        self.message = format!("Player {challenger} blocked action [{action}] with [{role}].");
        self.advance_turn();
        Ok(())
    }

    pub fn resolve_lose_influence<R: Rng + Sized>(&mut self, player_idx: usize, role: Character, rng: &mut R) -> Result<(), CoupError> {
        self.expect_stage(Stage::LoseInfluence)?;
        let loss = *self
            .pending_losses
            .front()
            .ok_or(CoupError::WrongStage { expected: Stage::Action, actual: self.current_stage })?;

        if player_idx != loss.player {
            return Err(CoupError::WrongPlayer { expected: loss.player, actual: player_idx });
        }

        let eliminated = self.lose_influence(player_idx, role, loss.kind.reveals(), rng)?;
        if eliminated {
            self.message = format!("Player {player_idx} has lost all influence.");
        } else {
            self.message = format!("Player {player_idx} lost influence [{role}].");
        }

        if loss.kind == LossKind::ExchangeReturn {
            let owed = self.cards_owed_after_exchange(player_idx);
            if owed > 0 {
                self.message = format!("Player {player_idx} returned a card, return {owed} more");
                return Ok(());
            }
        }

        self.pending_losses.pop_front();
        self.settle();
        Ok(())
    }

    fn cards_owed_after_exchange(&self, player_idx: usize) -> usize {
        let hand_size = self.players[player_idx].hand.len();
        hand_size.saturating_sub(self.num_cards_before_exchange.unwrap_or(hand_size))
    }

    fn resolve_action<R: Rng + Sized>(&mut self, action: ActionKind, rng: &mut R) {
        self.current_stage = Stage::ResolveAction;
        self.apply_effect(action, rng);
        self.settle();
    }

    /// Carries out what the action does. Influence losses are queued, not paid.
    fn apply_effect<R: Rng + Sized>(&mut self, action: ActionKind, rng: &mut R) {
        let actor = self.current_turn;

        match action {
            ActionKind::Income => {
                self.take_coins(actor, 1);
            }
            ActionKind::ForeignAid => {
                self.take_coins(actor, 2);
            }
            ActionKind::Tax => {
                self.take_coins(actor, 3);
            }
            ActionKind::Steal => {
                if let Some(target) = self.current_target {
                    self.steal_coins(actor, target, 2);
                }
            }
            ActionKind::Exchange => {
                let hand_size = self.players[actor].hand.len();
                self.draw_cards(actor, EXCHANGE_DRAW, rng);
                self.num_cards_before_exchange = Some(hand_size);
                self.pending_losses.push_back(PendingLoss { player: actor, kind: LossKind::ExchangeReturn });
                self.message = format!("exchange succeeded, player {actor} return {EXCHANGE_DRAW} cards");
            }
            ActionKind::Assassinate | ActionKind::Coup => {
                // the target could already be out after losing a challenge
                let target = self.current_target.filter(|&target| !self.is_eliminated(target));
                if let Some(target) = target {
                    self.pending_losses.push_back(PendingLoss { player: target, kind: LossKind::Targeted });
                    self.message = format!("{action} succeeded, player {target} lose influence");
                }
            }
        }
    }

    /// Moves on to the next owed influence card, or to the next turn when none is owed.
    fn settle(&mut self) {
        while let Some(loss) = self.pending_losses.front() {
            if self.is_eliminated(loss.player) {
                self.pending_losses.pop_front();
            } else {
                break;
            }
        }

        match self.pending_losses.front().copied() {
            Some(loss) => {
                if self.current_stage == Stage::LoseInfluence {
                    self.message.push_str(&format!(" Player {} lose influence.", loss.player));
                }
                self.current_stage = Stage::LoseInfluence;
            }
            None => {
                if self.current_stage == Stage::ResolveAction {
                    if let Some(action) = self.declared_action() {
                        debug!(match_id = %self.id, %action, "action resolved");
                    }
                }
                self.advance_turn();
            }
        }
    }

    pub fn advance_turn(&mut self) {
        let player_count = self.players.len();
        let mut new_turn = self.current_turn;
        for step in 1..=player_count {
            let candidate = (self.current_turn + step) % player_count;
            if !self.is_eliminated(candidate) {
                new_turn = candidate;
                break;
            }
        }

        self.current_target = None;
        self.num_cards_before_exchange = None;
        self.pending_losses.clear();
        self.current_stage = Stage::Action;
        self.current_action = CurrentAction::Pending;
        self.current_turn = new_turn;
        self.message.push_str(&format!(" Player {new_turn} take action."));

        debug!(match_id = %self.id, turn = new_turn, "turn advanced");
    }
}

fn join_roles(roles: &[Character]) -> String {
    roles.iter().map(|role| role.name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use crate::Character::{self, Ambassador, Assassin, Captain, Contessa, Duke};
    use crate::state::LossKind;
    use crate::{ActionKind, CoupError, CurrentAction, Intent, Match, PendingLoss, Stage, COPIES_PER_CHARACTER, TOTAL_COINS};

    fn new_match(player_count: usize) -> (Match, Pcg64) {
        let mut rng = Pcg64::seed_from_u64(42);
        let game = Match::new("test".to_string(), player_count, 0, &mut rng).unwrap();
        (game, rng)
    }

    // swaps cards through the deck so the card counts stay intact
    fn give(game: &mut Match, player_idx: usize, cards: &[Character]) {
        let old_hand = std::mem::take(&mut game.players[player_idx].hand);
        game.court_deck.extend(old_hand);

        for &card in cards {
            if let Some(deck_idx) = game.court_deck.iter().position(|&c| c == card) {
                game.court_deck.remove(deck_idx);
            } else {
                let (holder, hand_idx) = game.players.iter().enumerate()
                    .filter(|(idx, _)| *idx != player_idx)
                    .find_map(|(idx, player)| player.hand.iter().position(|&c| c == card).map(|pos| (idx, pos)))
                    .expect("card should be somewhere");
                let replacement = game.court_deck.pop().expect("deck should not be empty");
                game.players[holder].hand[hand_idx] = replacement;
            }
            game.players[player_idx].hand.push(card);
        }
    }

    fn try_intent(game: &mut Match, rng: &mut Pcg64, intent: Intent) {
        if let Err(err) = game.apply(intent.clone(), rng) {
            panic!("failed to apply {:?}: {:?}", intent, err)
        }
        assert_conserved(game);
    }

    fn assert_conserved(game: &Match) {
        assert_eq!(game.card_counts(), [COPIES_PER_CHARACTER; 5]);
        assert_eq!(game.total_coins(), TOTAL_COINS);
    }

    fn act(player: usize, action: ActionKind, target: Option<usize>) -> Intent {
        Intent::Act { player, action, target }
    }

    #[test]
    fn income() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Income, None));

        assert_eq!(game.players[0].coins, 3);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_stage, Stage::Action);
        assert_eq!(game.current_action, CurrentAction::Pending);
        assert_eq!(game.message, "1 coins taken from treasury! Player 1 take action.");
    }

    #[test]
    fn tax_unchallenged() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Tax, None));
        assert_eq!(game.current_stage, Stage::Challenge);
        assert_eq!(game.current_action, CurrentAction::Declared(ActionKind::Tax));

        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: None });

        assert_eq!(game.players[0].coins, 5);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_stage, Stage::Action);
    }

    #[test]
    fn tax_challenge_proven() {
        let (mut game, mut rng) = new_match(3);
        give(&mut game, 0, &[Duke, Contessa]);
        give(&mut game, 1, &[Captain, Captain]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Tax, None));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: Some(1) });

        // tax still happens, the duke went back into the deck and was replaced
        assert_eq!(game.players[0].coins, 5);
        assert_eq!(game.players[0].hand.len(), 2);
        assert!(game.players[0].hand.contains(&Contessa));
        assert_eq!(game.current_stage, Stage::LoseInfluence);
        assert_eq!(game.pending_losses.front(), Some(&PendingLoss { player: 1, kind: LossKind::Challenge }));

        // only the challenger may pay
        assert!(matches!(
            game.apply(Intent::LoseInfluence { player: 0, role: Contessa }, &mut rng),
            Err(CoupError::WrongPlayer { expected: 1, actual: 0 })
        ));

        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Captain });

        assert_eq!(game.players[1].hand, vec![Captain]);
        assert_eq!(game.revealed_cards, vec![Captain]);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_stage, Stage::Action);
    }

    #[test]
    fn tax_challenge_caught() {
        let (mut game, mut rng) = new_match(3);
        give(&mut game, 0, &[Captain, Contessa]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Tax, None));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: Some(2) });

        // bluff called: no coins, the actor pays with a card
        assert_eq!(game.players[0].coins, 2);
        assert_eq!(game.current_stage, Stage::LoseInfluence);

        assert!(matches!(
            game.apply(Intent::LoseInfluence { player: 0, role: Duke }, &mut rng),
            Err(CoupError::CardNotFound { player: 0, role: Duke })
        ));

        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 0, role: Contessa });

        assert_eq!(game.players[0].hand, vec![Captain]);
        assert_eq!(game.current_turn, 1);
    }

    #[test]
    fn foreign_aid_blocked() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::ForeignAid, None));
        assert_eq!(game.current_stage, Stage::Counteract);

        assert!(matches!(
            game.apply(Intent::Challenge { challenger: Some(1) }, &mut rng),
            Err(CoupError::WrongStage { expected: Stage::Challenge, actual: Stage::Counteract })
        ));
        assert!(matches!(
            game.apply(Intent::Counteract { challenger: Some(1), blocking_role: Some(Captain) }, &mut rng),
            Err(CoupError::InvalidBlock { action: ActionKind::ForeignAid, role: Captain })
        ));
        assert!(matches!(
            game.apply(Intent::Counteract { challenger: Some(1), blocking_role: None }, &mut rng),
            Err(CoupError::MissingBlockingRole)
        ));

        try_intent(&mut game, &mut rng, Intent::Counteract { challenger: Some(1), blocking_role: Some(Duke) });

        assert_eq!(game.players[0].coins, 2);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_stage, Stage::Action);
    }

    #[test]
    fn foreign_aid_unblocked() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::ForeignAid, None));
        try_intent(&mut game, &mut rng, Intent::Counteract { challenger: None, blocking_role: None });

        assert_eq!(game.players[0].coins, 4);
        assert_eq!(game.current_turn, 1);
    }

    #[test]
    fn steal_is_clamped() {
        let (mut game, mut rng) = new_match(3);
        game.players[2].coins = 1;
        game.treasury += 1;

        try_intent(&mut game, &mut rng, act(0, ActionKind::Steal, Some(2)));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: None });
        assert_eq!(game.current_stage, Stage::Counteract);
        try_intent(&mut game, &mut rng, Intent::Counteract { challenger: None, blocking_role: None });

        assert_eq!(game.players[0].coins, 3);
        assert_eq!(game.players[2].coins, 0);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_target, None);
    }

    #[test]
    fn steal_blocked() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Steal, Some(2)));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: None });
        try_intent(&mut game, &mut rng, Intent::Counteract { challenger: Some(2), blocking_role: Some(Ambassador) });

        assert_eq!(game.players[0].coins, 2);
        assert_eq!(game.players[2].coins, 2);
        assert_eq!(game.current_turn, 1);
    }

    #[test]
    fn exchange() {
        let (mut game, mut rng) = new_match(3);
        give(&mut game, 0, &[Ambassador, Duke]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Exchange, None));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: None });

        assert_eq!(game.players[0].hand.len(), 4);
        assert_eq!(game.num_cards_before_exchange, Some(2));
        assert_eq!(game.current_stage, Stage::LoseInfluence);

        let first = game.players[0].hand[0];
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 0, role: first });
        assert_eq!(game.players[0].hand.len(), 3);
        assert_eq!(game.current_stage, Stage::LoseInfluence);
        assert_eq!(game.current_turn, 0);

        let second = game.players[0].hand[0];
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 0, role: second });
        assert_eq!(game.players[0].hand.len(), 2);
        assert!(game.revealed_cards.is_empty());
        assert_eq!(game.num_cards_before_exchange, None);
        assert_eq!(game.current_turn, 1);
        assert_eq!(game.current_stage, Stage::Action);
    }

    #[test]
    fn exchange_challenge_proven() {
        let (mut game, mut rng) = new_match(3);
        give(&mut game, 0, &[Ambassador, Duke]);
        give(&mut game, 1, &[Contessa, Contessa]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Exchange, None));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: Some(1) });

        // the challenger pays first, then the exchange is returned
        assert_eq!(game.players[0].hand.len(), 4);
        assert_eq!(game.pending_losses.len(), 2);
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Contessa });
        assert_eq!(game.current_stage, Stage::LoseInfluence);
        assert_eq!(game.pending_losses.front(), Some(&PendingLoss { player: 0, kind: LossKind::ExchangeReturn }));

        for _ in 0..2 {
            let card = game.players[0].hand[0];
            try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 0, role: card });
        }

        assert_eq!(game.players[0].hand.len(), 2);
        assert_eq!(game.revealed_cards, vec![Contessa]);
        assert_eq!(game.current_turn, 1);
    }

    #[test]
    fn coup_eliminates() {
        let (mut game, mut rng) = new_match(3);
        game.players[0].coins = 7;
        game.players[1].coins = 4;
        game.treasury -= 7;
        give(&mut game, 1, &[Contessa]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Coup, Some(1)));
        assert_eq!(game.players[0].coins, 0);
        assert_eq!(game.current_stage, Stage::LoseInfluence);
        assert_eq!(game.current_target, Some(1));

        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Contessa });

        assert!(game.is_eliminated(1));
        assert_eq!(game.players[1].coins, 0);
        assert_eq!(game.revealed_cards, vec![Contessa]);
        // player 1 is out, so player 2 is up
        assert_eq!(game.current_turn, 2);

        try_intent(&mut game, &mut rng, act(2, ActionKind::Income, None));
        assert_eq!(game.current_turn, 0);
    }

    #[test]
    fn assassinate_challenged_by_target() {
        let (mut game, mut rng) = new_match(3);
        game.players[0].coins = 3;
        game.treasury -= 1;
        give(&mut game, 0, &[Assassin, Duke]);
        give(&mut game, 1, &[Captain, Captain]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Assassinate, Some(1)));
        assert_eq!(game.players[0].coins, 0);
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: Some(1) });

        // losing the challenge and the assassination takes both cards
        assert_eq!(game.pending_losses.len(), 2);
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Captain });
        assert_eq!(game.pending_losses.front(), Some(&PendingLoss { player: 1, kind: LossKind::Targeted }));
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Captain });

        assert!(game.is_eliminated(1));
        assert_eq!(game.current_turn, 2);
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn assassinate_queue_skips_eliminated_target() {
        let (mut game, mut rng) = new_match(3);
        game.players[0].coins = 3;
        game.treasury -= 1;
        give(&mut game, 0, &[Assassin, Duke]);
        give(&mut game, 1, &[Captain]);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Assassinate, Some(1)));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: Some(1) });
        try_intent(&mut game, &mut rng, Intent::LoseInfluence { player: 1, role: Captain });

        assert!(game.is_eliminated(1));
        assert!(game.pending_losses.is_empty());
        assert_eq!(game.current_stage, Stage::Action);
        assert_eq!(game.current_turn, 2);
    }

    #[test]
    fn assassinate_blocked_keeps_cost() {
        let (mut game, mut rng) = new_match(3);
        game.players[0].coins = 3;
        game.treasury -= 1;

        try_intent(&mut game, &mut rng, act(0, ActionKind::Assassinate, Some(2)));
        try_intent(&mut game, &mut rng, Intent::Challenge { challenger: None });
        try_intent(&mut game, &mut rng, Intent::Counteract { challenger: Some(2), blocking_role: Some(Contessa) });

        assert_eq!(game.players[0].coins, 0);
        assert_eq!(game.players[2].hand.len(), 2);
        assert_eq!(game.current_turn, 1);
    }

    #[test]
    fn must_coup() {
        let (mut game, mut rng) = new_match(3);
        game.players[0].coins = 10;
        game.treasury -= 8;
        let before = game.clone();

        assert!(matches!(
            game.apply(act(0, ActionKind::Income, None), &mut rng),
            Err(CoupError::MustCoup { coins: 10 })
        ));
        assert!(matches!(
            game.apply(act(0, ActionKind::Assassinate, Some(1)), &mut rng),
            Err(CoupError::MustCoup { coins: 10 })
        ));
        assert_eq!(game, before);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Coup, Some(1)));
        assert_eq!(game.players[0].coins, 3);
    }

    #[test]
    fn validation_leaves_match_untouched() {
        let (mut game, mut rng) = new_match(3);
        let before = game.clone();

        assert!(matches!(
            game.apply(act(1, ActionKind::Income, None), &mut rng),
            Err(CoupError::NotYourTurn { player: 1, current_turn: 0 })
        ));
        assert!(matches!(
            game.apply(act(0, ActionKind::Steal, None), &mut rng),
            Err(CoupError::MissingTarget(ActionKind::Steal))
        ));
        assert!(matches!(
            game.apply(act(0, ActionKind::Steal, Some(0)), &mut rng),
            Err(CoupError::InvalidTarget(0))
        ));
        assert!(matches!(
            game.apply(act(0, ActionKind::Coup, Some(1)), &mut rng),
            Err(CoupError::InsufficientFunds { needed: 7, available: 2 })
        ));
        assert!(matches!(
            game.apply(act(9, ActionKind::Income, None), &mut rng),
            Err(CoupError::InvalidPlayer(9))
        ));
        assert!(matches!(
            game.apply(Intent::Challenge { challenger: Some(1) }, &mut rng),
            Err(CoupError::WrongStage { expected: Stage::Challenge, actual: Stage::Action })
        ));
        assert!(matches!(
            game.apply(Intent::LoseInfluence { player: 0, role: Duke }, &mut rng),
            Err(CoupError::WrongStage { expected: Stage::LoseInfluence, actual: Stage::Action })
        ));

        assert_eq!(game, before);
    }

    #[test]
    fn challenger_must_be_opponent() {
        let (mut game, mut rng) = new_match(3);

        try_intent(&mut game, &mut rng, act(0, ActionKind::Tax, None));
        let before = game.clone();

        assert!(matches!(
            game.apply(Intent::Challenge { challenger: Some(0) }, &mut rng),
            Err(CoupError::InvalidPlayer(0))
        ));
        assert!(matches!(
            game.apply(Intent::Challenge { challenger: Some(5) }, &mut rng),
            Err(CoupError::InvalidPlayer(5))
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn turn_skips_eliminated_and_wraps() {
        let (mut game, _) = new_match(4);
        game.court_deck.extend(std::mem::take(&mut game.players[1].hand));
        game.court_deck.extend(std::mem::take(&mut game.players[3].hand));

        game.advance_turn();
        assert_eq!(game.current_turn, 2);
        game.advance_turn();
        assert_eq!(game.current_turn, 0);
        assert!(game.message.ends_with(" Player 2 take action. Player 0 take action."));
    }

    #[test]
    fn random_games_conserve() {
        use rand::Rng;

        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let player_count = 2 + (seed as usize % 5);
            let mut game = Match::new(format!("g{seed}"), player_count, 0, &mut rng).unwrap();

            for _ in 0..1000 {
                let mut intents = game.intents();
                assert!(!intents.is_empty(), "no intents generated during unfinished game");

                let random_index = rng.gen_range(0..intents.len());
                let intent = intents.remove(random_index);
                try_intent(&mut game, &mut rng, intent);

                if game.winner().is_some() {
                    break;
                }
            }
        }
    }
}
