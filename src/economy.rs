use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use crate::{Character, CoupError, Match};

impl Match {
    /// Moves up to `num_coins` from the treasury to the player and returns how many moved.
    pub fn take_coins(&mut self, player_idx: usize, num_coins: u32) -> u32 {
        let taken = num_coins.min(self.treasury);
        self.treasury -= taken;
        self.players[player_idx].coins += taken;
        self.message = format!("{taken} coins taken from treasury!");

        debug!(match_id = %self.id, player = player_idx, requested = num_coins, taken, "take coins");
        taken
    }

    /// Pays `num_coins` into the treasury, or fails without moving anything.
    pub fn pay_coins(&mut self, player_idx: usize, num_coins: u32) -> Result<(), CoupError> {
        let player = &mut self.players[player_idx];
        if player.coins < num_coins {
            return Err(CoupError::InsufficientFunds {
                needed: num_coins,
                available: player.coins,
            });
        }

        player.coins -= num_coins;
        self.treasury += num_coins;
        Ok(())
    }

    /// Moves up to `num_coins` from the target to the player and returns how many moved.
    pub fn steal_coins(&mut self, player_idx: usize, target_player_idx: usize, num_coins: u32) -> u32 {
        let stolen = num_coins.min(self.players[target_player_idx].coins);
        self.players[target_player_idx].coins -= stolen;
        self.players[player_idx].coins += stolen;
        self.message = format!("{stolen} coins stolen from player {target_player_idx}!");

        debug!(match_id = %self.id, player = player_idx, target = target_player_idx, stolen, "steal coins");
        stolen
    }

    /// Shuffles the court deck, then deals cards off the top into the player's hand.
    pub fn draw_cards<R: Rng + Sized>(&mut self, player_idx: usize, num_cards: usize, rng: &mut R) {
        self.court_deck.shuffle(rng);
        for _ in 0..num_cards {
            match self.court_deck.pop() {
                Some(card) => self.players[player_idx].hand.push(card),
                None => break,
            }
        }
    }

    fn remove_card(&mut self, player_idx: usize, role: Character) -> Result<(), CoupError> {
        let hand = &mut self.players[player_idx].hand;
        let card_idx = hand
            .iter()
            .position(|&card| card == role)
            .ok_or(CoupError::CardNotFound { player: player_idx, role })?;
        hand.remove(card_idx);
        Ok(())
    }

    /// Returns a proven role to the court deck and draws its replacement.
    pub fn replace_card<R: Rng + Sized>(&mut self, player_idx: usize, role: Character, rng: &mut R) -> Result<(), CoupError> {
        self.remove_card(player_idx, role)?;
        self.court_deck.push(role);
        self.draw_cards(player_idx, 1, rng);
        Ok(())
    }

    /// Takes `role` out of the player's hand, face up into the revealed cards
    /// or face down back into the court deck.
    ///
    /// Emptying the hand eliminates the player and their coins go back to the
    /// treasury. Returns whether the player was eliminated.
    pub fn lose_influence<R: Rng + Sized>(&mut self, player_idx: usize, role: Character, reveal: bool, rng: &mut R) -> Result<bool, CoupError> {
        self.remove_card(player_idx, role)?;

        if reveal {
            self.revealed_cards.push(role);
        } else {
            self.court_deck.push(role);
            self.court_deck.shuffle(rng);
        }

        debug!(match_id = %self.id, player = player_idx, %role, reveal, "lose influence");

        if self.is_eliminated(player_idx) {
            self.eliminate(player_idx);
            return Ok(true);
        }
        Ok(false)
    }

    fn eliminate(&mut self, player_idx: usize) {
        let coins = std::mem::take(&mut self.players[player_idx].coins);
        self.treasury += coins;
        debug!(match_id = %self.id, player = player_idx, refunded = coins, "player eliminated");
    }
}
