use std::cmp::Ordering;

use rand::Rng;
use serde::Serialize;

use crate::{
    card::Card,
    config::TableRules,
    deck::Deck,
    error::{GameError, Result},
    hand::{Hand, HandClass, Totals},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GameStatus {
    InProgress,
    PlayerWon,
    DealerWon,
    Draw,
}

/// What a player at the table is allowed to see of one hand.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    /// Face-down cards are `None`.
    pub cards: Vec<Option<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<HandClass>,
}

impl HandView {
    fn of(hand: &Hand) -> Self {
        let hidden = hand.has_hidden_card();
        HandView {
            cards: hand
                .cards()
                .iter()
                .map(|card| card.is_face_up().then_some(*card))
                .collect(),
            totals: (!hidden).then(|| hand.totals()),
            classification: (!hidden).then(|| hand.classification()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub status: GameStatus,
    pub account: i64,
    pub bet: u32,
    pub num_decks: u8,
    pub remaining_cards: usize,
    pub player: HandView,
    pub dealer: HandView,
}

/// One player against the dealer, with the player's running account.
#[derive(Debug)]
pub struct BlackjackGame<R> {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    rng: R,
    rules: TableRules,
    num_decks: u8,
    status: GameStatus,
    account: i64,
    bet: u32,
    dealt: bool,
}

impl<R: Rng> BlackjackGame<R> {
    pub fn new(rng: R, num_decks: u8) -> Result<Self> {
        Self::with_rules(rng, num_decks, TableRules::default())
    }

    pub fn with_rules(rng: R, num_decks: u8, rules: TableRules) -> Result<Self> {
        if num_decks == 0 {
            return Err(GameError::InvalidDeckCount(num_decks));
        }
        Ok(BlackjackGame {
            deck: Deck::new(),
            player: Hand::new(),
            dealer: Hand::new(),
            rng,
            account: rules.starting_account,
            bet: rules.starting_bet,
            rules,
            num_decks,
            status: GameStatus::InProgress,
            dealt: false,
        })
    }

    /// Starts a new round on a freshly built and shuffled deck.
    pub fn deal(&mut self) -> Result<()> {
        self.check_bet(self.bet)?;
        self.deck.build(self.num_decks, &mut self.rng);
        self.start_round()
    }

    fn start_round(&mut self) -> Result<()> {
        self.player.clear();
        self.dealer.clear();
        self.status = GameStatus::InProgress;

        self.player.push(self.deck.draw()?);
        let mut hole = self.deck.draw()?;
        hole.set_face_down();
        self.dealer.push(hole);
        self.player.push(self.deck.draw()?);
        self.dealer.push(self.deck.draw()?);

        self.account -= i64::from(self.bet);
        self.dealt = true;
        log::debug!(
            "dealt player {:?}, dealer shows {:?}, bet {} leaves account at {}",
            self.player.totals(),
            self.dealer_up_card(),
            self.bet,
            self.account
        );
        Ok(())
    }

    pub fn player_hit(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        let card = self.deck.draw()?;
        self.player.push(card);
        log::debug!("player draws {card}, totals {:?}", self.player.totals());

        if self.player.classification() == HandClass::Bust {
            self.settle(GameStatus::DealerWon);
        }
        Ok(())
    }

    pub fn player_stand(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        self.dealer.reveal_hole_card();
        self.play_dealer()?;
        let status = resolve(&self.player, &self.dealer);
        self.settle(status);
        Ok(())
    }

    fn play_dealer(&mut self) -> Result<()> {
        while let Some(best) = self.dealer.totals().best() {
            if best >= self.rules.dealer_stands_on {
                break;
            }
            let card = self.deck.draw()?;
            self.dealer.push(card);
            log::debug!("dealer draws {card} on {best}");
        }
        Ok(())
    }

    fn settle(&mut self, status: GameStatus) {
        let stake = i64::from(self.bet);
        self.account += match status {
            GameStatus::PlayerWon => stake * 2,
            GameStatus::Draw => stake,
            GameStatus::DealerWon | GameStatus::InProgress => 0,
        };
        self.status = status;
        log::info!(
            "round over: {:?} (player {:?}, dealer {:?}), account {}",
            status,
            self.player.classification(),
            self.dealer.classification(),
            self.account
        );
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if !self.dealt {
            log::warn!("action rejected before the first deal");
            return Err(GameError::NoActiveRound);
        }
        if self.status != GameStatus::InProgress {
            log::warn!("action rejected, round already ended with {:?}", self.status);
            return Err(GameError::RoundOver(self.status));
        }
        Ok(())
    }

    fn check_bet(&self, bet: u32) -> Result<()> {
        if self.rules.enforce_bet_limit && i64::from(bet) > self.account {
            return Err(GameError::InvalidBetAmount {
                bet,
                account: self.account,
            });
        }
        Ok(())
    }

    pub fn player_cards(&self) -> Vec<Card> {
        self.player.cards().to_vec()
    }

    pub fn dealer_cards(&self) -> Vec<Card> {
        self.dealer.cards().to_vec()
    }

    /// The first face-up card in the dealer's hand.
    pub fn dealer_up_card(&self) -> Option<Card> {
        self.dealer.cards().iter().copied().find(Card::is_face_up)
    }

    pub fn player_totals(&self) -> Totals {
        self.player.totals()
    }

    pub fn dealer_totals(&self) -> Totals {
        self.dealer.totals()
    }

    pub fn player_evaluation(&self) -> HandClass {
        self.player.classification()
    }

    pub fn dealer_evaluation(&self) -> HandClass {
        self.dealer.classification()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn account(&self) -> i64 {
        self.account
    }

    pub fn set_account(&mut self, amount: i64) {
        self.account = amount;
    }

    pub fn bet(&self) -> u32 {
        self.bet
    }

    pub fn set_bet(&mut self, amount: u32) -> Result<()> {
        self.check_bet(amount)?;
        self.bet = amount;
        Ok(())
    }

    pub fn deck(&self) -> Vec<Card> {
        self.deck.cards()
    }

    pub fn remaining_cards(&self) -> usize {
        self.deck.remaining_cards()
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            status: self.status,
            account: self.account,
            bet: self.bet,
            num_decks: self.num_decks,
            remaining_cards: self.deck.remaining_cards(),
            player: HandView::of(&self.player),
            dealer: HandView::of(&self.dealer),
        }
    }
}

/// Decides a finished round. A bust loses outright; two 21s compare by
/// class (a natural beats a drawn 21); otherwise the higher best total wins.
pub fn resolve(player: &Hand, dealer: &Hand) -> GameStatus {
    let player_class = player.classification();
    let dealer_class = dealer.classification();

    if player_class == HandClass::Bust {
        return GameStatus::DealerWon;
    }
    if dealer_class == HandClass::Bust {
        return GameStatus::PlayerWon;
    }

    let ordering = if player_class.is_twenty_one() && dealer_class.is_twenty_one() {
        dealer_class.cmp(&player_class)
    } else {
        player.totals().best().cmp(&dealer.totals().best())
    };

    match ordering {
        Ordering::Greater => GameStatus::PlayerWon,
        Ordering::Less => GameStatus::DealerWon,
        Ordering::Equal => GameStatus::Draw,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;
    use crate::card::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Diamonds)
    }

    fn hand(ranks: &[Rank]) -> Hand {
        ranks.iter().map(|&rank| card(rank)).collect()
    }

    /// Deals from a fixed deck: player, dealer hole, player, dealer up, then
    /// whatever follows for hits and dealer draws.
    fn stacked_game(ranks: &[Rank]) -> BlackjackGame<SmallRng> {
        let mut game = BlackjackGame::new(SmallRng::seed_from_u64(0), 1).unwrap();
        game.deck = Deck::stacked(ranks.iter().map(|&rank| card(rank)).collect());
        game.start_round().unwrap();
        game
    }

    #[test]
    fn new_game_starts_with_house_defaults() {
        let game = BlackjackGame::new(SmallRng::seed_from_u64(1), 2).unwrap();
        assert_eq!(game.account(), 200);
        assert_eq!(game.bet(), 5);
        assert_eq!(game.num_decks(), 2);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.deck().is_empty());
    }

    #[test]
    fn zero_decks_is_rejected() {
        assert_matches!(
            BlackjackGame::new(SmallRng::seed_from_u64(1), 0),
            Err(GameError::InvalidDeckCount(0))
        );
    }

    #[test]
    fn deal_order_and_hole_card() {
        let game = stacked_game(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five]);

        let player: Vec<Rank> = game.player_cards().iter().map(Card::rank).collect();
        let dealer = game.dealer_cards();
        assert_eq!(player, vec![Rank::Two, Rank::Four]);
        assert_eq!(dealer[0].rank(), Rank::Three);
        assert!(!dealer[0].is_face_up());
        assert_eq!(dealer[1].rank(), Rank::Five);
        assert!(dealer[1].is_face_up());
        assert_eq!(game.dealer_up_card().map(|c| c.rank()), Some(Rank::Five));
        assert_eq!(game.account(), 195);
    }

    #[test]
    fn hitting_into_bust_ends_round_without_dealer_play() {
        let mut game = stacked_game(&[Rank::King, Rank::Two, Rank::Queen, Rank::Three, Rank::Five]);
        game.player_hit().unwrap();

        assert_eq!(game.player_evaluation(), HandClass::Bust);
        assert_eq!(game.status(), GameStatus::DealerWon);
        assert_eq!(game.dealer_cards().len(), 2);
        assert!(!game.dealer_cards()[0].is_face_up());
        assert_eq!(game.account(), 195);
        assert_matches!(
            game.player_stand(),
            Err(GameError::RoundOver(GameStatus::DealerWon))
        );
        assert_matches!(game.player_hit(), Err(GameError::RoundOver(_)));
    }

    #[test]
    fn hit_without_bust_keeps_round_open() {
        let mut game = stacked_game(&[Rank::Two, Rank::Ten, Rank::Three, Rank::Seven, Rank::Four]);
        game.player_hit().unwrap();
        assert_eq!(game.player_totals(), Totals::Candidates(vec![9]));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn lower_total_loses_and_keeps_debit() {
        // player 12, dealer 10 + 9 = 19
        let mut game = stacked_game(&[Rank::Ten, Rank::Ten, Rank::Two, Rank::Nine]);
        game.player_stand().unwrap();

        assert_eq!(game.status(), GameStatus::DealerWon);
        assert_eq!(game.account(), 195);
        assert!(game.dealer_cards().iter().all(Card::is_face_up));
    }

    #[test]
    fn higher_total_pays_double() {
        // player 20, dealer 10 + 7 = 17
        let mut game = stacked_game(&[Rank::King, Rank::Ten, Rank::Queen, Rank::Seven]);
        game.player_stand().unwrap();

        assert_eq!(game.status(), GameStatus::PlayerWon);
        assert_eq!(game.account(), 205);
    }

    #[test]
    fn equal_totals_return_the_stake() {
        let mut game = stacked_game(&[Rank::King, Rank::Ten, Rank::Eight, Rank::Eight]);
        game.player_stand().unwrap();

        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(game.account(), 200);
    }

    #[test]
    fn dealer_draws_below_sixteen_and_stops_at_it() {
        // dealer 10 + 2 = 12, draws 3 (15), draws 4 (19), leaves the Ace
        let mut game = stacked_game(&[
            Rank::Nine,
            Rank::Ten,
            Rank::Nine,
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Ace,
        ]);
        game.player_stand().unwrap();

        let dealer: Vec<Rank> = game.dealer_cards().iter().map(Card::rank).collect();
        assert_eq!(dealer, vec![Rank::Ten, Rank::Two, Rank::Three, Rank::Four]);
        assert_eq!(game.remaining_cards(), 1);
        assert_eq!(game.status(), GameStatus::DealerWon);
    }

    #[test]
    fn dealer_stands_on_soft_sixteen() {
        let mut game = stacked_game(&[Rank::Ten, Rank::Ace, Rank::Seven, Rank::Five, Rank::Two]);
        game.player_stand().unwrap();

        assert_eq!(game.dealer_cards().len(), 2);
        assert_eq!(game.dealer_totals(), Totals::Candidates(vec![6, 16]));
        assert_eq!(game.status(), GameStatus::PlayerWon);
        assert_eq!(game.account(), 205);
    }

    #[test]
    fn dealer_bust_pays_player() {
        // dealer 10 + 5 = 15, draws King
        let mut game = stacked_game(&[Rank::Two, Rank::Ten, Rank::Three, Rank::Five, Rank::King]);
        game.player_stand().unwrap();

        assert_eq!(game.dealer_evaluation(), HandClass::Bust);
        assert_eq!(game.dealer_totals(), Totals::Bust);
        assert_eq!(game.status(), GameStatus::PlayerWon);
        assert_eq!(game.account(), 205);
    }

    #[test]
    fn natural_beats_drawn_twenty_one() {
        // dealer 7 + 7 draws 7
        let mut game = stacked_game(&[Rank::Ace, Rank::Seven, Rank::King, Rank::Seven, Rank::Seven]);
        game.player_stand().unwrap();

        assert_eq!(game.player_evaluation(), HandClass::Blackjack);
        assert_eq!(game.dealer_evaluation(), HandClass::Has21);
        assert_eq!(game.status(), GameStatus::PlayerWon);
    }

    #[test]
    fn drawn_twenty_one_loses_to_dealer_natural() {
        let mut game = stacked_game(&[Rank::Seven, Rank::Ace, Rank::Seven, Rank::Queen, Rank::Seven]);
        game.player_hit().unwrap();
        assert_eq!(game.player_evaluation(), HandClass::Has21);
        game.player_stand().unwrap();

        assert_eq!(game.dealer_evaluation(), HandClass::Blackjack);
        assert_eq!(game.status(), GameStatus::DealerWon);
        assert_eq!(game.account(), 195);
    }

    #[test]
    fn two_naturals_push() {
        let mut game = stacked_game(&[Rank::Ace, Rank::King, Rank::Jack, Rank::Ace]);
        game.player_stand().unwrap();

        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(game.account(), 200);
    }

    #[test]
    fn drawn_twenty_one_beats_dealer_under() {
        assert_eq!(
            resolve(
                &hand(&[Rank::Seven, Rank::Seven, Rank::Seven]),
                &hand(&[Rank::King, Rank::Nine])
            ),
            GameStatus::PlayerWon
        );
        assert_eq!(
            resolve(
                &hand(&[Rank::King, Rank::Nine]),
                &hand(&[Rank::Six, Rank::Five, Rank::King])
            ),
            GameStatus::DealerWon
        );
    }

    #[test]
    fn actions_before_first_deal_are_rejected() {
        let mut game = BlackjackGame::new(SmallRng::seed_from_u64(3), 1).unwrap();
        assert_matches!(game.player_hit(), Err(GameError::NoActiveRound));
        assert_matches!(game.player_stand(), Err(GameError::NoActiveRound));
    }

    #[test]
    fn running_out_of_cards_fails_fast() {
        let mut game = stacked_game(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five]);
        assert_matches!(game.player_hit(), Err(GameError::EmptyDeck));
        assert_eq!(game.player_cards().len(), 2);
    }

    #[test]
    fn bets_are_unchecked_by_default() {
        let mut game = BlackjackGame::new(SmallRng::seed_from_u64(4), 1).unwrap();
        game.set_bet(500).unwrap();
        game.deal().unwrap();
        assert_eq!(game.account(), -300);
    }

    #[test]
    fn bet_limit_is_enforced_when_enabled() {
        let rules = TableRules {
            enforce_bet_limit: true,
            ..TableRules::default()
        };
        let mut game = BlackjackGame::with_rules(SmallRng::seed_from_u64(4), 1, rules).unwrap();

        assert_matches!(
            game.set_bet(201),
            Err(GameError::InvalidBetAmount { bet: 201, account: 200 })
        );
        assert_eq!(game.bet(), 5);

        game.set_bet(200).unwrap();
        game.set_account(100);
        assert_matches!(game.deal(), Err(GameError::InvalidBetAmount { .. }));
        assert_eq!(game.account(), 100);
    }

    #[test]
    fn custom_stand_threshold() {
        let rules = TableRules {
            dealer_stands_on: 17,
            ..TableRules::default()
        };
        let mut game = BlackjackGame::with_rules(SmallRng::seed_from_u64(0), 1, rules).unwrap();
        game.deck = Deck::stacked(
            [Rank::Ten, Rank::Ten, Rank::Eight, Rank::Six, Rank::Two]
                .iter()
                .map(|&rank| card(rank))
                .collect(),
        );
        game.start_round().unwrap();
        game.player_stand().unwrap();

        assert_eq!(game.dealer_cards().len(), 3);
        assert_eq!(game.status(), GameStatus::Draw);
    }

    #[test]
    fn snapshot_hides_the_hole_card_until_stand() {
        let mut game = stacked_game(&[Rank::Ten, Rank::Nine, Rank::Queen, Rank::Eight]);
        let before = game.snapshot();
        assert_eq!(before.dealer.cards[0], None);
        assert!(before.dealer.totals.is_none());
        assert_eq!(before.player.totals, Some(Totals::Candidates(vec![20])));

        game.player_stand().unwrap();
        let after = game.snapshot();
        assert!(after.dealer.cards.iter().all(Option::is_some));
        assert_eq!(after.dealer.classification, Some(HandClass::Under21));
        assert_eq!(after.status, GameStatus::PlayerWon);
    }
}
