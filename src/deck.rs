use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng};

use crate::{
    card::{Card, Rank, Suit},
    error::{GameError, Result},
};

pub const CARDS_PER_DECK: usize = 52;

#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn new() -> Self {
        Deck::default()
    }

    /// Throws away whatever is left and lays out `num_decks` fresh 52-card
    /// sets, shuffled with the caller's random source.
    pub fn build<R: Rng + ?Sized>(&mut self, num_decks: u8, rng: &mut R) {
        let mut cards = Vec::with_capacity(num_decks as usize * CARDS_PER_DECK);
        for _ in 0..num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }

        cards.shuffle(rng);
        self.cards = cards.into();
        log::debug!("built shoe of {} cards from {} deck(s)", self.cards.len(), num_decks);
    }

    /// Takes the card at the front of the deck.
    pub fn draw(&mut self) -> Result<Card> {
        self.cards.pop_front().ok_or(GameError::EmptyDeck)
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.iter().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn stacked(cards: Vec<Card>) -> Self {
        Deck {
            cards: cards.into(),
        }
    }
}
