use serde::Serialize;

use crate::card::Card;

pub const BLACKJACK: u32 = 21;

/// Legal totals of a hand, lowest first. The last entry is the one used for
/// comparisons and for the dealer's drawing decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "totals", rename_all = "camelCase")]
pub enum Totals {
    Bust,
    Candidates(Vec<u32>),
}

impl Totals {
    pub fn is_bust(&self) -> bool {
        matches!(self, Totals::Bust)
    }

    pub fn best(&self) -> Option<u32> {
        match self {
            Totals::Bust => None,
            Totals::Candidates(totals) => totals.last().copied(),
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        match self {
            Totals::Bust => &[],
            Totals::Candidates(totals) => totals,
        }
    }
}

/// Ordered best to worst, so a natural compares below a drawn 21.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HandClass {
    Blackjack,
    Has21,
    Under21,
    Bust,
}

impl HandClass {
    pub fn is_twenty_one(self) -> bool {
        matches!(self, HandClass::Blackjack | HandClass::Has21)
    }
}

/// Only the first Ace in the hand is ever allowed to count 11.
pub fn evaluate(cards: &[Card]) -> Totals {
    let mut low = 0;
    let mut high: Option<u32> = None;

    for card in cards {
        low += card.value();
        high = match high {
            Some(total) => Some(total + card.value()),
            None if card.is_ace() => Some(low + 10),
            None => None,
        };
    }

    if low > BLACKJACK {
        return Totals::Bust;
    }

    match high {
        Some(high) if high <= BLACKJACK => Totals::Candidates(vec![low, high]),
        _ => Totals::Candidates(vec![low]),
    }
}

pub fn classify(totals: &Totals, hand_size: usize) -> HandClass {
    match totals.best() {
        None => HandClass::Bust,
        Some(BLACKJACK) if hand_size == 2 => HandClass::Blackjack,
        Some(BLACKJACK) => HandClass::Has21,
        Some(_) => HandClass::Under21,
    }
}

/// Cards in the order they were dealt. Only the visibility of a card already
/// in the hand can change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Hand::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn totals(&self) -> Totals {
        evaluate(&self.cards)
    }

    pub fn classification(&self) -> HandClass {
        classify(&self.totals(), self.cards.len())
    }

    pub fn has_hidden_card(&self) -> bool {
        self.cards.iter().any(|card| !card.is_face_up())
    }

    /// Turns the face-down card face up. Returns false when there was none.
    pub fn reveal_hole_card(&mut self) -> bool {
        match self.cards.iter_mut().find(|card| !card.is_face_up()) {
            Some(card) => {
                card.set_face_up();
                true
            }
            None => false,
        }
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Hand {
            cards: iter.into_iter().collect(),
        }
    }
}
