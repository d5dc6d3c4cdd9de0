use chrono::{DateTime, Local};
use rand::Rng;

use crate::entity::{EntityList, SaveMode};
use crate::models::{Flashcard, FlashcardDraft, Subject};
use crate::store::Persistence;
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    /// 1-based position in the deck
    pub position: usize,
    pub total: usize,
    pub set: String,
    pub subject: Subject,
    /// Front text, or back text when flipped
    pub face: String,
    pub flipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckView {
    Empty,
    Card(CardView),
}

/// The flashcard list plus a cyclic cursor over it
pub struct FlashcardDeck {
    cards: EntityList<Flashcard>,
    current_index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    pub fn load(persistence: Persistence) -> Self {
        Self {
            cards: EntityList::load(persistence),
            current_index: 0,
            flipped: false,
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        self.cards.items()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn save(
        &mut self,
        mode: SaveMode,
        draft: FlashcardDraft,
        now: DateTime<Local>,
    ) -> Result<Option<u64>, ValidationError> {
        self.cards.save(mode, draft, now)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        if !self.cards.delete(id) {
            return false;
        }
        if self.current_index >= self.cards.len() {
            self.current_index = 0;
        }
        self.flipped = false;
        true
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.items().get(self.current_index)
    }

    pub fn flip(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.flipped = !self.flipped;
    }

    pub fn next_card(&mut self) {
        let len = self.cards.len();
        if len == 0 {
            return;
        }
        self.current_index = (self.current_index + 1) % len;
        self.flipped = false;
    }

    pub fn previous_card(&mut self) {
        let len = self.cards.len();
        if len == 0 {
            return;
        }
        self.current_index = (self.current_index + len - 1) % len;
        self.flipped = false;
    }

    /// Fisher–Yates shuffle of the whole deck, then back to the first card
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        if self.cards.is_empty() {
            return;
        }
        self.cards.reorder(|cards| {
            for i in (1..cards.len()).rev() {
                let j = rng.gen_range(0..=i);
                cards.swap(i, j);
            }
        });
        self.current_index = 0;
        self.flipped = false;
    }

    /// Distinct set names in order of first appearance
    pub fn sets(&self) -> Vec<&str> {
        let mut sets: Vec<&str> = Vec::new();
        for card in self.cards.items() {
            if !sets.contains(&card.set.as_str()) {
                sets.push(&card.set);
            }
        }
        sets
    }

    pub fn view(&self) -> DeckView {
        let Some(card) = self.current() else {
            return DeckView::Empty;
        };
        DeckView::Card(CardView {
            position: self.current_index + 1,
            total: self.cards.len(),
            set: card.set.clone(),
            subject: card.subject,
            face: if self.flipped {
                card.back.clone()
            } else {
                card.front.clone()
            },
            flipped: self.flipped,
        })
    }

    pub fn seed(&mut self, cards: Vec<Flashcard>) -> bool {
        self.cards.seed(cards)
    }
}
