use crate::engine::card::Flashcard;
use crate::error::Result;
use crate::store::CardPersistence;
use crate::store::schema::FlashcardRecord;

/// The in-memory card set and the persistence it is flushed to.
pub struct CardStore<P: CardPersistence> {
    cards: Vec<Flashcard>,
    persistence: P,
    recovered_empty: bool,
}

impl<P: CardPersistence> CardStore<P> {
    /// Load the set, falling back to an empty one if the persisted data is
    /// missing or malformed. Intervals are pulled into `[min, max]`.
    ///
    /// After a fallback the empty set is never flushed, so unreadable data
    /// stays on disk for the user to repair.
    pub fn load(persistence: P, min_interval: u64, max_interval: u64) -> Self {
        match persistence.load() {
            Ok(records) => Self::from_records(records, persistence, min_interval, max_interval),
            Err(err) => {
                tracing::warn!(error = %err, "starting with an empty card set");
                Self {
                    cards: Vec::new(),
                    persistence,
                    recovered_empty: true,
                }
            }
        }
    }

    /// Like [`CardStore::load`], but a load failure is returned.
    pub fn try_load(persistence: P, min_interval: u64, max_interval: u64) -> Result<Self> {
        let records = persistence.load()?;
        Ok(Self::from_records(records, persistence, min_interval, max_interval))
    }

    fn from_records(
        records: Vec<FlashcardRecord>,
        persistence: P,
        min_interval: u64,
        max_interval: u64,
    ) -> Self {
        let mut store = Self::from_cards(records.into_iter().map(Flashcard::from).collect(), persistence);
        store.normalize_intervals(min_interval, max_interval);
        tracing::info!(cards = store.len(), "loaded flashcards");
        store
    }

    pub fn from_cards(cards: Vec<Flashcard>, persistence: P) -> Self {
        Self {
            cards,
            persistence,
            recovered_empty: false,
        }
    }

    fn normalize_intervals(&mut self, min_interval: u64, max_interval: u64) {
        for card in &mut self.cards {
            let clamped = card.interval.clamp(min_interval, max_interval.max(min_interval));
            if clamped != card.interval {
                tracing::warn!(
                    card = %card.front_text(),
                    interval = card.interval,
                    clamped,
                    "interval out of bounds"
                );
                card.interval = clamped;
            }
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Flashcard> {
        self.cards.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn due_count(&self, now_secs: u64) -> usize {
        self.cards.iter().filter(|c| c.is_due(now_secs)).count()
    }

    pub fn remove(&mut self, index: usize) -> Option<Flashcard> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    /// Forget every card's scheduling history.
    pub fn reset_all(&mut self, interval: u64) {
        tracing::info!(cards = self.cards.len(), "resetting cards");
        for card in &mut self.cards {
            card.reset(interval);
        }
    }

    pub fn records(&self) -> Vec<FlashcardRecord> {
        self.cards.iter().map(FlashcardRecord::from).collect()
    }

    /// True when loading failed and the set was started empty.
    pub fn recovered_empty(&self) -> bool {
        self.recovered_empty
    }

    /// Write the whole set. Failures are returned, never retried here.
    pub fn flush(&self) -> Result<()> {
        if self.recovered_empty && self.cards.is_empty() {
            tracing::warn!("not saving the empty fallback set over unreadable card data");
            return Ok(());
        }
        self.persistence.save(&self.records())?;
        tracing::debug!(cards = self.cards.len(), "saved flashcards");
        Ok(())
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}
