pub mod card_store;
pub mod json_store;
pub mod memory;
pub mod schema;

use crate::error::Result;
use crate::store::schema::FlashcardRecord;

pub use card_store::CardStore;
pub use json_store::JsonStore;
pub use memory::MemoryStore;

/// Where the card set lives between runs.
pub trait CardPersistence {
    fn load(&self) -> Result<Vec<FlashcardRecord>>;

    /// Replace the whole persisted set with `records`.
    fn save(&self, records: &[FlashcardRecord]) -> Result<()>;
}
