//! In-memory card persistence, a test double for [`JsonStore`](super::JsonStore).
//!
//! Nothing in the shipped binaries uses it. It exists so tests and
//! simulations can run the store without touching disk.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::store::CardPersistence;
use crate::store::schema::FlashcardRecord;

/// Persistence that keeps the serialized set in memory.
///
/// Clones share state, so a test can hand one to the store and inspect the
/// other. Writes go through JSON to exercise the same encoding as disk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    saved: Option<String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: &[FlashcardRecord]) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().saved = serde_json::to_string(records).ok();
        store
    }

    /// Make every subsequent save fail, as a full medium would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn saved_records(&self) -> Option<Vec<FlashcardRecord>> {
        let inner = self.inner.borrow();
        inner
            .saved
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }
}

impl CardPersistence for MemoryStore {
    fn load(&self) -> Result<Vec<FlashcardRecord>> {
        let inner = self.inner.borrow();
        let json = inner.saved.as_deref().ok_or_else(|| Error::Config {
            path: "memory".into(),
            source: "nothing saved yet".into(),
        })?;
        serde_json::from_str(json).map_err(|e| Error::Config {
            path: "memory".into(),
            source: e.into(),
        })
    }

    fn save(&self, records: &[FlashcardRecord]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(Error::Persist {
                target: "memory".to_string(),
                source: io::Error::new(io::ErrorKind::StorageFull, "no space left").into(),
            });
        }
        let json = serde_json::to_string(records).map_err(|e| Error::Persist {
            target: "memory".to_string(),
            source: e.into(),
        })?;
        inner.saved = Some(json);
        inner.writes += 1;
        Ok(())
    }
}
