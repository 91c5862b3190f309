use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::CardPersistence;
use crate::store::schema::FlashcardRecord;

/// Card set kept as a single JSON file.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inkcards")
            .join("flashcards.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, json: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");

        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn config_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
        Error::Config {
            path: self.path.clone(),
            source: source.into(),
        }
    }
}

impl CardPersistence for JsonStore {
    fn load(&self) -> Result<Vec<FlashcardRecord>> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.config_error(e))?;
        serde_json::from_str(&content).map_err(|e| self.config_error(e))
    }

    /// Whole-file overwrite through a temp file and rename, so a failed write
    /// never leaves a partial card set behind.
    fn save(&self, records: &[FlashcardRecord]) -> Result<()> {
        let persist_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::Persist {
            target: self.path.display().to_string(),
            source,
        };
        let json = serde_json::to_string_pretty(records).map_err(|e| persist_error(e.into()))?;
        self.write_atomic(&json).map_err(|e| persist_error(e.into()))
    }
}
