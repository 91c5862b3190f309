use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Persisted card data is missing or malformed. Loading recovers from
    /// this by starting with an empty card set.
    #[error("card data at {path} is unusable: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A display or input collaborator failed to start or stopped working.
    #[error("{device} unavailable: {reason}")]
    HardwareUnavailable {
        device: &'static str,
        reason: String,
    },

    /// A response code outside Easy/Medium/Hard. Always a programming error.
    #[error("invalid response code {0} (expected 1, 2 or 3)")]
    InvalidResponse(u8),

    /// Writing the card set failed. Not retried here so a full medium is not masked.
    #[error("failed to save cards to {target}: {source}")]
    Persist {
        target: String,
        #[source]
        source: BoxError,
    },

    /// An Anki export could not be read.
    #[error("Anki import failed: {0}")]
    Import(#[source] BoxError),

    #[error("no card at position {0}")]
    UnknownCard(usize),

    #[error("interrupted by operator")]
    Interrupted,
}

impl Error {
    pub fn hardware(device: &'static str, reason: impl ToString) -> Self {
        Error::HardwareUnavailable {
            device,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = Error::hardware("display", "no tty");
        assert_eq!(err.to_string(), "display unavailable: no tty");
        assert!(Error::InvalidResponse(7).to_string().contains('7'));
    }
}
