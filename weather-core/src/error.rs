//! User-facing error taxonomy for a search attempt.

use thiserror::Error;

/// Title used for every alert raised by a failed search.
pub const ALERT_TITLE: &str = "Error";

/// Why a search attempt failed.
///
/// `Display` yields the message shown to the user. The fetch cause is kept as
/// the error source for logging only.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a city name")]
    Validation,

    #[error("City not found or error fetching weather data")]
    Fetch {
        #[source]
        cause: anyhow::Error,
    },
}

impl SearchError {
    pub fn fetch(cause: anyhow::Error) -> Self {
        Self::Fetch { cause }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation)
    }
}
