//! Resolution error types.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Message carried by [`RedirectError::PoolNotFound`].
pub const POOL_NOT_FOUND_MESSAGE: &str = "Pool not found";

/// Message carried by [`RedirectError::NoDomainsAvailable`].
pub const NO_DOMAINS_MESSAGE: &str = "No domains available for redirection";

/// Result type for resolution operations.
pub type RedirectResult<T> = std::result::Result<T, RedirectError>;

/// Resolution error.
///
/// Both variants are soft failures: the HTTP layer renders them as a
/// not-found response carrying the display message as detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RedirectError {
    /// The requested pool identifier is not configured.
    #[error("Pool not found")]
    PoolNotFound,

    /// The applicable candidate list is empty or carries no positive weight.
    #[error("No domains available for redirection")]
    NoDomainsAvailable,
}

impl RedirectError {
    /// Stable label used in metrics and operational logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PoolNotFound => "pool_not_found",
            Self::NoDomainsAvailable => "no_domains_available",
        }
    }

    /// Human-readable message, identical to the `Display` output.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::PoolNotFound => POOL_NOT_FOUND_MESSAGE,
            Self::NoDomainsAvailable => NO_DOMAINS_MESSAGE,
        }
    }

    /// Inverse of [`RedirectError::message`].
    #[must_use]
    pub fn from_message(message: &str) -> Option<Self> {
        match message {
            POOL_NOT_FOUND_MESSAGE => Some(Self::PoolNotFound),
            NO_DOMAINS_MESSAGE => Some(Self::NoDomainsAvailable),
            _ => None,
        }
    }

    /// Get HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        404
    }
}

/// Serialized as its display message.
impl Serialize for RedirectError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

impl<'de> Deserialize<'de> for RedirectError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let message = String::deserialize(deserializer)?;
        Self::from_message(&message)
            .ok_or_else(|| de::Error::custom(format!("unknown error message {message:?}")))
    }
}
