//! Loader error types.
//!
//! Defined so the retry loop can classify failures without string
//! matching: timeouts and transport failures are retried, validation
//! failures and remote-reported errors go straight to fallback, and
//! `DataUnavailable` is the only error surfaced to callers.

use thiserror::Error;

use chemdrill_core::model::PoolType;

/// Errors that can occur while loading a question pool.
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// The remote request exceeded its bounded timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Transport-level failure (DNS, connection reset, non-2xx status).
    #[error("network failure: {0}")]
    Network(String),

    /// The response had an unrecognized or cross-wired shape.
    #[error("invalid response: {0}")]
    Validation(#[from] ValidationFailure),

    /// The remote answered with its error envelope.
    #[error("remote reported an error: {0}")]
    Remote(String),

    /// Every source, including the bundled fallback, is exhausted. The only
    /// variant surfaced to callers; carries what they need for a
    /// user-facing message.
    #[error("no question data available for category '{category}' ({pool_type})")]
    DataUnavailable {
        category: String,
        pool_type: PoolType,
    },
}

/// Why response validation rejected a body.
#[derive(Debug, Clone, Error)]
pub enum ValidationFailure {
    /// The body is an HTML document — symptomatic of a misrouted or
    /// unauthenticated endpoint, never parsed as data.
    #[error("response body is an HTML document")]
    HtmlBody,

    /// The body is not one of the recognized envelopes.
    #[error("unrecognized response envelope")]
    UnrecognizedShape,

    /// The entity array carries a different entity type than requested.
    #[error("requested {expected} but payload holds {found} entities")]
    CrossWired { expected: PoolType, found: String },

    /// A recognized envelope whose contents failed schema validation.
    #[error("payload failed to parse: {0}")]
    Malformed(String),
}

impl LoaderError {
    /// Whether retrying the request could plausibly succeed. Validation
    /// failures and remote-reported errors are excluded: a misconfigured
    /// endpoint does not fix itself between attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoaderError::Timeout(_) | LoaderError::Network(_))
    }
}
