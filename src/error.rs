//! Engine error taxonomy

/// Errors surfaced by the engine's public API
///
/// Malformed catalog entries are deliberately *not* represented here: a bad
/// stored condition skips that one achievement (fails closed) and is reported
/// as a [`crate::engine::CatalogWarning`] on the result instead of aborting
/// the event.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Rejected before any state mutation. The caller can correct the
    /// payload and resend.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Progression store failure unrelated to the expected grant race.
    /// Fatal for this event; the caller retries the whole event, which the
    /// idempotent grant design makes safe.
    #[error("progression store failure: {0}")]
    Store(#[from] anyhow::Error),
}
