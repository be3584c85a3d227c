//! Pacing capability consumed by both source clients.

use async_trait::async_trait;

/// A pacing dependency: callers await their turn before each outbound
/// request. The shared rate limiter implements this; the places client falls
/// back to a private minimal implementation when nothing is injected.
#[async_trait]
pub trait RequestPacer: Send + Sync {
    /// Resolves when the caller may issue its next request.
    async fn await_turn(&self);
}
