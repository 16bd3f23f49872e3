//! # Invocation context passed to every tick function.
//!
//! [`TickContext`] bundles a [`CancellationToken`] with the 0-based attempt index set
//! by [`with_retry`](crate::decorators::with_retry). Decorators derive new contexts
//! explicitly instead of relying on ambient state.

use tokio_util::sync::CancellationToken;

/// Cancellable context of one tick function invocation.
#[derive(Clone, Debug, Default)]
pub struct TickContext {
    token: CancellationToken,
    attempt: u32,
}

impl TickContext {
    /// Creates a context bound to `token`, at attempt 0.
    pub fn new(token: CancellationToken) -> Self {
        Self { token, attempt: 0 }
    }

    /// Returns the cancellation token of this invocation.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns `true` once the invocation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the invocation is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// 0-based retry attempt of this invocation (0 outside of retry).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Same cancellation, different attempt index.
    pub fn with_attempt(&self, attempt: u32) -> Self {
        Self {
            token: self.token.clone(),
            attempt,
        }
    }

    /// Derives a context whose cancellation does not propagate to the parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            attempt: self.attempt,
        }
    }
}
