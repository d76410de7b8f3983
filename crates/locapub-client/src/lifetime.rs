use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Liveness of a mounted controller.
///
/// Work started by a controller runs through [`Lifetime::guard`]; once the
/// controller is unmounted the pending future is dropped and its result is
/// never applied.
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    token: CancellationToken,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end(&self) {
        self.token.cancel();
    }

    pub fn is_alive(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Run `fut` unless the lifetime ends first, in which case `None`.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
