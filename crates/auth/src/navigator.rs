/// Client-side route changes triggered by session operations.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Discards navigation requests (headless use).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "navigation ignored");
    }
}
