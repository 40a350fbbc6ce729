//! Ordered fallback strategies for a single record field.

use crate::error::ExtractionFailure;
use futures::future::BoxFuture;
use jobtrawl_core::Field;
use std::future::Future;

type Strategy<'a> = BoxFuture<'a, Result<String, ExtractionFailure>>;

/// An ordered list of lazily evaluated strategies for one field.
///
/// Strategies are only polled when every earlier one failed or produced
/// blank text. Values are trimmed; the first non-empty one wins.
pub struct FallbackChain<'a> {
    field: &'static str,
    strategies: Vec<Strategy<'a>>,
}

impl<'a> FallbackChain<'a> {
    #[must_use]
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the end of the chain.
    #[must_use]
    pub fn then<F>(mut self, strategy: F) -> Self
    where
        F: Future<Output = Result<String, ExtractionFailure>> + Send + 'a,
    {
        self.strategies.push(Box::pin(strategy));
        self
    }

    /// Run strategies in order until one yields a value.
    pub async fn resolve(self) -> Field<String> {
        for (position, strategy) in self.strategies.into_iter().enumerate() {
            match strategy.await {
                Ok(raw) => {
                    let value = raw.trim();
                    if !value.is_empty() {
                        return Field::Value(value.to_string());
                    }
                    tracing::debug!("{} strategy {} produced blank text", self.field, position);
                }
                Err(e) => {
                    tracing::debug!("{} strategy {} failed: {}", self.field, position, e);
                }
            }
        }

        Field::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_first_value_wins() {
        let field = FallbackChain::new("title")
            .then(async { Ok("  Data Engineer \n".to_string()) })
            .then(async { Ok("Other".to_string()) })
            .resolve()
            .await;
        assert_eq!(field, Field::Value("Data Engineer".to_string()));
    }

    #[tokio::test]
    async fn test_blank_and_failed_strategies_are_skipped() {
        let field = FallbackChain::new("location")
            .then(async { Err(ExtractionFailure::Missing(".card".to_string())) })
            .then(async { Ok("   ".to_string()) })
            .then(async { Ok("Warsaw, Poland".to_string()) })
            .resolve()
            .await;
        assert_eq!(field, Field::Value("Warsaw, Poland".to_string()));
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unknown() {
        let field = FallbackChain::new("posted_at")
            .then(async { Err(ExtractionFailure::NoMatch("posted")) })
            .then(async {
                Err(ExtractionFailure::MissingFragment {
                    selector: ".d-primary".to_string(),
                    index: 2,
                })
            })
            .resolve()
            .await;
        assert_eq!(field, Field::Unknown);

        assert_eq!(FallbackChain::new("empty").resolve().await, Field::Unknown);
    }

    #[tokio::test]
    async fn test_later_strategies_are_not_run() {
        let touched = AtomicBool::new(false);
        let field = FallbackChain::new("organization")
            .then(async { Ok("Acme".to_string()) })
            .then(async {
                touched.store(true, Ordering::SeqCst);
                Ok("Unreachable".to_string())
            })
            .resolve()
            .await;

        assert_eq!(field, Field::Value("Acme".to_string()));
        assert!(!touched.load(Ordering::SeqCst));
    }
}
