//! Human-cadence delays between browser actions.
//!
//! Fixed delays are trivially fingerprinted, so every wait is the configured
//! base plus a non-negative random jitter scaled to that base.

use jobtrawl_core::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Which pause the caller is about to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayKind {
    /// After navigation or a scroll stage, to let client-side rendering settle
    PageLoad,
    /// Between batches of item extractions
    BetweenItems,
    /// Between result pages
    BetweenPages,
}

/// Something that can suspend the crawl for a given kind of pause.
///
/// Implementations never fail. Tests substitute an implementation that
/// records calls instead of sleeping.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn delay(&self, kind: DelayKind);
}

/// Jittered sleeps drawn from [`PacingConfig`].
#[derive(Debug, Clone)]
pub struct PacingController {
    page_load: Duration,
    between_items: Duration,
    between_pages: Duration,
    between_pages_jitter: f64,
}

impl PacingController {
    #[must_use]
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            page_load: Duration::from_millis(config.page_load_ms),
            between_items: Duration::from_millis(config.between_items_ms),
            between_pages: Duration::from_millis(config.between_pages_ms),
            between_pages_jitter: sanitize_jitter(config.between_pages_jitter),
        }
    }

    /// Replace the between-pages base, keeping its jitter factor.
    #[must_use]
    pub fn with_between_pages(mut self, base: Duration) -> Self {
        self.between_pages = base;
        self
    }

    /// Base duration and jitter factor for a kind.
    #[must_use]
    pub fn profile(&self, kind: DelayKind) -> (Duration, f64) {
        match kind {
            DelayKind::PageLoad => (self.page_load, 1.0),
            DelayKind::BetweenItems => (self.between_items, 1.0),
            DelayKind::BetweenPages => (self.between_pages, self.between_pages_jitter),
        }
    }

    /// Draw one delay: `base + U(0, base * jitter)`.
    #[must_use]
    pub fn duration_for(&self, kind: DelayKind) -> Duration {
        let (base, jitter) = self.profile(kind);
        let Ok(spread) = Duration::try_from_secs_f64(base.as_secs_f64() * jitter) else {
            return base;
        };
        if spread.is_zero() || base.checked_add(spread).is_none() {
            return base;
        }

        let extra = rand::thread_rng().gen_range(Duration::ZERO..=spread);
        base + extra
    }
}

fn sanitize_jitter(jitter: f64) -> f64 {
    if jitter.is_finite() {
        jitter.max(0.0)
    } else {
        0.0
    }
}

impl Default for PacingController {
    fn default() -> Self {
        Self::new(&PacingConfig::default())
    }
}

#[async_trait::async_trait]
impl Pacer for PacingController {
    async fn delay(&self, kind: DelayKind) {
        let duration = self.duration_for(kind);
        tracing::trace!("Pacing {:?} for {:?}", kind, duration);
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PacingController {
        PacingController::new(&PacingConfig {
            page_load_ms: 100,
            between_items_ms: 200,
            between_pages_ms: 1000,
            between_pages_jitter: 2.0,
        })
    }

    #[test]
    fn test_delay_stays_within_jitter_bounds() {
        let pacer = controller();
        for _ in 0..200 {
            let d = pacer.duration_for(DelayKind::PageLoad);
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(200));

            let d = pacer.duration_for(DelayKind::BetweenItems);
            assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(400));

            let d = pacer.duration_for(DelayKind::BetweenPages);
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_between_pages_is_more_heavily_jittered() {
        let pacer = controller();
        let (page_base, page_jitter) = pacer.profile(DelayKind::BetweenPages);
        let (item_base, item_jitter) = pacer.profile(DelayKind::BetweenItems);
        assert!(page_base > item_base);
        assert!(page_jitter > item_jitter);
    }

    #[test]
    fn test_zero_base_never_sleeps() {
        let pacer = PacingController::new(&PacingConfig {
            page_load_ms: 0,
            between_items_ms: 0,
            between_pages_ms: 0,
            between_pages_jitter: 2.0,
        });
        assert_eq!(pacer.duration_for(DelayKind::BetweenPages), Duration::ZERO);
    }

    #[test]
    fn test_negative_jitter_is_clamped() {
        let pacer = PacingController::new(&PacingConfig {
            between_pages_jitter: -1.0,
            ..PacingConfig::default()
        });
        let (base, jitter) = pacer.profile(DelayKind::BetweenPages);
        assert_eq!(jitter, 0.0);
        assert_eq!(pacer.duration_for(DelayKind::BetweenPages), base);
    }

    #[test]
    fn test_non_finite_jitter_never_panics() {
        for jitter in [f64::INFINITY, f64::NAN, f64::NEG_INFINITY] {
            let pacer = PacingController::new(&PacingConfig {
                between_pages_jitter: jitter,
                ..PacingConfig::default()
            });
            let (base, clamped) = pacer.profile(DelayKind::BetweenPages);
            assert_eq!(clamped, 0.0);
            assert_eq!(pacer.duration_for(DelayKind::BetweenPages), base);
        }
    }

    #[test]
    fn test_oversized_spread_falls_back_to_base() {
        let pacer = PacingController::new(&PacingConfig {
            between_pages_ms: u64::MAX,
            between_pages_jitter: 1e300,
            ..PacingConfig::default()
        });
        assert_eq!(
            pacer.duration_for(DelayKind::BetweenPages),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn test_between_pages_override() {
        let pacer = controller().with_between_pages(Duration::from_secs(5));
        let d = pacer.duration_for(DelayKind::BetweenPages);
        assert!(d >= Duration::from_secs(5) && d <= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_zero_delay_completes() {
        let pacer = PacingController::new(&PacingConfig {
            page_load_ms: 0,
            ..PacingConfig::default()
        });
        pacer.delay(DelayKind::PageLoad).await;
    }
}
