//! Recommended-jobs board on the jobs home page.

use crate::error::{Result, ScanError};
use crate::navigator::PageNavigator;
use crate::pacing::Pacer;
use jobtrawl_browser::BrowserActions;
use jobtrawl_core::Record;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fixed sections of the board, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Recommended,
    StillHiring,
    MoreJobs,
}

impl BucketKind {
    pub const ALL: [Self; 3] = [Self::Recommended, Self::StillHiring, Self::MoreJobs];

    /// Bucket for the `index`-th board area. Area 1 is a promotional strip and is skipped.
    #[must_use]
    pub fn for_area(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Recommended),
            2 => Some(Self::StillHiring),
            3 => Some(Self::MoreJobs),
            _ => None,
        }
    }
}

/// Records per board section. Every kind is present, possibly empty.
pub type RecommendedJobs = BTreeMap<BucketKind, Vec<Record>>;

pub(crate) async fn scrape_board<D: BrowserActions, P: Pacer>(
    navigator: &PageNavigator<'_, D, P>,
    home_url: &str,
    board_root: &[String],
    board_area: &[String],
    board_item: &[String],
) -> Result<RecommendedJobs> {
    navigator.navigate(home_url, 0).await?;
    navigator.scroll_to_load(0).await?;

    let root = navigator
        .wait_for_any(board_root)
        .await
        .map_err(|source| match source {
            e if e.is_session_lost() => ScanError::from_browser(0, e),
            source => ScanError::ContainerMissing {
                what: "recommendation board",
                source,
            },
        })?;

    let mut buckets: RecommendedJobs = BucketKind::ALL.into_iter().map(|k| (k, Vec::new())).collect();
    let areas = navigator.children(0, &root, board_area).await?;
    tracing::debug!("Board has {} areas", areas.len());

    for (index, area) in areas.iter().enumerate() {
        let Some(kind) = BucketKind::for_area(index) else {
            continue;
        };
        let items = navigator.children(0, area, board_item).await?;
        let records = navigator.extract_items(0, &items).await?;
        tracing::info!("Board bucket {:?}: {} records", kind, records.len());
        buckets.insert(kind, records);
    }

    Ok(buckets)
}
