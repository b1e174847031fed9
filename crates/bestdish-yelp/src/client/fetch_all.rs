//! Concurrent multi-page nearby fetch for `YelpClient`.

use bestdish_core::{Business, Coordinate};
use futures::stream::{self, StreamExt};

use crate::error::YelpError;

use super::YelpClient;

/// Aggregate of one nearby fetch.
#[derive(Debug, Clone, Default)]
pub struct NearbyBatch {
    /// Businesses from every page that succeeded, page order by offset,
    /// server order within a page.
    pub businesses: Vec<Business>,
    pub pages_requested: usize,
    pub pages_failed: usize,
}

impl NearbyBatch {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.pages_failed > 0
    }
}

/// `(offset, limit)` for every page needed to cover `max_results` with pages
/// of `page_size`. The last page is shortened so the total never exceeds
/// the cap.
#[must_use]
pub fn page_plan(page_size: u32, max_results: u32) -> Vec<(u32, u32)> {
    if page_size == 0 {
        return Vec::new();
    }
    (0..max_results)
        .step_by(page_size as usize)
        .map(|offset| (offset, page_size.min(max_results - offset)))
        .collect()
}

impl YelpClient {
    /// Fetches up to `max_results` distance-sorted businesses near `coord`.
    ///
    /// Every page in [`page_plan`] is requested at once and the call returns
    /// only after all of them have finished. Pages that fail (after their own
    /// retries) are logged and left out; the rest are concatenated.
    ///
    /// # Errors
    ///
    /// Returns [`YelpError::AllPagesFailed`] when no page succeeded. A fetch
    /// where at least one page succeeded is `Ok`, even if it holds zero
    /// businesses.
    pub async fn fetch_nearby(&self, coord: Coordinate) -> Result<NearbyBatch, YelpError> {
        let plan = page_plan(self.options.page_size, self.options.max_results);
        let pages_requested = plan.len();
        if pages_requested == 0 {
            return Ok(NearbyBatch::default());
        }

        tracing::debug!(%coord, pages = pages_requested, "fetching nearby businesses");

        let mut outcomes: Vec<(u32, Result<Vec<Business>, YelpError>)> = stream::iter(plan)
            .map(|(offset, limit)| async move {
                (offset, self.fetch_page(coord, limit, offset).await)
            })
            .buffer_unordered(pages_requested)
            .collect()
            .await;
        outcomes.sort_by_key(|(offset, _)| *offset);

        let mut businesses = Vec::new();
        let mut pages_failed = 0usize;
        let mut last_error = None;
        for (offset, outcome) in outcomes {
            match outcome {
                Ok(page) => businesses.extend(page),
                Err(err) => {
                    tracing::warn!(%coord, offset, error = %err, "dropping failed page");
                    pages_failed += 1;
                    last_error = Some(err);
                }
            }
        }

        if pages_failed == pages_requested {
            if let Some(last_error) = last_error {
                return Err(YelpError::AllPagesFailed {
                    pages: pages_requested,
                    last_error: Box::new(last_error),
                });
            }
        }

        if pages_failed > 0 {
            tracing::warn!(
                %coord,
                pages_failed,
                pages_requested,
                kept = businesses.len(),
                "nearby fetch completed with missing pages"
            );
        }

        Ok(NearbyBatch {
            businesses,
            pages_requested,
            pages_failed,
        })
    }
}
