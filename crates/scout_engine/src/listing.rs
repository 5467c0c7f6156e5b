use std::sync::Arc;

use scout_core::merge_buckets;
use scout_logging::{scout_info, scout_warn};

use crate::api::JobApi;
use crate::{FetchedListing, OrchestratorError};

/// Fetches every source bucket and flattens it into one sorted listing.
#[derive(Clone)]
pub struct ListingAggregator {
    api: Arc<dyn JobApi>,
}

impl ListingAggregator {
    pub fn new(api: Arc<dyn JobApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> Result<FetchedListing, OrchestratorError> {
        let buckets = self.api.all_jobs().await.map_err(|err| {
            scout_warn!("Job listing fetch failed: {}", err);
            OrchestratorError::Fetch(err)
        })?;
        let jobs = merge_buckets(buckets);
        if jobs.is_empty() {
            scout_info!("Job listing is empty");
            Ok(FetchedListing::Empty)
        } else {
            scout_info!("Fetched {} jobs", jobs.len());
            Ok(FetchedListing::Jobs(jobs))
        }
    }
}
