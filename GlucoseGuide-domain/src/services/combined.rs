use std::sync::Arc;

use tracing::{debug, instrument};

use crate::entities::{Bgl, CombinedReading, Hba1c};
use crate::services::date_range::DateRange;
use crate::services::measurement::{MeasurementServiceError, MeasurementServiceTrait};
use crate::services::merge::merge_feeds;

/// Serves the merged BGL/HbA1c feed of a user
#[derive(Clone)]
pub struct CombinedFeedService {
    bgl: Arc<dyn MeasurementServiceTrait<Bgl>>,
    hba1c: Arc<dyn MeasurementServiceTrait<Hba1c>>,
}

impl CombinedFeedService {
    pub fn new(
        bgl: Arc<dyn MeasurementServiceTrait<Bgl>>,
        hba1c: Arc<dyn MeasurementServiceTrait<Hba1c>>,
    ) -> Self {
        Self { bgl, hba1c }
    }

    /// Both feeds of `user_id` between two `YYYYMMDD` days, merged chronologically
    #[instrument(skip(self))]
    pub async fn combined_feed(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<CombinedReading>, MeasurementServiceError> {
        let range = DateRange::parse(from, to)?;

        let (bgl, hba1c) = futures::try_join!(
            self.bgl.find_in_range(user_id, &range),
            self.hba1c.find_in_range(user_id, &range)
        )?;
        debug!("Merging {} BGL and {} HbA1c readings", bgl.len(), hba1c.len());

        Ok(merge_feeds(&bgl, &hba1c))
    }
}
