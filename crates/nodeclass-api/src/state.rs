//! State shared by every handler.

use std::sync::Arc;

use nodeclass_core::{Classifier, EncResult, ErrorKind};
use nodeclass_data::CollectionKind;
use nodeclass_telemetry::{Metrics, WriteOutcome};

pub(crate) struct ApiState {
    pub(crate) classifier: Arc<Classifier>,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) const fn new(classifier: Arc<Classifier>, telemetry: Metrics) -> Self {
        Self {
            classifier,
            telemetry,
        }
    }

    /// Count the outcome of a write against `collection`. Rejections that
    /// never reached storage are not writes and are not counted.
    pub(crate) fn record_write<T>(&self, collection: CollectionKind, result: &EncResult<T>) {
        let outcome = match result {
            Ok(_) => WriteOutcome::Committed,
            Err(err) if err.kind() == ErrorKind::Internal => WriteOutcome::Failed,
            Err(_) => return,
        };
        self.telemetry
            .inc_collection_write(collection.as_str(), outcome);
    }
}
