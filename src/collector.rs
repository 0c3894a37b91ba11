use tracing::{info, warn};

use crate::cloud_watch_metrics_client::MetricsBackend;
use crate::error::CollectorError;
use crate::metric::{Layout, QuerySpec, Record};
use crate::time_range::TimeRange;

/// Collects the Lambda metrics of one function over one window.
///
/// `fetch` consumes the collector; build a new one for another window.
pub struct MetricsCollector<B> {
    backend: B,
    spec: QuerySpec,
    time_range: TimeRange,
    layout: Layout,
}

impl<B: MetricsBackend> MetricsCollector<B> {
    pub fn new(
        backend: B,
        function_name: &str,
        time_range: TimeRange,
        layout: Layout,
    ) -> Result<Self, CollectorError> {
        if function_name.trim().is_empty() {
            return Err(CollectorError::EmptyFunctionName);
        }
        Ok(MetricsCollector {
            backend,
            spec: QuerySpec::for_function(function_name),
            time_range,
            layout,
        })
    }

    pub async fn fetch(self) -> Result<Vec<Record>, CollectorError> {
        info!(
            function = %self.spec.function_name,
            start = %self.time_range.start_param(),
            end = %self.time_range.end_param(),
            "fetching datapoints"
        );
        let series = self
            .backend
            .query_metrics(&self.spec, &self.time_range)
            .await?;
        for metric in series.iter() {
            if metric.status_code.as_deref() != Some("Complete") {
                warn!(
                    id = ?metric.id,
                    status = ?metric.status_code,
                    "metric data is incomplete"
                );
            }
        }
        self.layout
            .flatten(&series)
            .map_err(|error| CollectorError::BackendRequest(error.to_string()))
    }
}
