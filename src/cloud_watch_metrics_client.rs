use crate::error::CollectorError;
use crate::metric::{MetricMessage, MetricSeries, QuerySpec, FUNCTION_NAME_DIMENSION};
use crate::time_range::TimeRange;
use async_trait::async_trait;

use rusoto_cloudwatch::{
    CloudWatch, CloudWatchClient, Dimension, GetMetricDataInput, Metric, MetricDataQuery,
    MetricDataResult, MetricStat,
};
use rusoto_core::Region;
use tracing::{debug, warn};

/// Source of metric samples. Implemented by CloudWatch and by fakes in tests.
#[async_trait]
pub trait MetricsBackend {
    async fn query_metrics(
        &self,
        spec: &QuerySpec,
        time_range: &TimeRange,
    ) -> Result<Vec<MetricSeries>, CollectorError>;
}

pub struct CloudWatchMetricsClient {
    client: CloudWatchClient,
}

#[async_trait]
impl MetricsBackend for CloudWatchMetricsClient {
    async fn query_metrics(
        &self,
        spec: &QuerySpec,
        time_range: &TimeRange,
    ) -> Result<Vec<MetricSeries>, CollectorError> {
        let input = build_request(spec, time_range);
        debug!(
            start = %input.start_time,
            end = %input.end_time,
            queries = input.metric_data_queries.len(),
            "requesting metric data"
        );
        let output = self.client.get_metric_data(input).await?;
        if let Some(token) = output.next_token {
            warn!(next_token = %token, "metric data response was truncated, remaining pages are not fetched");
        }
        Ok(output
            .metric_data_results
            .map_or(vec![], |results| results)
            .into_iter()
            .map(to_series)
            .collect())
    }
}

impl CloudWatchMetricsClient {
    /// Client for the region resolved from the environment or profile.
    pub fn new() -> Self {
        Self::new_with_client(CloudWatchClient::new(Region::default()))
    }

    pub fn new_with_client(client: CloudWatchClient) -> Self {
        CloudWatchMetricsClient { client }
    }
}

pub fn build_request(spec: &QuerySpec, time_range: &TimeRange) -> GetMetricDataInput {
    let metric_data_queries = spec
        .queries
        .iter()
        .map(|query| MetricDataQuery {
            id: query.id.clone(),
            metric_stat: Some(MetricStat {
                metric: Metric {
                    namespace: Some(spec.namespace.clone()),
                    metric_name: Some(query.metric_name.clone()),
                    dimensions: Some(vec![Dimension {
                        name: FUNCTION_NAME_DIMENSION.to_string(),
                        value: spec.function_name.clone(),
                    }]),
                },
                period: spec.period,
                stat: spec.statistic.clone(),
                ..Default::default()
            }),
            return_data: Some(query.return_data),
            ..Default::default()
        })
        .collect();

    GetMetricDataInput {
        metric_data_queries,
        start_time: time_range.start_param(),
        end_time: time_range.end_param(),
        scan_by: Some(spec.scan_by.clone()),
        ..Default::default()
    }
}

fn to_series(result: MetricDataResult) -> MetricSeries {
    MetricSeries {
        id: result.id,
        label: result.label,
        timestamps: result.timestamps.map_or(vec![], |timestamps| timestamps),
        values: result.values.map_or(vec![], |values| values),
        status_code: result.status_code,
        messages: result
            .messages
            .map_or(vec![], |messages| messages)
            .into_iter()
            .map(|message| MetricMessage {
                code: message.code,
                value: message.value,
            })
            .collect(),
    }
}
