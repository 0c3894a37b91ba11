use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

pub const LAMBDA_NAMESPACE: &'static str = "AWS/Lambda";
pub const FUNCTION_NAME_DIMENSION: &'static str = "FunctionName";
pub const DEFAULT_PERIOD_SECONDS: i64 = 60;
pub const DEFAULT_STATISTIC: &'static str = "Sum";
pub const SCAN_BY_TIMESTAMP_DESCENDING: &'static str = "TimestampDescending";

/// (query id, metric name) pairs requested for every function.
pub const LAMBDA_METRICS: [(&'static str, &'static str); 4] = [
    ("cdbdata_invocations", "Invocations"),
    ("cdbdata_errors", "Errors"),
    ("cdbdata_throttles", "Throttles"),
    ("cdbdata_concurrentexec", "ConcurrentExecutions"),
];

/// One field-name to value mapping; key order is the CSV column order.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub id: String,
    pub metric_name: String,
    pub return_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub function_name: String,
    pub namespace: String,
    pub period: i64,
    pub statistic: String,
    pub scan_by: String,
    pub queries: Vec<MetricQuery>,
}

impl QuerySpec {
    pub fn for_function(function_name: &str) -> Self {
        QuerySpec {
            function_name: function_name.to_string(),
            namespace: LAMBDA_NAMESPACE.to_string(),
            period: DEFAULT_PERIOD_SECONDS,
            statistic: DEFAULT_STATISTIC.to_string(),
            scan_by: SCAN_BY_TIMESTAMP_DESCENDING.to_string(),
            queries: LAMBDA_METRICS
                .iter()
                .map(|(id, metric_name)| MetricQuery {
                    id: id.to_string(),
                    metric_name: metric_name.to_string(),
                    return_data: true,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricMessage {
    pub code: Option<String>,
    pub value: Option<String>,
}

/// Samples of one sub-query as returned by the backend, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricSeries {
    pub id: Option<String>,
    pub label: Option<String>,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
    pub status_code: Option<String>,
    pub messages: Vec<MetricMessage>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Datapoint<'a> {
    id: &'a Option<String>,
    label: &'a Option<String>,
    timestamp: &'a str,
    value: f64,
    status_code: &'a Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// One row per metric with all of its timestamps and values
    Series,
    /// One row per metric sample
    Datapoints,
}

impl Layout {
    pub fn flatten(self, series: &[MetricSeries]) -> Result<Vec<Record>, serde_json::Error> {
        match self {
            Layout::Series => series.iter().map(to_record).collect(),
            Layout::Datapoints => series
                .iter()
                .flat_map(|metric| {
                    if metric.timestamps.len() != metric.values.len() {
                        warn!(
                            id = ?metric.id,
                            timestamps = metric.timestamps.len(),
                            values = metric.values.len(),
                            "timestamps and values differ in length, unpaired samples are skipped"
                        );
                    }
                    metric
                        .timestamps
                        .iter()
                        .zip(metric.values.iter())
                        .map(move |(timestamp, value)| Datapoint {
                            id: &metric.id,
                            label: &metric.label,
                            timestamp,
                            value: *value,
                            status_code: &metric.status_code,
                        })
                })
                .map(|datapoint| to_record(&datapoint))
                .collect(),
        }
    }
}

fn to_record<T: Serialize>(row: &T) -> Result<Record, serde_json::Error> {
    match serde_json::to_value(row)? {
        Value::Object(record) => Ok(record),
        other => Err(serde::ser::Error::custom(format!(
            "expected a record, got {}",
            other
        ))),
    }
}
