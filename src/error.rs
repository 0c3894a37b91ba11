use std::io;
use std::path::PathBuf;

use rusoto_cloudwatch::GetMetricDataError;
use rusoto_core::RusotoError;
use thiserror::Error;

pub const EXIT_MISSING_REQUIRED_PARAM: i32 = 100;
pub const EXIT_INVALID_DATE: i32 = 101;

/// A single rule broken by the command line arguments.
#[derive(Debug, PartialEq, Error)]
pub enum Problem {
    #[error("Mandatory parameter (function_name) is missing")]
    MissingRequiredParam,
    #[error("Incorrect date format for {field}: {value:?}, datetime should be in ISO format")]
    InvalidDateFormat { field: &'static str, value: String },
    #[error("Start datetime {start} is after end datetime {end}")]
    InvalidDateRange { start: String, end: String },
}

/// Every problem found while validating arguments. Rules are not short-circuited.
#[derive(Debug, PartialEq, Error)]
#[error("{}", render_problems(.problems))]
pub struct ValidationError {
    pub problems: Vec<Problem>,
}

impl ValidationError {
    pub fn exit_code(&self) -> i32 {
        if self.problems.contains(&Problem::MissingRequiredParam) {
            EXIT_MISSING_REQUIRED_PARAM
        } else {
            EXIT_INVALID_DATE
        }
    }
}

fn render_problems(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(|problem| problem.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectorError {
    #[error("Function name should not be empty")]
    EmptyFunctionName,
    #[error("Metrics backend is unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Metrics request failed: {0}")]
    BackendRequest(String),
}

impl From<RusotoError<GetMetricDataError>> for CollectorError {
    fn from(e: RusotoError<GetMetricDataError>) -> CollectorError {
        match e {
            RusotoError::HttpDispatch(_) | RusotoError::Credentials(_) => {
                CollectorError::BackendUnavailable(e.to_string())
            }
            _ => CollectorError::BackendRequest(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No datapoints to write, report header cannot be derived")]
    EmptyResult,
    #[error("Record {index} has field {field:?} which is not in the report header")]
    InconsistentRecord { index: usize, field: String },
    #[error("Failed to encode report: {0}")]
    Encode(#[from] csv::Error),
    #[error("Failed to write report to {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use crate::error::{CollectorError, Problem, ValidationError};
    use rusoto_cloudwatch::GetMetricDataError;
    use rusoto_core::request::HttpDispatchError;
    use rusoto_core::RusotoError;

    #[test]
    fn test_exit_code_prefers_missing_param() {
        let error = ValidationError {
            problems: vec![
                Problem::InvalidDateFormat {
                    field: "start_datetime",
                    value: "yesterday".to_string(),
                },
                Problem::MissingRequiredParam,
            ],
        };
        assert_eq!(error.exit_code(), 100);
    }

    #[test]
    fn test_exit_code_for_dates() {
        let error = ValidationError {
            problems: vec![Problem::InvalidDateRange {
                start: "2020-03-24T00:00:00Z".to_string(),
                end: "2020-03-22T00:00:00Z".to_string(),
            }],
        };
        assert_eq!(error.exit_code(), 101);
    }

    #[test]
    fn test_display_joins_problems() {
        let error = ValidationError {
            problems: vec![
                Problem::MissingRequiredParam,
                Problem::InvalidDateFormat {
                    field: "end_datetime",
                    value: "x".to_string(),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "Mandatory parameter (function_name) is missing; \
             Incorrect date format for end_datetime: \"x\", datetime should be in ISO format"
        );
    }

    #[test]
    fn test_dispatch_error_is_unavailable() {
        let error: CollectorError =
            RusotoError::<GetMetricDataError>::HttpDispatch(HttpDispatchError::new(
                "connection refused".to_string(),
            ))
            .into();
        assert!(matches!(error, CollectorError::BackendUnavailable(_)));
    }

    #[test]
    fn test_validation_error_is_request_error() {
        let error: CollectorError =
            RusotoError::<GetMetricDataError>::Validation("bad window".to_string()).into();
        assert!(matches!(error, CollectorError::BackendRequest(_)));
    }
}
