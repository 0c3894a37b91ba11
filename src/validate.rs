use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::error::{Problem, ValidationError};
use crate::metric::Layout;
use crate::report::DEFAULT_REPORT_FILE_NAME;
use crate::time_range::{parse_iso8601, TimeRange};

#[derive(Parser, Debug)]
#[command(about = "CloudWatch datapoints collector for Lambda functions", long_about = None)]
pub struct Args {
    /// [M] Lambda function name
    #[arg(short = 'f', long)]
    pub function_name: Option<String>,

    /// [O] Start datetime in ISO format, before the end datetime (default: 24 hours ago)
    #[arg(short = 's', long)]
    pub start_datetime: Option<String>,

    /// [O] End datetime in ISO format, after the start datetime (default: now)
    #[arg(short = 'e', long)]
    pub end_datetime: Option<String>,

    /// [O] Path of the report file to create
    #[arg(short = 'r', long, default_value = DEFAULT_REPORT_FILE_NAME)]
    pub report_path: PathBuf,

    /// [O] Row layout of the report
    #[arg(short = 'l', long, value_enum, default_value_t = Layout::Series)]
    pub layout: Layout,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub function_name: String,
    pub time_range: TimeRange,
    pub report_path: PathBuf,
    pub layout: Layout,
}

/// Something that can show usage to the user.
pub trait HelpPrinter {
    fn print_help(&mut self);
}

impl HelpPrinter for clap::Command {
    fn print_help(&mut self) {
        eprintln!("{}", self.render_help());
    }
}

/// Checks `args`, filling unset datetimes from `now`.
///
/// All rules run so every problem is reported at once. On failure the problems
/// and the help text go to stderr.
pub fn validate(
    args: &Args,
    now: DateTime<Utc>,
    help: &mut dyn HelpPrinter,
) -> Result<Settings, ValidationError> {
    let mut problems = vec![];
    let default_range = TimeRange::last_day(now);

    let function_name = args
        .function_name
        .as_deref()
        .filter(|name| !name.trim().is_empty());
    if function_name.is_none() {
        problems.push(Problem::MissingRequiredParam);
    }

    let start = parse_datetime("start_datetime", &args.start_datetime, default_range.start);
    let end = parse_datetime("end_datetime", &args.end_datetime, default_range.end);
    let time_range = match (start, end) {
        (Ok(start), Ok(end)) => {
            let time_range = TimeRange::new(start, end);
            if !time_range.is_ordered() {
                problems.push(Problem::InvalidDateRange {
                    start: time_range.start_param(),
                    end: time_range.end_param(),
                });
            }
            Some(time_range)
        }
        (start, end) => {
            problems.extend(start.err());
            problems.extend(end.err());
            None
        }
    };

    match (function_name, time_range) {
        (Some(function_name), Some(time_range)) if problems.is_empty() => Ok(Settings {
            function_name: function_name.to_string(),
            time_range,
            report_path: args.report_path.clone(),
            layout: args.layout,
        }),
        _ => {
            for problem in problems.iter() {
                eprintln!("{}", problem);
            }
            help.print_help();
            Err(ValidationError { problems })
        }
    }
}

fn parse_datetime(
    field: &'static str,
    value: &Option<String>,
    default: DateTime<Utc>,
) -> Result<DateTime<Utc>, Problem> {
    match value {
        None => Ok(default),
        Some(value) => parse_iso8601(value).ok_or_else(|| Problem::InvalidDateFormat {
            field,
            value: value.clone(),
        }),
    }
}
