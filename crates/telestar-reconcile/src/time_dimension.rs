//! Derivation of the `Time_Dimension` table from datetime columns of the
//! other tables.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use telestar_core::{Row, Table, TableStore, Value};
use tracing::{info, warn};

use crate::errors::ReconcileError;
use crate::model::ReconcileIssue;

pub const TIME_DIMENSION_TABLE: &str = "Time_Dimension";

pub const TIME_DIMENSION_COLUMNS: [&str; 18] = [
    "Time_ID",
    "Date",
    "DateTime",
    "Year",
    "Month",
    "Day",
    "Hour",
    "Minute",
    "Second",
    "Quarter",
    "WeekDay",
    "WeekDayNum",
    "WeekOfYear",
    "DayOfYear",
    "IsWeekend",
    "Local_Season",
    "Foreign_Season",
    "TimeOfDay",
];

/// A datetime column paired with the column holding its time key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSource {
    pub table: String,
    pub datetime_column: String,
    pub foreign_key_column: String,
}

impl TimeSource {
    pub fn new(
        table: impl Into<String>,
        datetime_column: impl Into<String>,
        foreign_key_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            datetime_column: datetime_column.into(),
            foreign_key_column: foreign_key_column.into(),
        }
    }
}

/// Datetime sources of the telecom dataset.
pub fn telecom_time_sources() -> Vec<TimeSource> {
    [
        ("Transactions", "Time", "Time_Foreign_ID"),
        ("Accounts", "Creation_Time", "Creation_Time_Foreign_ID"),
        (
            "Subscribers",
            "Subscriber_registration_date",
            "Subscriber_expiry_date_Foreign_ID",
        ),
        ("CallLogs", "Date_Time", "Date_Time_Foreign_ID"),
        ("Messages", "Time", "Time_Foreign_ID"),
        ("ISPTraffic", "Time", "Time_Foreign_ID"),
        ("CryptoLedgers", "Timestamp", "TimeStamp_Foreign_ID"),
        ("SIMInfo", "Activation_Date", "Expiry_Date_Foreign_ID"),
        ("AppInfo", "Date_Time", "Date_Time_Foreign_ID"),
        ("SocialMediaLogs", "Time", "Time_Foreign_ID"),
        ("Agents", "Creation_Date", "Creation_Time_Foreign_ID"),
        ("AuditLogs", "Action_Date", "Creation_Time_Foreign_ID"),
        ("SupportLogs", "Date_Issued", "Foreign_Resolved_Date_ID"),
    ]
    .into_iter()
    .map(|(table, datetime, key)| TimeSource::new(table, datetime, key))
    .collect()
}

#[derive(Debug, Clone)]
pub struct TimeDimension {
    pub table: Table,
    pub issues: Vec<ReconcileIssue>,
}

/// Build the time dimension from `sources`.
///
/// Rows whose datetime does not parse or whose key is null are dropped.
/// Duplicate `(datetime, key)` pairs collapse to one row; rows are ordered
/// by datetime, ties keeping source order.
pub fn build_time_dimension(
    store: &TableStore,
    sources: &[TimeSource],
) -> Result<TimeDimension, ReconcileError> {
    let mut issues = Vec::new();
    let mut seen: HashSet<(NaiveDateTime, String)> = HashSet::new();
    let mut pairs: Vec<(NaiveDateTime, Value)> = Vec::new();

    for source in sources {
        let Some(table) = store.get(&source.table) else {
            warn!(event = "time_source_missing", table = %source.table);
            issues.push(
                ReconcileIssue::warning(
                    "missing_table",
                    format!("time source table '{}' is not loaded", source.table),
                )
                .with_table(source.table.clone()),
            );
            continue;
        };

        let columns = (
            table.column_index(&source.datetime_column),
            table.column_index(&source.foreign_key_column),
        );
        let (Some(datetime_column), Some(key_column)) = columns else {
            for (column, idx) in [
                (&source.datetime_column, columns.0),
                (&source.foreign_key_column, columns.1),
            ] {
                if idx.is_none() {
                    warn!(event = "time_source_missing", table = %source.table, column = %column);
                    issues.push(
                        ReconcileIssue::warning(
                            "missing_column",
                            format!(
                                "time source column '{}.{}' is not present",
                                source.table, column
                            ),
                        )
                        .with_table(source.table.clone())
                        .with_column(column.clone()),
                    );
                }
            }
            continue;
        };

        let mut unparsed = 0_u64;
        for row in table.rows() {
            let key = &row[key_column];
            if key.is_null() {
                continue;
            }
            let Some(datetime) = row[datetime_column].as_datetime() else {
                if !row[datetime_column].is_null() {
                    unparsed += 1;
                }
                continue;
            };
            if seen.insert((datetime, key.key())) {
                pairs.push((datetime, key.clone()));
            }
        }

        if unparsed > 0 {
            warn!(event = "time_source_unparsed", table = %source.table, rows = unparsed);
            issues.push(
                ReconcileIssue::warning(
                    "unparsed_datetime",
                    format!(
                        "{unparsed} value(s) of {}.{} are not datetimes",
                        source.table, source.datetime_column
                    ),
                )
                .with_table(source.table.clone())
                .with_column(source.datetime_column.clone()),
            );
        }
    }

    pairs.sort_by_key(|(datetime, _)| *datetime);
    let rows: Vec<Row> = pairs
        .into_iter()
        .map(|(datetime, key)| time_row(datetime, key))
        .collect();

    info!(event = "time_dimension_built", rows = rows.len(), sources = sources.len());

    let table = Table::from_rows(TIME_DIMENSION_TABLE, TIME_DIMENSION_COLUMNS, rows)?;
    Ok(TimeDimension { table, issues })
}

fn time_row(datetime: NaiveDateTime, key: Value) -> Row {
    let date = datetime.date();
    let month = date.month();
    let hour = datetime.hour();
    let weekday = date.weekday();

    vec![
        key,
        Value::Date(date),
        Value::Timestamp(datetime),
        Value::Int(i64::from(date.year())),
        Value::Int(i64::from(month)),
        Value::Int(i64::from(date.day())),
        Value::Int(i64::from(hour)),
        Value::Int(i64::from(datetime.minute())),
        Value::Int(i64::from(datetime.second())),
        Value::Int(i64::from((month - 1) / 3 + 1)),
        Value::from(weekday_name(weekday)),
        Value::Int(i64::from(weekday.num_days_from_monday())),
        Value::Int(i64::from(date.iso_week().week())),
        Value::Int(i64::from(date.ordinal())),
        Value::Bool(matches!(weekday, Weekday::Sat | Weekday::Sun)),
        Value::from(local_season(month)),
        Value::from(foreign_season(month)),
        Value::from(time_of_day(hour)),
    ]
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn local_season(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 | 6 | 7 | 8 => "Dry",
        _ => "Rainy",
    }
}

pub fn foreign_season(month: u32) -> &'static str {
    match month {
        6..=9 => "Summer",
        10..=12 => "Winter",
        1 | 2 => "Spring",
        _ => "Autumn",
    }
}

pub fn time_of_day(hour: u32) -> &'static str {
    match hour {
        0..=5 => "Night",
        6..=11 => "Morning",
        12..=16 => "Afternoon",
        17..=19 => "Evening",
        _ => "Night",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_follow_month_tables() {
        let local: Vec<&str> = (1..=12).map(local_season).collect();
        assert_eq!(
            local,
            vec![
                "Dry", "Dry", "Rainy", "Rainy", "Rainy", "Dry", "Dry", "Dry", "Rainy", "Rainy",
                "Rainy", "Dry"
            ]
        );
        assert_eq!(foreign_season(3), "Autumn");
        assert_eq!(foreign_season(5), "Autumn");
        assert_eq!(foreign_season(9), "Summer");
        assert_eq!(foreign_season(10), "Winter");
        assert_eq!(foreign_season(2), "Spring");
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(time_of_day(0), "Night");
        assert_eq!(time_of_day(5), "Night");
        assert_eq!(time_of_day(6), "Morning");
        assert_eq!(time_of_day(12), "Afternoon");
        assert_eq!(time_of_day(17), "Evening");
        assert_eq!(time_of_day(20), "Night");
        assert_eq!(time_of_day(23), "Night");
    }

    #[test]
    fn telecom_sources_cover_thirteen_tables() {
        let sources = telecom_time_sources();
        assert_eq!(sources.len(), 13);
        assert!(sources.iter().any(|source| source.table == "SIMInfo"));
    }
}
