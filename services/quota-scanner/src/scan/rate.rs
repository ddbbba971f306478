use std::collections::HashMap;

use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Tz;
use quota_watch_monitoring::{TimeSeriesData, TimeSeriesResult};

use super::error::ScanError;
use super::index::FieldIndex;
use super::queries::Granularity;
use super::record::{QuotaRecord, QuotaType};
use super::POINT_USAGE;

/// Per-day rate quotas reset at local midnight in this zone upstream, so
/// the day boundary is anchored here rather than to the caller's clock.
pub const QUOTA_DAY_TZ: Tz = chrono_tz::America::Los_Angeles;

/// Shape one granularity's query result into records. Per-day rows carry
/// an aggregated (current, max) pair; per-second rows are merged by
/// (limit_name, region) because the series repeats across alignment
/// buckets.
pub fn collect_rate_records(
    result: &TimeSeriesResult,
    granularity: Granularity,
    threshold: i64,
    now: DateTime<Utc>,
) -> Result<Vec<QuotaRecord>, ScanError> {
    let index = FieldIndex::from_descriptor(&result.descriptor);
    let timestamp = now.to_rfc3339();

    match granularity {
        Granularity::PerMinute => result
            .data
            .iter()
            .map(|row| {
                QuotaRecord::build(row, &index, QuotaType::Rate, None, threshold, &timestamp)
            })
            .collect(),
        Granularity::PerDay => {
            let boundary = quota_day_end(now);
            result
                .data
                .iter()
                .map(|row| {
                    let pair = day_usage_pair(row, &index, boundary)?;
                    QuotaRecord::build(
                        row,
                        &index,
                        QuotaType::Rate,
                        Some(pair),
                        threshold,
                        &timestamp,
                    )
                })
                .collect()
        }
        Granularity::PerSecond => {
            let mut merged: HashMap<(String, String), QuotaRecord> = HashMap::new();
            for row in &result.data {
                let record =
                    QuotaRecord::build(row, &index, QuotaType::Rate, None, threshold, &timestamp)?;
                // Last write wins on the merge key.
                merged.insert(record.merge_key(), record);
            }
            Ok(merged.into_values().collect())
        }
    }
}

/// Scan a row's points for the day figures: the maximum value across the
/// window, and the value of the bucket whose window ends exactly at the
/// day boundary (zero when no bucket lines up).
fn day_usage_pair(
    row: &TimeSeriesData,
    index: &FieldIndex,
    boundary: DateTime<Utc>,
) -> Result<(i64, i64), ScanError> {
    let mut current = 0i64;
    let mut max_usage = 0i64;

    for point in &row.point_data {
        let value = index.point_value(point, POINT_USAGE)?;
        max_usage = max_usage.max(value);

        let ends_at_boundary = point
            .time_interval
            .as_ref()
            .and_then(|interval| interval.end_time)
            .map(|end| end == boundary)
            .unwrap_or(false);
        if ends_at_boundary {
            current = value;
        }
    }

    Ok((current, max_usage))
}

/// End of the current quota day: the next local midnight in the fixed
/// quota zone, expressed in UTC.
pub fn quota_day_end(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_date = now.with_timezone(&QUOTA_DAY_TZ).date_naive();
    let midnight = (local_date + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");

    QUOTA_DAY_TZ
        .from_local_datetime(&midnight)
        .earliest()
        .map(|boundary| boundary.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
