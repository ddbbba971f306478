use std::fmt;

use quota_watch_monitoring::TimeSeriesData;

use super::error::ScanError;
use super::index::FieldIndex;
use super::{
    LABEL_LIMIT_NAME, LABEL_METHOD, LABEL_PROJECT_ID, LABEL_QUOTA_METRIC, LABEL_REGION,
    POINT_LIMIT, POINT_USAGE, POINT_USAGE_MAX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaType {
    Allocation,
    Rate,
}

impl QuotaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::Allocation => "ALLOCATION",
            QuotaType::Rate => "RATE",
        }
    }
}

impl fmt::Display for QuotaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of one quota limit for one project and region at scan
/// time. Built per response row, sunk immediately, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaRecord {
    pub project_id: String,
    pub region: String,
    pub metric: String,
    pub limit_name: String,
    pub api_method: Option<String>,
    pub quota_type: QuotaType,
    pub current_usage: i64,
    pub max_usage: i64,
    pub quota_limit: i64,
    pub threshold: i64,
    pub timestamp: String,
}

impl QuotaRecord {
    /// Shape one response row into a record. An override pair replaces the
    /// current/max values read from the point data; per-day scans use it to
    /// carry figures aggregated across the whole window.
    pub fn build(
        row: &TimeSeriesData,
        index: &FieldIndex,
        quota_type: QuotaType,
        usage_override: Option<(i64, i64)>,
        threshold: i64,
        timestamp: &str,
    ) -> Result<Self, ScanError> {
        let point = row.point_data.first().ok_or(ScanError::EmptyRow)?;

        let (current_usage, max_usage) = match usage_override {
            Some(pair) => pair,
            None => (
                index.point_value(point, POINT_USAGE)?,
                index.point_value(point, POINT_USAGE_MAX)?,
            ),
        };
        let quota_limit = index.point_value(point, POINT_LIMIT)?;

        let api_method = match quota_type {
            QuotaType::Rate => {
                let method = index.label(row, LABEL_METHOD)?;
                if method.is_empty() {
                    None
                } else {
                    Some(method)
                }
            }
            QuotaType::Allocation => None,
        };

        Ok(Self {
            project_id: index.label(row, LABEL_PROJECT_ID)?,
            region: index.label(row, LABEL_REGION)?,
            metric: index.label(row, LABEL_QUOTA_METRIC)?,
            limit_name: index.label(row, LABEL_LIMIT_NAME)?,
            api_method,
            quota_type,
            current_usage: current_usage.max(0),
            max_usage: max_usage.max(0),
            quota_limit: quota_limit.max(0),
            threshold,
            timestamp: timestamp.to_string(),
        })
    }

    /// Dedup identity within one per-second merge pass.
    pub fn merge_key(&self) -> (String, String) {
        (self.limit_name.clone(), self.region.clone())
    }
}

#[cfg(test)]
mod tests {
    use quota_watch_monitoring::{
        LabelDescriptor, LabelValue, PointData, PointDescriptor, TimeSeriesDescriptor, TypedValue,
    };

    use super::*;

    fn descriptor(with_method: bool) -> TimeSeriesDescriptor {
        let mut labels = vec![
            "resource.service",
            "resource.project_id",
            "resource.location",
            "metric.quota_metric",
            "metric.limit_name",
        ];
        if with_method {
            labels.push("metric.method");
        }

        TimeSeriesDescriptor {
            label_descriptors: labels
                .into_iter()
                .map(|key| LabelDescriptor {
                    key: key.to_string(),
                })
                .collect(),
            point_descriptors: ["limit", "usage", "usage_max"]
                .into_iter()
                .map(|key| PointDescriptor {
                    key: key.to_string(),
                    value_type: Some("INT64".to_string()),
                })
                .collect(),
        }
    }

    fn row(with_method: Option<&str>, values: [i64; 3]) -> TimeSeriesData {
        let mut labels = vec![
            LabelValue::string("compute"),
            LabelValue::string("some-project"),
            LabelValue::string("us-east1"),
            LabelValue::string("compute.googleapis.com/cpus"),
            LabelValue::string("CPUS-per-project-region"),
        ];
        if let Some(method) = with_method {
            labels.push(LabelValue::string(method));
        }

        TimeSeriesData {
            label_values: labels,
            point_data: vec![PointData {
                values: values.into_iter().map(TypedValue::int64).collect(),
                time_interval: None,
            }],
        }
    }

    #[test]
    fn reads_values_at_resolved_positions() {
        let index = FieldIndex::from_descriptor(&descriptor(false));
        let record = QuotaRecord::build(
            &row(None, [1000, 250, 400]),
            &index,
            QuotaType::Allocation,
            None,
            80,
            "2026-08-05T00:00:00Z",
        )
        .unwrap();

        assert_eq!(record.project_id, "some-project");
        assert_eq!(record.region, "us-east1");
        assert_eq!(record.metric, "compute.googleapis.com/cpus");
        assert_eq!(record.limit_name, "CPUS-per-project-region");
        assert_eq!(record.quota_limit, 1000);
        assert_eq!(record.current_usage, 250);
        assert_eq!(record.max_usage, 400);
        assert_eq!(record.threshold, 80);
        assert_eq!(record.api_method, None);
    }

    #[test]
    fn override_pair_replaces_point_usage() {
        let index = FieldIndex::from_descriptor(&descriptor(true));
        let record = QuotaRecord::build(
            &row(Some(""), [1000, 250, 400]),
            &index,
            QuotaType::Rate,
            Some((7, 99)),
            80,
            "2026-08-05T00:00:00Z",
        )
        .unwrap();

        assert_eq!(record.current_usage, 7);
        assert_eq!(record.max_usage, 99);
        // Limit still comes from the point data.
        assert_eq!(record.quota_limit, 1000);
    }

    #[test]
    fn rate_record_carries_api_method() {
        let index = FieldIndex::from_descriptor(&descriptor(true));
        let record = QuotaRecord::build(
            &row(Some("compute.instances.insert"), [10, 2, 3]),
            &index,
            QuotaType::Rate,
            None,
            80,
            "2026-08-05T00:00:00Z",
        )
        .unwrap();

        assert_eq!(
            record.api_method.as_deref(),
            Some("compute.instances.insert")
        );
    }

    #[test]
    fn empty_method_label_maps_to_none() {
        let index = FieldIndex::from_descriptor(&descriptor(true));
        let record = QuotaRecord::build(
            &row(Some(""), [10, 2, 3]),
            &index,
            QuotaType::Rate,
            None,
            80,
            "2026-08-05T00:00:00Z",
        )
        .unwrap();

        assert_eq!(record.api_method, None);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let index = FieldIndex::from_descriptor(&descriptor(false));
        let record = QuotaRecord::build(
            &row(None, [-1, -5, -2]),
            &index,
            QuotaType::Allocation,
            None,
            80,
            "2026-08-05T00:00:00Z",
        )
        .unwrap();

        assert_eq!(record.quota_limit, 0);
        assert_eq!(record.current_usage, 0);
        assert_eq!(record.max_usage, 0);
    }

    #[test]
    fn row_without_points_is_rejected() {
        let index = FieldIndex::from_descriptor(&descriptor(false));
        let mut empty = row(None, [0, 0, 0]);
        empty.point_data.clear();

        assert!(matches!(
            QuotaRecord::build(
                &empty,
                &index,
                QuotaType::Allocation,
                None,
                80,
                "2026-08-05T00:00:00Z"
            ),
            Err(ScanError::EmptyRow)
        ));
    }
}
