use std::collections::HashMap;

use quota_watch_monitoring::{PointData, TimeSeriesData, TimeSeriesDescriptor};

use super::error::ScanError;

/// Name-to-position lookup over a query response descriptor. Label fields
/// and point value fields share one namespace; label positions index into
/// a row's label values, point positions into a point's value vector.
#[derive(Debug, Clone)]
pub struct FieldIndex {
    positions: HashMap<String, usize>,
}

impl FieldIndex {
    pub fn from_descriptor(descriptor: &TimeSeriesDescriptor) -> Self {
        let mut positions = HashMap::new();
        for (position, label) in descriptor.label_descriptors.iter().enumerate() {
            positions.insert(label.key.clone(), position);
        }
        for (position, point) in descriptor.point_descriptors.iter().enumerate() {
            positions.insert(point.key.clone(), position);
        }
        Self { positions }
    }

    pub fn position(&self, key: &str) -> Result<usize, ScanError> {
        self.positions
            .get(key)
            .copied()
            .ok_or_else(|| ScanError::MissingField(key.to_string()))
    }

    pub fn label(&self, row: &TimeSeriesData, key: &str) -> Result<String, ScanError> {
        let position = self.position(key)?;
        let value = row
            .label_values
            .get(position)
            .ok_or_else(|| ScanError::MissingField(key.to_string()))?;
        Ok(value.as_str().to_string())
    }

    pub fn point_value(&self, point: &PointData, key: &str) -> Result<i64, ScanError> {
        let position = self.position(key)?;
        let value = point
            .values
            .get(position)
            .ok_or_else(|| ScanError::MissingField(key.to_string()))?;
        Ok(value.as_i64())
    }
}
