use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Schema of a query response: ordered label fields and ordered point
/// value fields, each addressed by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesDescriptor {
    #[serde(default)]
    pub label_descriptors: Vec<LabelDescriptor>,
    #[serde(default)]
    pub point_descriptors: Vec<PointDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDescriptor {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDescriptor {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// One series row: label values positionally matching the label
/// descriptors, and one or more points whose value vectors positionally
/// match the point descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesData {
    #[serde(default)]
    pub label_values: Vec<LabelValue>,
    #[serde(default)]
    pub point_data: Vec<PointData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(
        default,
        deserialize_with = "int64_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub int64_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
}

impl LabelValue {
    pub fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        self.string_value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointData {
    #[serde(default)]
    pub values: Vec<TypedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<TimeInterval>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// One value cell. The upstream API encodes 64-bit integers as JSON
/// strings, so the int64 field accepts either representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(
        default,
        deserialize_with = "int64_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub int64_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
}

impl TypedValue {
    pub fn int64(value: i64) -> Self {
        Self {
            int64_value: Some(value),
            ..Self::default()
        }
    }

    pub fn as_i64(&self) -> i64 {
        if let Some(value) = self.int64_value {
            return value;
        }
        if let Some(value) = self.double_value {
            return value as i64;
        }
        0
    }
}

fn int64_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64Repr {
        Number(i64),
        Text(String),
    }

    match Option::<Int64Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Int64Repr::Number(value)) => Ok(Some(value)),
        Some(Int64Repr::Text(text)) => text
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
