//! Clients for the monitoring service: the time-series query API used by
//! the quota scanner, and the alerting-resource APIs (notification
//! channels, alert policies, log-based metrics) used by the configurator.

pub mod alerting;
pub mod error;
pub mod query;
pub mod types;

pub use alerting::{
    Aggregation, AlertCondition, AlertPolicy, AlertingClient, Documentation, LogMetric,
    MetricThreshold, NotificationChannel, Trigger,
};
pub use error::MonitoringError;
pub use query::{QueryClient, TimeSeriesResult};
pub use types::{
    LabelDescriptor, LabelValue, PointData, PointDescriptor, TimeInterval, TimeSeriesData,
    TimeSeriesDescriptor, TypedValue,
};
