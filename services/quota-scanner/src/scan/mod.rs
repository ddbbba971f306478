pub mod error;
pub mod index;
pub mod queries;
pub mod rate;
pub mod record;
pub mod scanner;
pub mod sink;

pub use error::ScanError;
pub use index::FieldIndex;
pub use queries::Granularity;
pub use record::{QuotaRecord, QuotaType};
pub use scanner::{QuotaScanner, ScanSummary};
pub use sink::RowSink;

// Label keys of the joined quota series.
pub const LABEL_PROJECT_ID: &str = "resource.project_id";
pub const LABEL_REGION: &str = "resource.location";
pub const LABEL_QUOTA_METRIC: &str = "metric.quota_metric";
pub const LABEL_LIMIT_NAME: &str = "metric.limit_name";
pub const LABEL_METHOD: &str = "metric.method";

// Point value columns produced by the query's final `value` projection.
pub const POINT_LIMIT: &str = "limit";
pub const POINT_USAGE: &str = "usage";
pub const POINT_USAGE_MAX: &str = "usage_max";
