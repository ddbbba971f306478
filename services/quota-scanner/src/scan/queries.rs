//! Query expressions sent to the time-series API. Allocation quotas are
//! covered by a single query; rate quotas need one query per reporting
//! granularity because the upstream system exposes no single granularity
//! that is accurate for burst, sustained and daily-cap limits at once.

/// Limit-name patterns that route a rate limit to a non-default granularity.
pub const DAY_LIMIT_PATTERN: &str = ".*PerDay.*";
pub const SECONDS_LIMIT_PATTERN: &str = ".*Per100Seconds.*";
pub const EGRESS_LIMIT_PATTERN: &str = ".*EgressBandwidth.*";

const ALLOCATION_QUERY: &str = "\
fetch consumer_quota
| filter resource.service =~ '.*'
| { usage:
      metric 'serviceruntime.googleapis.com/quota/allocation/usage'
      | filter resource.project_id = '{project}'
      | align next_older(1d)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric],
          [usage: aggregate(value.usage), usage_max: max(value.usage)]
  ; limit:
      metric 'serviceruntime.googleapis.com/quota/limit'
      | filter resource.project_id = '{project}'
      | align next_older(1d)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.limit_name],
          [limit: aggregate(value.limit)] }
| join
| value [limit: limit.limit, usage: usage.usage, usage_max: usage.usage_max]";

const RATE_PER_MINUTE_QUERY: &str = "\
fetch consumer_quota
| filter resource.service =~ '.*'
| { usage:
      metric 'serviceruntime.googleapis.com/quota/rate/net_usage'
      | filter resource.project_id = '{project}'
      | align next_older(1m)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.method],
          [usage: aggregate(value.net_usage), usage_max: max(value.net_usage)]
  ; limit:
      metric 'serviceruntime.googleapis.com/quota/limit'
      | filter resource.project_id = '{project}'
      | filter not (metric.limit_name =~ '{day}|{seconds}|{egress}')
      | align next_older(1m)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.limit_name],
          [limit: aggregate(value.limit)] }
| join
| value [limit: limit.limit, usage: usage.usage, usage_max: usage.usage_max]";

const RATE_PER_DAY_QUERY: &str = "\
fetch consumer_quota
| filter resource.service =~ '.*'
| { usage:
      metric 'serviceruntime.googleapis.com/quota/rate/net_usage'
      | filter resource.project_id = '{project}'
      | align next_older(1d)
      | within 7d
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.method],
          [usage: aggregate(value.net_usage), usage_max: max(value.net_usage)]
  ; limit:
      metric 'serviceruntime.googleapis.com/quota/limit'
      | filter resource.project_id = '{project}'
      | filter metric.limit_name =~ '{day}'
      | align next_older(1d)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.limit_name],
          [limit: aggregate(value.limit)] }
| join
| value [limit: limit.limit, usage: usage.usage, usage_max: usage.usage_max]";

const RATE_PER_SECOND_QUERY: &str = "\
fetch consumer_quota
| filter resource.service =~ '.*'
| { usage:
      metric 'serviceruntime.googleapis.com/quota/rate/net_usage'
      | filter resource.project_id = '{project}'
      | align next_older(1s)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.method],
          [usage: aggregate(value.net_usage), usage_max: max(value.net_usage)]
  ; limit:
      metric 'serviceruntime.googleapis.com/quota/limit'
      | filter resource.project_id = '{project}'
      | filter metric.limit_name =~ '{egress}'
      | align next_older(1s)
      | group_by
          [resource.service, resource.project_id, resource.location, metric.quota_metric, metric.limit_name],
          [limit: aggregate(value.limit)] }
| join
| value [limit: limit.limit, usage: usage.usage, usage_max: usage.usage_max]";

/// The three reporting granularities of rate quotas, keyed by the reset
/// period encoded in the limit name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    PerMinute,
    PerDay,
    PerSecond,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [
        Granularity::PerMinute,
        Granularity::PerDay,
        Granularity::PerSecond,
    ];

    pub fn query(&self, project_id: &str) -> String {
        let template = match self {
            Granularity::PerMinute => RATE_PER_MINUTE_QUERY,
            Granularity::PerDay => RATE_PER_DAY_QUERY,
            Granularity::PerSecond => RATE_PER_SECOND_QUERY,
        };
        render(template, project_id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::PerMinute => "per-minute",
            Granularity::PerDay => "per-day",
            Granularity::PerSecond => "per-second",
        }
    }
}

pub fn allocation_query(project_id: &str) -> String {
    render(ALLOCATION_QUERY, project_id)
}

fn render(template: &str, project_id: &str) -> String {
    template
        .replace("{project}", project_id)
        .replace("{day}", DAY_LIMIT_PATTERN)
        .replace("{seconds}", SECONDS_LIMIT_PATTERN)
        .replace("{egress}", EGRESS_LIMIT_PATTERN)
}
