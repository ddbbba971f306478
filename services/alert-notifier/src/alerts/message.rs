use std::fmt::Write;

use super::fetch::Alert;

/// Markdown alert table, one row per violating quota metric.
pub fn build_alert_message(alerts: &[Alert]) -> String {
    let mut message = String::new();
    message.push_str("Quota metric usage alert details\n\n");
    let _ = writeln!(
        message,
        "## {} quota metric usages above threshold\n",
        alerts.len()
    );
    message.push_str("|ProjectId | Scope | Metric  | Consumption(%) |\n");
    message.push_str("|:---------|:------|:--------|:---------------|\n");

    for alert in alerts {
        let _ = writeln!(
            message,
            "|{} |{} |{} |{:.1} |",
            alert.project_id, alert.region, alert.metric, alert.consumption
        );
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(project_id: &str, consumption: f64) -> Alert {
        Alert {
            project_id: project_id.to_string(),
            region: "us-east1".to_string(),
            metric: "compute.googleapis.com/cpus".to_string(),
            current_usage: 85,
            quota_limit: 100,
            consumption,
        }
    }

    #[test]
    fn message_counts_and_lists_alerts() {
        let alerts = vec![alert("project-a", 85.0), alert("project-b", 92.5)];
        let message = build_alert_message(&alerts);

        assert!(message.contains("## 2 quota metric usages above threshold"));
        assert!(message.contains("|ProjectId | Scope | Metric  | Consumption(%) |"));
        assert!(message.contains("|project-a |us-east1 |compute.googleapis.com/cpus |85.0 |"));
        assert!(message.contains("|project-b |us-east1 |compute.googleapis.com/cpus |92.5 |"));
    }

    #[test]
    fn empty_alert_set_still_renders_header() {
        let message = build_alert_message(&[]);

        assert!(message.contains("## 0 quota metric usages above threshold"));
        assert!(message.ends_with("|:---------|:------|:--------|:---------------|\n"));
    }
}
