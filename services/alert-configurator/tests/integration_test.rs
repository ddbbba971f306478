use std::net::TcpListener;
use std::time::Duration;

use anyhow::Result;
use quota_watch_configurator::config::ConfiguratorConfig;
use quota_watch_configurator::server::ConfiguratorServer;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY_PATH: &str = "/projects/home-project/queries";
const INSERT_PATH: &str = "/projects/home-project/datasets/quota_monitoring/tables/app_alerts/insertAll";
const SEED_PATH: &str = "/seed/app_alerts.csv";

const SEED_CSV: &str = "\
project_id,email_id,app_code,dashboard_url
project-a,team-a@example.com,app-a,https://dashboards.example.com/a
project-b,team-b@example.com,app-b,https://dashboards.example.com/b
";

fn unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind ephemeral port")
        .local_addr()
        .expect("listener has no local addr")
        .port()
}

fn base_config(
    warehouse_url: String,
    monitoring_url: String,
    storage_url: String,
    port: u16,
) -> ConfiguratorConfig {
    ConfiguratorConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: port,
        warehouse_api_url: warehouse_url,
        monitoring_api_url: monitoring_url,
        home_project: "home-project".to_string(),
        app_alert_dataset: "quota_monitoring".to_string(),
        app_alert_table: "app_alerts".to_string(),
        csv_source_url: format!("{}{}", storage_url, SEED_PATH),
        request_timeout_secs: 2,
        log_level: "warn".to_string(),
    }
}

async fn start_configurator(config: ConfiguratorConfig) -> (JoinHandle<Result<()>>, String) {
    let addr = config.listen_addr();
    let base_url = format!("http://{}", addr);
    config.validate().expect("config validation failed");
    let server = ConfiguratorServer::new(config).expect("failed to construct configurator server");
    let handle = tokio::spawn(async move { server.run().await });
    wait_for_port(&addr).await;
    (handle, base_url)
}

async fn wait_for_port(addr: &str) {
    for _ in 0..20 {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return,
            Err(_) => sleep(Duration::from_millis(50)).await,
        }
    }
    panic!("configurator [{}] did not become ready in time", addr);
}

async fn teardown(handle: JoinHandle<Result<()>>) {
    handle.abort();
    let _ = handle.await;
}

fn app_alert_row(app_code: &str, with_ids: bool) -> Value {
    json!({
        "project_id": "project-a",
        "email_id": "team-a@example.com",
        "app_code": app_code,
        "dashboard_url": "https://dashboards.example.com/a",
        "notification_channel_id": if with_ids {
            json!("projects/home-project/notificationChannels/chan-1")
        } else {
            Value::Null
        },
        "custom_log_metric_id": if with_ids {
            json!(format!("resource_usage_{}", app_code))
        } else {
            Value::Null
        },
        "alert_policy_id": if with_ids {
            json!("projects/home-project/alertPolicies/pol-1")
        } else {
            Value::Null
        }
    })
}

async fn mount_count(warehouse: &MockServer, count: i64) {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_string_contains("COUNT(*)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobComplete": true,
            "rows": [{"count": count}]
        })))
        .mount(warehouse)
        .await;
}

async fn mount_select(warehouse: &MockServer, rows: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_string_contains("SELECT *"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobComplete": true,
            "rows": rows
        })))
        .mount(warehouse)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn bootstrap_seeds_table_and_provisions_all_apps() -> Result<()> {
    let warehouse = MockServer::start().await;
    let monitoring = MockServer::start().await;
    let storage = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEED_CSV))
        .expect(1)
        .mount(&storage)
        .await;

    mount_count(&warehouse, 0).await;
    mount_select(
        &warehouse,
        vec![app_alert_row("app-a", false), app_alert_row("app-b", false)],
    )
    .await;
    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"insertErrors": []})))
        .expect(1)
        .mount(&warehouse)
        .await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_string_contains("UPDATE"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jobComplete": true, "rows": []})),
        )
        .expect(2)
        .mount(&warehouse)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/projects/home-project/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "resource_usage_app",
            "description": "",
            "filter": "jsonPayload.message:\"|AppCode-app\""
        })))
        .expect(2)
        .mount(&monitoring)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/projects/home-project/notificationChannels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/home-project/notificationChannels/chan-1",
            "type": "email",
            "displayName": "OnCall-app"
        })))
        .expect(2)
        .mount(&monitoring)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/projects/home-project/alertPolicies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/home-project/alertPolicies/pol-1",
            "displayName": "QuotaExceedAlertPolicy-app",
            "combiner": "OR"
        })))
        .expect(2)
        .mount(&monitoring)
        .await;

    let config = base_config(warehouse.uri(), monitoring.uri(), storage.uri(), unused_port());
    let (handle, base_url) = start_configurator(config).await;

    let response = Client::new()
        .post(format!("{}/api/configure", base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["seeded_rows"], 2);
    assert_eq!(body["configured_apps"], 2);
    assert_eq!(body["failed_apps"], 0);

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn second_pass_updates_instead_of_creating() -> Result<()> {
    let warehouse = MockServer::start().await;
    let monitoring = MockServer::start().await;
    let storage = MockServer::start().await;

    // Table already initialized: the CSV source must not be touched.
    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEED_CSV))
        .expect(0)
        .mount(&storage)
        .await;

    mount_count(&warehouse, 1).await;
    mount_select(&warehouse, vec![app_alert_row("app-a", true)]).await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_string_contains("UPDATE"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jobComplete": true, "rows": []})),
        )
        .expect(1)
        .mount(&warehouse)
        .await;

    // Existing resources: no creates, only in-place updates; the log
    // metric is never touched once present.
    Mock::given(method("POST"))
        .and(path("/v2/projects/home-project/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "resource_usage_app-a",
            "filter": ""
        })))
        .expect(0)
        .mount(&monitoring)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/projects/home-project/notificationChannels"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&monitoring)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/projects/home-project/alertPolicies"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&monitoring)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v3/projects/home-project/notificationChannels/chan-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/home-project/notificationChannels/chan-1",
            "type": "email",
            "displayName": "OnCall-app-a"
        })))
        .expect(1)
        .mount(&monitoring)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v3/projects/home-project/alertPolicies/pol-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/home-project/alertPolicies/pol-1",
            "displayName": "QuotaExceedAlertPolicy-app-a",
            "combiner": "OR"
        })))
        .expect(1)
        .mount(&monitoring)
        .await;

    let config = base_config(warehouse.uri(), monitoring.uri(), storage.uri(), unused_port());
    let (handle, base_url) = start_configurator(config).await;

    let response = Client::new()
        .post(format!("{}/api/configure", base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["seeded_rows"], 0);
    assert_eq!(body["configured_apps"], 1);
    assert_eq!(body["failed_apps"], 0);

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_app_code_halts_before_any_provisioning() -> Result<()> {
    let warehouse = MockServer::start().await;
    let monitoring = MockServer::start().await;
    let storage = MockServer::start().await;

    mount_count(&warehouse, 2).await;
    mount_select(
        &warehouse,
        vec![app_alert_row("app-a", false), app_alert_row("app-a", false)],
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/v2/projects/home-project/metrics"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&monitoring)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/projects/home-project/notificationChannels"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&monitoring)
        .await;

    let config = base_config(warehouse.uri(), monitoring.uri(), storage.uri(), unused_port());
    let (handle, base_url) = start_configurator(config).await;

    let response = Client::new()
        .post(format!("{}/api/configure", base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await?;
    assert_eq!(body["code"], "integrity_violation");

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_seed_csv_rejects_the_whole_load() -> Result<()> {
    let warehouse = MockServer::start().await;
    let monitoring = MockServer::start().await;
    let storage = MockServer::start().await;

    let bad_csv = "\
project_id,email_id,app_code,dashboard_url
project-a,,app-a,https://dashboards.example.com/a
";
    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(bad_csv))
        .mount(&storage)
        .await;

    mount_count(&warehouse, 0).await;
    Mock::given(method("POST"))
        .and(path(INSERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"insertErrors": []})))
        .expect(0)
        .mount(&warehouse)
        .await;

    let config = base_config(warehouse.uri(), monitoring.uri(), storage.uri(), unused_port());
    let (handle, base_url) = start_configurator(config).await;

    let response = Client::new()
        .post(format!("{}/api/configure", base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), 409);

    teardown(handle).await;
    Ok(())
}
