#![allow(clippy::unwrap_used)]
// Coordinator refresh behavior against a mocked inverter API.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use imeon_api::ImeonClient;
use imeon_core::{Coordinator, CoordinatorRegistry, CoreError, DeviceConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Coordinator) {
    let server = MockServer::start().await;
    let client = ImeonClient::with_client(
        reqwest::Client::new(),
        url::Url::parse(&server.uri()).unwrap(),
    );
    let config = DeviceConfig::new(
        server.uri(),
        "admin",
        SecretString::from("pw".to_string()),
    );
    let coordinator = Coordinator::with_client(client, "garage", "Garage Inverter", &config);
    (server, coordinator)
}

fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "status": "ok", "data": data })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!(null))))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn first_refresh_makes_no_network_call() {
    let (server, coordinator) = setup().await;

    // Any request at all would be a contract violation.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let snapshot = coordinator.refresh().await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn refresh_flattens_sections_and_keeps_timeline_verbatim() {
    let (server, coordinator) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "battery": { "soc": 42, "power": 100 },
            "inverter": { "inverter": "IMEON 9.12" },
            "timeline": [ { "message": "ok", "type": "good_1" } ]
        }))))
        .mount(&server)
        .await;

    coordinator.refresh().await; // first call, no network
    let snapshot = coordinator.refresh().await;

    assert_eq!(snapshot["battery_soc"], json!(42));
    assert_eq!(snapshot["battery_power"], json!(100));
    assert_eq!(snapshot["inverter_inverter"], json!("IMEON 9.12"));
    assert_eq!(
        snapshot["timeline"],
        json!([{ "message": "ok", "type": "good_1" }])
    );
    assert!(!snapshot.contains_key("timeline_message"));
}

#[tokio::test]
async fn refresh_is_idempotent_when_device_state_is_unchanged() {
    let (server, coordinator) = setup().await;
    mount_login(&server).await;

    let data = json!({
        "battery": { "soc": 42 },
        "inverter": { "inverter": "IMEON 9.12" }
    });

    // The identity block is populated after the full fetch, so the
    // second real refresh takes the incremental path.
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("scan", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data.clone())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data)))
        .mount(&server)
        .await;

    coordinator.refresh().await; // first call, no network
    let first = coordinator.refresh().await;
    let second = coordinator.refresh().await;

    assert_eq!(first, second);
    // Unchanged state keeps the very same snapshot allocation.
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn failed_refresh_keeps_the_stale_snapshot() {
    let (server, coordinator) = setup().await;
    mount_login(&server).await;

    // One good full fetch, then the device starts failing.
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "battery": { "soc": 42 },
            "inverter": { "inverter": "IMEON 9.12" }
        }))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    coordinator.refresh().await; // first call, no network
    let good = coordinator.refresh().await;
    assert_eq!(good["battery_soc"], json!(42));

    let after_failure = coordinator.refresh().await;
    assert_eq!(good, after_failure);
}

#[tokio::test]
async fn timed_out_refresh_keeps_the_stale_snapshot() {
    let (server, coordinator) = setup().await;
    let coordinator = coordinator.with_refresh_timeout(Duration::from_millis(250));
    mount_login(&server).await;

    let data = json!({
        "battery": { "soc": 42 },
        "inverter": { "inverter": "IMEON 9.12" }
    });

    // Once the identity block is populated, the incremental fetch only
    // answers long after the refresh bound elapses.
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("scan", "fast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_envelope(data.clone()))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data)))
        .mount(&server)
        .await;

    coordinator.refresh().await; // first call, no network
    let good = coordinator.refresh().await; // full fetch, answers fast
    assert_eq!(good["battery_soc"], json!(42));

    let after_timeout = coordinator.refresh().await;
    assert_eq!(good, after_timeout);
    assert!(Arc::ptr_eq(&good, &after_timeout));
}

#[tokio::test]
async fn update_config_re_arms_the_first_call_contract() {
    let (server, coordinator) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!({
            "battery": { "soc": 42 },
            "inverter": { "inverter": "IMEON 9.12" }
        }))))
        .mount(&server)
        .await;

    coordinator.refresh().await;
    let good = coordinator.refresh().await;
    assert!(!good.is_empty());

    // Reconfigure towards an address nothing listens on; the first
    // refresh after the swap must still return without device contact.
    let config = DeviceConfig::new(
        "192.0.2.1",
        "admin",
        SecretString::from("new-pw".to_string()),
    );
    coordinator.update_config(&config).await.unwrap();

    let after = coordinator.refresh().await;
    assert_eq!(good, after);
}

#[tokio::test]
async fn subscribers_wake_only_on_actual_change() {
    let (server, coordinator) = setup().await;
    mount_login(&server).await;

    let data = json!({
        "battery": { "soc": 42 },
        "inverter": { "inverter": "IMEON 9.12" }
    });

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("scan", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data.clone())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data)))
        .mount(&server)
        .await;

    let mut rx = coordinator.subscribe();

    coordinator.refresh().await; // first call, nothing published
    assert!(!rx.has_changed().unwrap());

    coordinator.refresh().await; // real fetch, snapshot changes
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    coordinator.refresh().await; // same device state, no wakeup
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn registry_lookup_of_unknown_label_fails_distinctly() {
    let (_server, coordinator) = setup().await;

    let registry = CoordinatorRegistry::new();
    registry.register(Arc::new(coordinator));

    assert!(registry.lookup("garage").is_ok());
    let result = registry.lookup("rooftop");
    assert!(
        matches!(result, Err(CoreError::CoordinatorNotFound { ref id }) if id == "rooftop"),
        "expected CoordinatorNotFound, got: {result:?}"
    );
}
