use super::*;
use backend::MockAnalyticsBackend;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink(Mutex<Vec<String>>);

impl ErrorSink for RecordingSink {
    fn report(&self, error: &TelemetryError) {
        self.0.lock().unwrap().push(error.to_string());
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tray_telemetry=debug")
        .with_test_writer()
        .try_init();
}

fn test_traits() -> Traits {
    Traits {
        tray_os_version: "Fedora Linux 40".to_string(),
        tray_os_release: "6.8.5".to_string(),
        tray_os: "linux".to_string(),
    }
}

fn create_test_config(home: &Path) -> TelemetryConfig {
    TelemetryConfig::new(true, "test-key")
        .with_home_dir(home)
        .with_app_version("2.0.1")
}

#[tokio::test]
async fn test_disabled_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    // no expectations: any call panics
    let backend = Arc::new(MockAnalyticsBackend::new());
    let config = TelemetryConfig::new(false, "test-key").with_home_dir(dir.path());

    let telemetry = Telemetry::new(config, backend, Arc::new(RecordingSink::default())).await;
    telemetry.track_error("boom").await;
    telemetry.track_success("ok").await;

    assert!(!telemetry.is_enabled());
    assert!(telemetry.user_id().is_none());
    assert!(!dir.path().join(".redhat").exists());
    assert!(!dir.path().join(".crc").exists());
}

#[tokio::test]
async fn test_first_run_identifies_once() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MockAnalyticsBackend::new();
    backend
        .expect_identify()
        .withf(|msg| msg.traits == test_traits() && msg.context.ip == "0.0.0.0")
        .times(1)
        .returning(|_| Ok(()));

    let telemetry = Telemetry::with_traits(
        create_test_config(dir.path()),
        test_traits(),
        Arc::new(backend),
        Arc::new(RecordingSink::default()),
    )
    .await;

    let user_id = telemetry.user_id().unwrap();
    assert_eq!(user_id.len(), 36);

    let stored = std::fs::read_to_string(
        dir.path().join(".crc").join("segmentIdentifyHashForExtension"),
    )
    .unwrap();
    assert_eq!(Some(stored.as_str()), telemetry.identity_hash());
}

#[tokio::test]
async fn test_track_error_properties() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MockAnalyticsBackend::new();
    backend.expect_identify().returning(|_| Ok(()));
    backend
        .expect_track()
        .withf(|msg| {
            msg.event == TrackEvent::Error
                && msg.properties.message == "disk full"
                && msg.properties.source == "tray-electron"
                && msg.properties.tray_version == "2.0.1"
                && msg.properties.crc_version.is_empty()
        })
        .times(1)
        .returning(|_| Ok(()));

    let telemetry = Telemetry::with_traits(
        create_test_config(dir.path()),
        test_traits(),
        Arc::new(backend),
        Arc::new(RecordingSink::default()),
    )
    .await;

    telemetry.track_error("disk full").await;
}

#[tokio::test]
async fn test_track_success_event_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MockAnalyticsBackend::new();
    backend.expect_identify().returning(|_| Ok(()));
    backend
        .expect_track()
        .withf(|msg| msg.event.as_str() == "tray operation successful")
        .times(2)
        .returning(|_| Ok(()));

    let telemetry = Telemetry::with_traits(
        create_test_config(dir.path()),
        test_traits(),
        Arc::new(backend),
        Arc::new(RecordingSink::default()),
    )
    .await;

    telemetry.track_success("cluster started").await;
    telemetry.track_success("cluster stopped").await;
}

#[tokio::test]
async fn test_backend_failure_goes_to_sink() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MockAnalyticsBackend::new();
    backend
        .expect_identify()
        .returning(|_| Err(TelemetryError::Backend("HTTP 503".to_string())));
    backend
        .expect_track()
        .returning(|_| Err(TelemetryError::Backend("HTTP 503".to_string())));
    let sink = Arc::new(RecordingSink::default());

    let telemetry = Telemetry::with_traits(
        create_test_config(dir.path()),
        test_traits(),
        Arc::new(backend),
        sink.clone(),
    )
    .await;
    telemetry.track_error("boom").await;

    assert!(telemetry.is_enabled());
    let errors = sink.0.lock().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.contains("HTTP 503")));
}

#[tokio::test]
async fn test_disabled_constructor() {
    let telemetry = Telemetry::disabled();
    telemetry.track_error("ignored").await;

    assert!(!telemetry.is_enabled());
    assert!(telemetry.identity_hash().is_none());
}

#[tokio::test]
async fn test_segment_disabled_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = TelemetryConfig::new(false, "test-key")
        .with_home_dir(dir.path())
        .with_endpoint_url("http://127.0.0.1:1");

    let telemetry = Telemetry::segment(config).await;
    telemetry.track_error("boom").await;
    telemetry.track_success("ok").await;

    assert!(!telemetry.is_enabled());
    assert!(telemetry.user_id().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_needs_identify() {
    use crate::client::needs_identify;

    assert!(!needs_identify(Some("abc"), "abc"));
    assert!(needs_identify(Some("abc"), "def"));
    assert!(needs_identify(Some("abc"), ""));
    // no hash to compare: send rather than skip
    assert!(needs_identify(None, ""));
    assert!(needs_identify(None, "abc"));
}
