//! End-to-end tests for the webhook route.

use anyhow::Result;
use autohook::{app::App, config::Config, event::EventEnvelope, server::WebhookServer};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::{FakeLightGroups, RecordingLight, RecordingSms, RecordingSpeaker};

struct TestServer {
    url: String,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    _dir: TempDir,
    log_path: std::path::PathBuf,
    speaker: Arc<RecordingSpeaker>,
    sms: Arc<RecordingSms>,
    bulbs: Vec<Arc<RecordingLight>>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let log_path = dir.path().join("webhook-events.json");

        let mut config = Config::default();
        config.event_log.path = log_path.clone();
        config.sms.enabled = true;
        config.sms.from_number = "+15550100".to_string();
        config.sms.recipients = vec!["+15550101".to_string()];
        config.lights.enabled = true;
        config.lights.groups = vec!["Basement".to_string(), "Garage".to_string()];

        let speaker = Arc::new(RecordingSpeaker::default());
        let sms = Arc::new(RecordingSms::default());
        let bulbs = vec![RecordingLight::new("1"), RecordingLight::new("2")];
        // "Garage" is missing from the bridge and is skipped.
        let groups = FakeLightGroups::default().with_group("Basement", bulbs.clone());

        let app = App::builder(config)
            .speaker_override(speaker.clone())
            .sms_transport_override(sms.clone())
            .light_groups_override(Arc::new(groups))
            .build()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/hooks/automatic", listener.local_addr()?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(WebhookServer::new(listener, Arc::new(app), shutdown_rx).run());

        Ok(Self {
            url,
            shutdown_tx,
            handle,
            _dir: dir,
            log_path,
            speaker,
            sms,
            bulbs,
        })
    }

    async fn shutdown(self) -> Result<()> {
        self.shutdown_tx.send(true)?;
        self.handle.await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_webhook_dispatches_all_channels_before_responding() -> Result<()> {
    let server = TestServer::start().await?;
    let payload = json!({
        "id": "E_1",
        "type": "notification:speeding",
        "speed_mph": 82.1,
        "vehicle": { "id": "C_1", "url": "https://example.com/vehicle/C_1" }
    });

    let response = reqwest::Client::new()
        .post(&server.url)
        .body(payload.to_string())
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await?.is_empty());

    // Everything has happened by the time the response arrives.
    assert_eq!(server.speaker.spoken(), vec!["Speeding"]);
    assert_eq!(server.sms.sent().len(), 1);
    assert_eq!(server.sms.sent()[0].body, "Speeding");
    for bulb in &server.bulbs {
        assert_eq!(bulb.states().len(), 21);
    }

    let contents = tokio::fs::read_to_string(&server.log_path).await?;
    let logged = EventEnvelope::from_json(contents.trim_end())?;
    assert_eq!(logged.attributes(), payload.as_object().unwrap());

    server.shutdown().await
}

#[tokio::test]
async fn test_webhook_handles_unknown_event_type() -> Result<()> {
    let server = TestServer::start().await?;

    // Unknown type: fallback phrase, lights untouched.
    let response = reqwest::Client::new()
        .post(&server.url)
        .body(r#"{"type":"foo:bar"}"#)
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(server.speaker.spoken(), vec!["No idea what happened"]);
    assert!(server.bulbs.iter().all(|b| b.states().is_empty()));

    server.shutdown().await
}

#[tokio::test]
async fn test_webhook_rejects_non_object_payload() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    for body in ["not json", "[1,2,3]", "\"ignition:on\""] {
        let response = client.post(&server.url).body(body).send().await?;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "{body}");
    }

    assert!(server.speaker.spoken().is_empty());
    assert!(!server.log_path.exists());

    server.shutdown().await
}

#[tokio::test]
async fn test_events_are_appended_one_per_line() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    for event_type in ["ignition:on", "trip:finished", "ignition:off"] {
        let body = json!({ "type": event_type }).to_string();
        client.post(&server.url).body(body).send().await?;
    }

    let contents = tokio::fs::read_to_string(&server.log_path).await?;
    let types: Vec<String> = contents
        .lines()
        .map(|line| {
            EventEnvelope::from_json(line)
                .unwrap()
                .event_type()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(types, vec!["ignition:on", "trip:finished", "ignition:off"]);

    server.shutdown().await
}
