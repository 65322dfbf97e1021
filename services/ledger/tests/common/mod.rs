use std::sync::Arc;
use std::time::Duration;
use varco_ledger::app::{build_router, AppState, EnvDiagnostics};
use varco_ledger::mail::{Mailer, RecordingMailer};
use varco_ledger::signatures::RecordingSignatureStore;
use varco_ledger::store::memory::InMemoryStore;

pub const CRON_SECRET: &str = "s3cret-sweep";

pub struct TestContext {
    pub app: axum::routing::RouterIntoService<axum::body::Body, ()>,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub signatures: Arc<RecordingSignatureStore>,
}

pub fn ledger_app() -> TestContext {
    ledger_app_with_mailer(Arc::new(RecordingMailer::new()))
}

pub fn ledger_app_failing_mail() -> TestContext {
    ledger_app_with_mailer(Arc::new(RecordingMailer::failing()))
}

fn ledger_app_with_mailer(mailer: Arc<RecordingMailer>) -> TestContext {
    let store = Arc::new(InMemoryStore::new());
    let signatures = Arc::new(RecordingSignatureStore::new());
    let state = AppState {
        store: store.clone(),
        mailer: mailer.clone() as Arc<dyn Mailer>,
        signatures: signatures.clone(),
        display_tz: chrono_tz::Europe::Rome,
        admin_email: "service@arten.it".to_string(),
        cron_secret: Some(CRON_SECRET.to_string()),
        diagnostics: EnvDiagnostics {
            database_url: false,
            smtp_pass: true,
            cron_secret: true,
            bucket_key: true,
        },
    };
    TestContext {
        app: build_router(state).into_service(),
        store,
        mailer,
        signatures,
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Courtesy emails are delivered by spawned tasks; poll until the expected
/// count lands or the deadline passes.
pub async fn wait_for_emails(mailer: &RecordingMailer, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        if mailer.sent().await.len() >= count {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("expected {count} emails, got {}", mailer.sent().await.len());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
