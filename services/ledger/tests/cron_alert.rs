mod common;
mod http_helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{ledger_app, ledger_app_failing_mail, read_json, CRON_SECRET};
use tower::ServiceExt;
use varco_ledger::model::NewVisit;
use varco_ledger::store::VisitorStore;

fn sweep_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/cron-alert");
    if let Some(value) = auth {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("request")
}

fn open_visit(nome: &str, code: &str) -> NewVisit {
    NewVisit {
        nome: nome.to_string(),
        ditta: "Acme".to_string(),
        email: "m@acme.it".to_string(),
        referente: Some("Bianchi".to_string()),
        zona: None,
        codice_univoco: code.parse().expect("code"),
        ora_entrata: Utc::now(),
        firma_url: None,
        privacy_accettata: true,
    }
}

#[tokio::test]
async fn sweep_requires_the_bearer_secret() {
    let ctx = ledger_app();

    for auth in [None, Some("Bearer wrong"), Some("Basic whatever"), Some("")] {
        let response = ctx
            .app
            .clone()
            .oneshot(sweep_request(auth))
            .await
            .expect("sweep");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "auth {auth:?}");
        let payload = read_json(response).await;
        assert_eq!(payload["success"], false);
        assert_eq!(payload["message"], "Unauthorized");
    }
    assert!(ctx.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn sweep_with_nobody_present_is_a_noop() {
    let ctx = ledger_app();
    let response = ctx
        .app
        .clone()
        .oneshot(sweep_request(Some(&format!("Bearer {CRON_SECRET}"))))
        .await
        .expect("sweep");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Nessun visitatore ancora presente.");
    assert!(ctx.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn sweep_mails_one_summary_to_the_operator() {
    let ctx = ledger_app();
    ctx.store
        .insert_visit(open_visit("Mario Rossi", "ARTEN-1111"))
        .await
        .expect("seed");
    ctx.store
        .insert_visit(open_visit("Anna Verdi", "ARTEN-2222"))
        .await
        .expect("seed");
    // A checked-out visitor must not appear in the alert.
    let done = ctx
        .store
        .insert_visit(open_visit("Gone Home", "ARTEN-3333"))
        .await
        .expect("seed");
    ctx.store
        .close_visit(&done.id, Utc::now())
        .await
        .expect("close");

    let response = ctx
        .app
        .clone()
        .oneshot(sweep_request(Some(&format!("Bearer {CRON_SECRET}"))))
        .await
        .expect("sweep");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["message"], "Alert inviato: 2 visitatori ancora presenti.");

    let sent = ctx.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "service@arten.it");
    assert!(sent[0].subject.contains("2 visitatori ancora presenti"));
    assert!(sent[0].html_body.contains("Mario Rossi"));
    assert!(sent[0].html_body.contains("Anna Verdi"));
    assert!(!sent[0].html_body.contains("Gone Home"));

    // The sweep persists nothing; running it again sends a fresh summary.
    let response = ctx
        .app
        .clone()
        .oneshot(sweep_request(Some(&format!("Bearer {CRON_SECRET}"))))
        .await
        .expect("sweep");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.mailer.sent().await.len(), 2);
}

#[tokio::test]
async fn sweep_surfaces_a_failed_summary_send() {
    let ctx = ledger_app_failing_mail();
    ctx.store
        .insert_visit(open_visit("Mario Rossi", "ARTEN-1111"))
        .await
        .expect("seed");

    let response = ctx
        .app
        .clone()
        .oneshot(sweep_request(Some(&format!("Bearer {CRON_SECRET}"))))
        .await
        .expect("sweep");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("invio alert fallito"));
}
