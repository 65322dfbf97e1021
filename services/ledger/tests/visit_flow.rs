mod common;
mod http_helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use common::{ledger_app, read_json, wait_for_emails};
use http_helpers::json_request;
use tower::ServiceExt;
use varco_ledger::model::NewVisit;
use varco_ledger::store::VisitorStore;

fn assert_code_format(codice: &str) {
    let digits = codice.strip_prefix("ARTEN-").expect("ARTEN- prefix");
    assert_eq!(digits.len(), 4, "four digits in {codice}");
    assert!(digits.bytes().all(|b| b.is_ascii_digit()), "digits in {codice}");
}

fn seeded_visit(nome: &str, code: &str, ora_entrata: DateTime<Utc>) -> NewVisit {
    NewVisit {
        nome: nome.to_string(),
        ditta: "Acme".to_string(),
        email: "m@acme.it".to_string(),
        referente: None,
        zona: None,
        codice_univoco: code.parse().expect("code"),
        ora_entrata,
        firma_url: None,
        privacy_accettata: false,
    }
}

#[tokio::test]
async fn check_in_issues_a_code_and_an_open_visit() {
    let ctx = ledger_app();

    let check_in = json_request(
        "POST",
        "/visit",
        serde_json::json!({
            "nome": "Mario Rossi",
            "ditta": "Acme",
            "email": "m@acme.it",
            "referente": "Bianchi",
            "zona": "Magazzino",
            "privacy_accettata": true
        }),
    );
    let response = ctx.app.clone().oneshot(check_in).await.expect("check-in");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Ingresso registrato");
    assert_code_format(payload["codice"].as_str().expect("codice"));
    assert_eq!(payload["visitor"]["nome"], "Mario Rossi");
    assert!(payload["visitor"]["ora_uscita"].is_null());
    assert_eq!(payload["visitor"]["privacy_accettata"], true);
    assert!(payload["visitor"]["firma_url"].is_null());

    // Confirmation email goes out with the code, without blocking the reply.
    wait_for_emails(&ctx.mailer, 1).await;
    let sent = ctx.mailer.sent().await;
    assert_eq!(sent[0].to, "m@acme.it");
    assert!(sent[0]
        .subject
        .contains(payload["codice"].as_str().expect("codice")));
}

#[tokio::test]
async fn check_in_validates_mandatory_fields() {
    let ctx = ledger_app();

    for body in [
        serde_json::json!({}),
        serde_json::json!({ "nome": "Mario Rossi", "ditta": "Acme" }),
        serde_json::json!({ "nome": "  ", "ditta": "Acme", "email": "m@acme.it" }),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request("POST", "/visit", body))
            .await
            .expect("check-in");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["success"], false);
        assert_eq!(payload["message"], "Nome, Ditta e Email sono obbligatori");
    }

    // Nothing was persisted.
    let list = Request::builder()
        .uri("/visit")
        .body(Body::empty())
        .expect("list");
    let response = ctx.app.clone().oneshot(list).await.expect("list");
    let payload = read_json(response).await;
    assert!(payload["visitors"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn check_in_uploads_the_consent_artifact() {
    let ctx = ledger_app();
    use base64::Engine;
    let pdf = format!(
        "data:application/pdf;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(b"pdf-bytes")
    );

    let check_in = json_request(
        "POST",
        "/visit",
        serde_json::json!({
            "nome": "Mario Rossi",
            "ditta": "Acme",
            "email": "m@acme.it",
            "firma_pdf": pdf,
            "privacy_accettata": true
        }),
    );
    let response = ctx.app.clone().oneshot(check_in).await.expect("check-in");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    let firma_url = payload["visitor"]["firma_url"].as_str().expect("firma_url");
    assert!(firma_url.contains("firmato_"));

    let uploads = ctx.signatures.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1, "application/pdf");
}

#[tokio::test]
async fn check_out_transitions_once_then_reports_not_found() {
    let ctx = ledger_app();

    let check_in = json_request(
        "POST",
        "/visit",
        serde_json::json!({ "nome": "Mario Rossi", "ditta": "Acme", "email": "m@acme.it" }),
    );
    let response = ctx.app.clone().oneshot(check_in).await.expect("check-in");
    let payload = read_json(response).await;
    let id = payload["visitor"]["id"].as_str().expect("id").to_string();

    let check_out = json_request("PUT", "/visit", serde_json::json!({ "id": id }));
    let response = ctx.app.clone().oneshot(check_out).await.expect("check-out");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["message"], "Uscita registrata");
    assert!(!payload["visitor"]["ora_uscita"].is_null());

    // Exit confirmation follows the entry confirmation.
    wait_for_emails(&ctx.mailer, 2).await;
    let sent = ctx.mailer.sent().await;
    assert!(sent.iter().any(|email| email.subject.starts_with("Conferma Uscita")));

    let again = json_request("PUT", "/visit", serde_json::json!({ "id": id }));
    let response = ctx.app.clone().oneshot(again).await.expect("check-out");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["message"], "Visitatore non trovato o già uscito");

    let missing_id = json_request("PUT", "/visit", serde_json::json!({}));
    let response = ctx.app.clone().oneshot(missing_id).await.expect("check-out");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let malformed_id = json_request("PUT", "/visit", serde_json::json!({ "id": "not-a-uuid" }));
    let response = ctx.app.clone().oneshot(malformed_id).await.expect("check-out");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn code_login_replays_the_latest_visit() {
    let ctx = ledger_app();

    // Two historical visits under the same code; the newer one carries the
    // referee the copy should inherit.
    let old = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().expect("t");
    let newer = Utc.with_ymd_and_hms(2025, 6, 5, 8, 0, 0).single().expect("t");
    ctx.store
        .insert_visit(seeded_visit("Mario Rossi", "ARTEN-1234", old))
        .await
        .expect("seed");
    let mut latest = seeded_visit("Mario Rossi", "ARTEN-1234", newer);
    latest.referente = Some("Bianchi".to_string());
    ctx.store.insert_visit(latest).await.expect("seed");

    let login = json_request("POST", "/code-login", serde_json::json!({ "codice": "ARTEN-1234" }));
    let response = ctx.app.clone().oneshot(login).await.expect("login");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Bentornato Mario Rossi! Ingresso registrato.");
    assert_eq!(payload["visitor"]["codice_univoco"], "ARTEN-1234");
    assert_eq!(payload["visitor"]["referente"], "Bianchi");
    // Consent was captured on the first visit; the copy is marked accepted.
    assert_eq!(payload["visitor"]["privacy_accettata"], true);
    assert!(payload["visitor"]["ora_uscita"].is_null());

    wait_for_emails(&ctx.mailer, 1).await;
}

#[tokio::test]
async fn code_login_rejects_unknown_and_malformed_codes() {
    let ctx = ledger_app();

    let unknown = json_request("POST", "/code-login", serde_json::json!({ "codice": "ARTEN-0001" }));
    let response = ctx.app.clone().oneshot(unknown).await.expect("login");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .starts_with("Codice non trovato"));

    for codice in ["", "1234", "ARTEN-12", "BADGE-1234"] {
        let malformed =
            json_request("POST", "/code-login", serde_json::json!({ "codice": codice }));
        let response = ctx.app.clone().oneshot(malformed).await.expect("login");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "codice {codice:?}");
        let payload = read_json(response).await;
        assert_eq!(payload["message"], "Codice non valido. Formato: ARTEN-XXXX");
    }

    // No record was created by any rejected attempt.
    let list = Request::builder()
        .uri("/visit?date=2025-06-01")
        .body(Body::empty())
        .expect("list");
    let response = ctx.app.clone().oneshot(list).await.expect("list");
    let payload = read_json(response).await;
    assert!(payload["visitors"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn listing_filters_by_local_calendar_day() {
    let ctx = ledger_app();

    // 22:30 UTC on 9 June is already 10 June in Rome; 23:30 UTC on 10 June is
    // 11 June. Both probe the day boundary.
    let before = Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).single().expect("t");
    let boundary = Utc.with_ymd_and_hms(2025, 6, 9, 22, 30, 0).single().expect("t");
    let mid = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).single().expect("t");
    let after = Utc.with_ymd_and_hms(2025, 6, 10, 23, 30, 0).single().expect("t");
    for (nome, code, at) in [
        ("Day Before", "ARTEN-1111", before),
        ("Boundary", "ARTEN-2222", boundary),
        ("Mid Day", "ARTEN-3333", mid),
        ("Day After", "ARTEN-4444", after),
    ] {
        ctx.store
            .insert_visit(seeded_visit(nome, code, at))
            .await
            .expect("seed");
    }

    let list = Request::builder()
        .uri("/visit?date=2025-06-10")
        .body(Body::empty())
        .expect("list");
    let response = ctx.app.clone().oneshot(list).await.expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let visitors = payload["visitors"].as_array().expect("array");
    assert_eq!(visitors.len(), 2);
    // Most recent entry first.
    assert_eq!(visitors[0]["nome"], "Mid Day");
    assert_eq!(visitors[1]["nome"], "Boundary");

    let bad_date = Request::builder()
        .uri("/visit?date=10-06-2025")
        .body(Body::empty())
        .expect("list");
    let response = ctx.app.clone().oneshot(bad_date).await.expect("list");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
