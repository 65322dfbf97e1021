// Typed client for the Varco visit ledger API.
//
// The reception kiosk and the admin console drive the same small JSON
// surface; this crate wraps it once so both speak identical request shapes
// and the QR flow validates a scanned payload locally before any network
// round trip.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use varco_common::ids::{RefereeId, VisitId};
use varco_common::AccessCode;

pub mod export;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("ledger refused the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Code(#[from] varco_common::Error),
}

/// A visit row as the ledger serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitRecord {
    pub id: VisitId,
    pub nome: String,
    pub ditta: String,
    pub email: String,
    pub referente: Option<String>,
    pub zona: Option<String>,
    pub codice_univoco: AccessCode,
    pub ora_entrata: DateTime<Utc>,
    pub ora_uscita: Option<DateTime<Utc>>,
    pub firma_url: Option<String>,
    pub privacy_accettata: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefereeRecord {
    pub id: RefereeId,
    pub nome: String,
    pub email: Option<String>,
}

/// Check-in form data. The signature fields carry base64 data URLs produced
/// by the kiosk's signature pad and consent renderer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckInForm {
    pub nome: String,
    pub ditta: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firma_pdf: Option<String>,
    pub privacy_accettata: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInOutcome {
    pub codice: AccessCode,
    pub visitor: VisitRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReentryOutcome {
    pub message: String,
    pub visitor: VisitRecord,
}

#[derive(Debug, Deserialize)]
struct RefereesEnvelope {
    referees: Vec<RefereeRecord>,
}

#[derive(Debug, Deserialize)]
struct RefereeEnvelope {
    referee: RefereeRecord,
}

#[derive(Debug, Deserialize)]
struct VisitorsEnvelope {
    visitors: Vec<VisitRecord>,
}

#[derive(Debug, Deserialize)]
struct VisitorEnvelope {
    visitor: VisitRecord,
}

pub struct VarcoClient {
    http: reqwest::Client,
    base_url: String,
}

impl VarcoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn referees(&self) -> Result<Vec<RefereeRecord>> {
        let envelope: RefereesEnvelope = decode(self.http.get(self.url("/referees")).send().await?).await?;
        Ok(envelope.referees)
    }

    pub async fn add_referee(&self, nome: &str, email: Option<&str>) -> Result<RefereeRecord> {
        let body = serde_json::json!({ "nome": nome, "email": email });
        let envelope: RefereeEnvelope =
            decode(self.http.post(self.url("/referees")).json(&body).send().await?).await?;
        Ok(envelope.referee)
    }

    pub async fn remove_referee(&self, id: &RefereeId) -> Result<()> {
        let body = serde_json::json!({ "id": id.to_string() });
        decode::<serde_json::Value>(
            self.http
                .delete(self.url("/referees"))
                .json(&body)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    pub async fn check_in(&self, form: &CheckInForm) -> Result<CheckInOutcome> {
        decode(self.http.post(self.url("/visit")).json(form).send().await?).await
    }

    pub async fn check_out(&self, id: &VisitId) -> Result<VisitRecord> {
        let body = serde_json::json!({ "id": id.to_string() });
        let envelope: VisitorEnvelope =
            decode(self.http.put(self.url("/visit")).json(&body).send().await?).await?;
        Ok(envelope.visitor)
    }

    /// Visits for a calendar day; `None` asks the ledger for today.
    pub async fn visits(&self, date: Option<NaiveDate>) -> Result<Vec<VisitRecord>> {
        let mut request = self.http.get(self.url("/visit"));
        if let Some(date) = date {
            request = request.query(&[("date", date.format("%Y-%m-%d").to_string())]);
        }
        let envelope: VisitorsEnvelope = decode(request.send().await?).await?;
        Ok(envelope.visitors)
    }

    pub async fn code_login(&self, codice: &AccessCode) -> Result<ReentryOutcome> {
        let body = serde_json::json!({ "codice": codice.as_str() });
        decode(
            self.http
                .post(self.url("/code-login"))
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    /// Re-entry from a scanned QR payload: the code format is validated
    /// locally, so a garbled scan never reaches the ledger.
    pub async fn code_login_scanned(&self, payload: &str) -> Result<ReentryOutcome> {
        let codice = AccessCode::parse(payload.trim())?;
        self.code_login(&codice).await
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        Ok(self.http.get(self.url("/health")).send().await?.json().await?)
    }
}

/// Unwrap the ledger's `{success, message, ...}` envelope, turning any
/// non-success answer into a typed error carrying the server's message.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<serde_json::Value>(&bytes)
            .ok()
            .and_then(|value| value["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&bytes).map_err(|err| ClientError::Api {
        status: status.as_u16(),
        message: format!("unexpected response shape: {err}"),
    })
}
