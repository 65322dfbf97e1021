//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes of the register's endpoints. Request fields are
//! optional at the serde layer so that a missing mandatory field produces the
//! register's own 400 message instead of a deserializer rejection.
use crate::model::{Referee, Visit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct CheckInRequest {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub ditta: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub referente: Option<String>,
    #[serde(default)]
    pub zona: Option<String>,
    /// Signature image as a base64 data URL.
    #[serde(default)]
    pub firma: Option<String>,
    /// Consent PDF with the signature embedded, as a base64 data URL.
    #[serde(default)]
    pub firma_pdf: Option<String>,
    #[serde(default)]
    pub privacy_accettata: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub success: bool,
    pub message: String,
    pub codice: String,
    pub visitor: Visit,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckOutRequest {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutResponse {
    pub success: bool,
    pub message: String,
    pub visitor: Visit,
}

#[derive(Debug, Serialize)]
pub struct VisitListResponse {
    pub success: bool,
    pub visitors: Vec<Visit>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CodeLoginRequest {
    #[serde(default)]
    pub codice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CodeLoginResponse {
    pub success: bool,
    pub message: String,
    pub visitor: Visit,
}

#[derive(Debug, Serialize)]
pub struct RefereeListResponse {
    pub success: bool,
    pub referees: Vec<Referee>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefereeCreateRequest {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefereeCreateResponse {
    pub success: bool,
    pub referee: Referee,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefereeDeleteRequest {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Presence report for `/health`: which required configuration is set and
/// whether the store answers.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub timestamp: String,
    pub env: HealthEnv,
    pub store: String,
    pub backend: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthEnv {
    pub database_url: &'static str,
    pub smtp_pass: &'static str,
    pub cron_secret: &'static str,
    pub bucket_key: &'static str,
}
