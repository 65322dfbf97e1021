//! Signature artifact storage.
//!
//! # Purpose
//! Check-in may carry the visitor's consent document as a data-URL: a
//! server-rendered PDF with the signature embedded, a plain signature image,
//! or both. The artifact is uploaded to an external object bucket and the
//! visit stores only the resulting public URL. Upload is strictly
//! best-effort: any failure logs a warning and the visit is created with a
//! null reference.
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;
use varco_common::AccessCode;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature storage not configured")]
    Disabled,
    #[error("payload is not valid base64: {0}")]
    Decode(String),
    #[error("upload failed: {0}")]
    Upload(String),
}

#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Store an artifact and return its public URL.
    async fn upload(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SignatureError>;
}

/// Bucket client speaking the storage service's REST interface: a `POST` per
/// object, bearer-authenticated, with a predictable public URL.
pub struct HttpBucketStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
    bucket: String,
}

impl HttpBucketStore {
    pub fn new(base_url: String, token: String, bucket: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            bucket,
        }
    }
}

#[async_trait]
impl SignatureStore for HttpBucketStore {
    async fn upload(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SignatureError> {
        let endpoint = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| SignatureError::Upload(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SignatureError::Upload(format!(
                "{} returned {}",
                endpoint,
                response.status()
            )));
        }
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        ))
    }
}

/// Used when no bucket is configured; uploads degrade to a null reference.
pub struct DisabledSignatureStore;

#[async_trait]
impl SignatureStore for DisabledSignatureStore {
    async fn upload(
        &self,
        _name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, SignatureError> {
        Err(SignatureError::Disabled)
    }
}

/// Test double that records uploads and hands back deterministic URLs.
pub struct RecordingSignatureStore {
    uploads: tokio::sync::Mutex<Vec<(String, String, usize)>>,
}

impl RecordingSignatureStore {
    pub fn new() -> Self {
        Self {
            uploads: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub async fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().await.clone()
    }
}

impl Default for RecordingSignatureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureStore for RecordingSignatureStore {
    async fn upload(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SignatureError> {
        self.uploads
            .lock()
            .await
            .push((name.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("https://bucket.test/public/{name}"))
    }
}

/// Store the check-in artifacts, preferring the signed PDF and falling back
/// to the bare signature image. Returns the public URL of whichever upload
/// succeeded, or `None` with the failure logged.
pub async fn store_artifacts(
    store: &dyn SignatureStore,
    codice: &AccessCode,
    now: DateTime<Utc>,
    firma_pdf: Option<&str>,
    firma: Option<&str>,
) -> Option<String> {
    let stamp = now.timestamp_millis();

    if let Some(payload) = firma_pdf {
        let name = format!("firmato_{}_{stamp}.pdf", codice.as_str());
        match upload_data_url(store, &name, "application/pdf", payload, "data:application/pdf;base64,").await {
            Ok(url) => return Some(url),
            Err(err) => log_upload_failure("pdf", &err),
        }
    }

    if let Some(payload) = firma {
        let name = format!("firma_{}_{stamp}.png", codice.as_str());
        let stripped = strip_image_prefix(payload);
        match upload_decoded(store, &name, "image/png", stripped).await {
            Ok(url) => return Some(url),
            Err(err) => log_upload_failure("image", &err),
        }
    }

    None
}

async fn upload_data_url(
    store: &dyn SignatureStore,
    name: &str,
    content_type: &str,
    payload: &str,
    prefix: &str,
) -> Result<String, SignatureError> {
    let encoded = payload.strip_prefix(prefix).unwrap_or(payload);
    upload_decoded(store, name, content_type, encoded).await
}

async fn upload_decoded(
    store: &dyn SignatureStore,
    name: &str,
    content_type: &str,
    encoded: &str,
) -> Result<String, SignatureError> {
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|err| SignatureError::Decode(err.to_string()))?;
    store.upload(name, content_type, bytes).await
}

fn strip_image_prefix(payload: &str) -> &str {
    for prefix in [
        "data:image/png;base64,",
        "data:image/jpeg;base64,",
        "data:image/jpg;base64,",
    ] {
        if let Some(rest) = payload.strip_prefix(prefix) {
            return rest;
        }
    }
    payload
}

fn log_upload_failure(artifact: &'static str, err: &SignatureError) {
    match err {
        SignatureError::Disabled => {
            tracing::debug!(artifact, "signature storage disabled, skipping upload");
        }
        _ => {
            tracing::warn!(artifact, error = %err, "signature upload failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn code() -> AccessCode {
        "ARTEN-1234".parse().expect("code")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).single().expect("t")
    }

    fn png_data_url() -> String {
        format!("data:image/png;base64,{}", BASE64.encode(b"png-bytes"))
    }

    fn pdf_data_url() -> String {
        format!("data:application/pdf;base64,{}", BASE64.encode(b"pdf-bytes"))
    }

    #[tokio::test]
    async fn prefers_the_signed_pdf() {
        let store = RecordingSignatureStore::new();
        let url = store_artifacts(
            &store,
            &code(),
            now(),
            Some(&pdf_data_url()),
            Some(&png_data_url()),
        )
        .await;
        let uploads = store.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].0.starts_with("firmato_ARTEN-1234_"));
        assert_eq!(uploads[0].1, "application/pdf");
        assert_eq!(uploads[0].2, b"pdf-bytes".len());
        assert!(url.expect("url").contains("firmato_ARTEN-1234_"));
    }

    #[tokio::test]
    async fn falls_back_to_the_image_when_pdf_is_corrupt() {
        let store = RecordingSignatureStore::new();
        let url = store_artifacts(
            &store,
            &code(),
            now(),
            Some("data:application/pdf;base64,%%%not-base64%%%"),
            Some(&png_data_url()),
        )
        .await;
        let uploads = store.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1, "image/png");
        assert!(url.is_some());
    }

    #[tokio::test]
    async fn missing_artifacts_yield_no_reference() {
        let store = RecordingSignatureStore::new();
        let url = store_artifacts(&store, &code(), now(), None, None).await;
        assert!(url.is_none());
        assert!(store.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn disabled_store_degrades_quietly() {
        let url = store_artifacts(
            &DisabledSignatureStore,
            &code(),
            now(),
            Some(&pdf_data_url()),
            Some(&png_data_url()),
        )
        .await;
        assert!(url.is_none());
    }
}
