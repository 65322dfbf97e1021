//! Outbound notification seam.
//!
//! # Purpose
//! Handlers talk to a `Mailer` trait object; the SMTP transport, the no-op
//! fallback for unconfigured deployments, and the recording fake used by
//! tests all live behind it. Courtesy confirmations (entry/exit/re-entry) are
//! spawned fire-and-forget: the visit row is the source of truth and a failed
//! send is logged and counted, never surfaced to the visitor.
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod smtp;
pub mod templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid message: {0}")]
    Message(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Stand-in when no SMTP credentials are configured. Sends succeed silently
/// so local development exercises the full check-in path.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        tracing::debug!(to = %email.to, subject = %email.subject, "mailer disabled, dropping email");
        Ok(())
    }
}

/// Test double that records every message and can be told to fail.
pub struct RecordingMailer {
    sent: tokio::sync::Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: tokio::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: tokio::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("recording mailer set to fail".into()));
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Fire-and-forget delivery for courtesy confirmations. The handler's
/// response does not wait on the relay; the outcome lands in logs and
/// metrics only.
pub fn spawn_courtesy_send(mailer: Arc<dyn Mailer>, email: OutboundEmail, kind: &'static str) {
    tokio::spawn(async move {
        let to = email.to.clone();
        match mailer.send(email).await {
            Ok(()) => {
                metrics::counter!("varco_emails_sent_total", "kind" => kind).increment(1);
            }
            Err(err) => {
                metrics::counter!("varco_emails_failed_total", "kind" => kind).increment(1);
                tracing::warn!(error = %err, kind, to = %to, "courtesy email failed");
            }
        }
    });
}
