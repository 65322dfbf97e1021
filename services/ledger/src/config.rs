use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

// Ledger configuration sourced from environment variables, with an optional
// YAML override file for containerized deployments.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub smtp: Option<SmtpConfig>,
    /// Sender mailbox, e.g. `"ArTen Registro Visitatori" <service@arten.it>`.
    pub mail_from: String,
    /// Operator address the presence sweep reports to.
    pub admin_email: String,
    pub cron_secret: Option<String>,
    pub bucket: Option<BucketConfig>,
    /// Fixed timezone used for calendar-day windows and display times.
    pub display_tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub base_url: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Deserialize)]
struct LedgerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    admin_email: Option<String>,
    timezone: Option<String>,
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("VARCO_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse VARCO_BIND")?;
        let metrics_bind = std::env::var("VARCO_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse VARCO_METRICS_BIND")?;

        let storage = parse_storage(
            &std::env::var("VARCO_STORAGE").unwrap_or_else(|_| "memory".to_string()),
        )?;
        let postgres = std::env::var("DATABASE_URL").ok().map(|url| {
            Ok::<_, anyhow::Error>(PostgresConfig {
                url,
                max_connections: std::env::var("VARCO_PG_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .with_context(|| "parse VARCO_PG_MAX_CONNECTIONS")?,
                acquire_timeout_ms: std::env::var("VARCO_PG_ACQUIRE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .with_context(|| "parse VARCO_PG_ACQUIRE_TIMEOUT_MS")?,
            })
        });
        let postgres = postgres.transpose()?;

        // SMTP is optional: without a password the mailer degrades to a no-op
        // and check-ins still work.
        let smtp = std::env::var("SMTP_PASS").ok().map(|pass| {
            Ok::<_, anyhow::Error>(SmtpConfig {
                host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtps.aruba.it".to_string()),
                port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "465".to_string())
                    .parse()
                    .with_context(|| "parse SMTP_PORT")?,
                user: std::env::var("SMTP_USER")
                    .unwrap_or_else(|_| "service@arten.it".to_string()),
                pass,
            })
        });
        let smtp = smtp.transpose()?;

        let mail_from = std::env::var("VARCO_MAIL_FROM")
            .unwrap_or_else(|_| "\"ArTen Registro Visitatori\" <service@arten.it>".to_string());
        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "service@arten.it".to_string());
        let cron_secret = std::env::var("CRON_SECRET").ok();

        let bucket = std::env::var("VARCO_BUCKET_KEY").ok().map(|key| {
            Ok::<_, anyhow::Error>(BucketConfig {
                base_url: std::env::var("VARCO_BUCKET_URL")
                    .with_context(|| "VARCO_BUCKET_URL required when VARCO_BUCKET_KEY is set")?,
                key,
                bucket: std::env::var("VARCO_BUCKET_NAME")
                    .unwrap_or_else(|_| "signatures".to_string()),
            })
        });
        let bucket = bucket.transpose()?;

        let display_tz = parse_timezone(
            &std::env::var("VARCO_TZ").unwrap_or_else(|_| "Europe/Rome".to_string()),
        )?;

        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            smtp,
            mail_from,
            admin_email,
            cron_secret,
            bucket,
            display_tz,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("VARCO_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read VARCO_CONFIG: {path}"))?;
            let override_cfg: LedgerConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse ledger config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.storage {
                config.storage = parse_storage(&value)?;
            }
            if let Some(value) = override_cfg.admin_email {
                config.admin_email = value;
            }
            if let Some(value) = override_cfg.timezone {
                config.display_tz = parse_timezone(&value)?;
            }
        }
        Ok(config)
    }
}

fn parse_storage(value: &str) -> Result<StorageBackend> {
    match value {
        "memory" => Ok(StorageBackend::Memory),
        "postgres" => Ok(StorageBackend::Postgres),
        other => bail!("unknown storage backend: {other}"),
    }
}

fn parse_timezone(value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|err| anyhow::anyhow!("parse timezone {value}: {err}"))
}
