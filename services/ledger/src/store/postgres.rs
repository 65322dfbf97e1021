//! Postgres-backed implementation of the visitor store.
//!
//! # What this module is
//! Implements the `VisitorStore` trait using Postgres (via `sqlx`) as the
//! durable register. The `visitors` table is append-only except for the
//! single `ora_uscita` transition; the `referees` table is a small directory
//! with a soft-delete flag.
//!
//! # Key invariants
//! - `insert_visit` never touches existing rows.
//! - `close_visit` is a conditional `UPDATE ... WHERE ora_uscita IS NULL`, so
//!   the database arbitrates racing check-outs: exactly one statement reports
//!   an updated row.
//! - Day queries receive UTC bounds computed by the caller; the database does
//!   no timezone arithmetic.
//!
//! # Operational notes
//! - Migrations run at startup via `sqlx::migrate!("./migrations")` so
//!   handlers can assume the schema exists.
//! - Pool timeouts are explicit because hanging on a dead database is worse
//!   than failing a request fast.
//! - Database URLs may contain credentials; they are never logged.
use super::{StoreError, StoreResult, VisitorStore};
use crate::config::PostgresConfig;
use crate::day::DayWindow;
use crate::model::{NewReferee, NewVisit, Referee, Visit};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;
use varco_common::ids::{RefereeId, VisitId};
use varco_common::AccessCode;

pub struct PostgresStore {
    pool: PgPool,
}

/// Row shape for the `visitors` table.
///
/// DB-facing structs stay separate from the domain types so schema details
/// (column names, the code stored as plain text) remain localized here and
/// parsing into domain values happens in exactly one place.
#[derive(Debug, Clone, FromRow)]
struct DbVisit {
    id: Uuid,
    nome: String,
    ditta: String,
    email: String,
    referente: Option<String>,
    zona: Option<String>,
    codice_univoco: String,
    ora_entrata: DateTime<Utc>,
    ora_uscita: Option<DateTime<Utc>>,
    firma_url: Option<String>,
    privacy_accettata: bool,
}

/// Row shape for the `referees` table.
#[derive(Debug, Clone, FromRow)]
struct DbReferee {
    id: Uuid,
    nome: String,
    email: Option<String>,
    active: bool,
}

const VISIT_COLUMNS: &str = "id, nome, ditta, email, referente, zona, codice_univoco, \
     ora_entrata, ora_uscita, firma_url, privacy_accettata";

impl PostgresStore {
    /// Connect to Postgres and run migrations.
    ///
    /// # Errors
    /// - Connection, pool setup, or migration failures.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        // `acquire_timeout` bounds how long a request waits for a pooled
        // connection before failing fast; `max_connections` protects the
        // database from overload.
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl VisitorStore for PostgresStore {
    async fn list_referees(&self) -> StoreResult<Vec<Referee>> {
        let rows = sqlx::query_as::<_, DbReferee>(
            "SELECT id, nome, email, active FROM referees WHERE active ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(referee_from_db).collect())
    }

    async fn create_referee(&self, referee: NewReferee) -> StoreResult<Referee> {
        let created = Referee {
            id: RefereeId::new(),
            nome: referee.nome,
            email: referee.email,
            active: true,
        };
        sqlx::query("INSERT INTO referees (id, nome, email, active) VALUES ($1, $2, $3, TRUE)")
            .bind(created.id.as_uuid())
            .bind(&created.nome)
            .bind(&created.email)
            .execute(&self.pool)
            .await?;
        Ok(created)
    }

    async fn deactivate_referee(&self, id: &RefereeId) -> StoreResult<()> {
        let result = sqlx::query("UPDATE referees SET active = FALSE WHERE id = $1 AND active")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("referee".into()));
        }
        Ok(())
    }

    async fn code_exists(&self, code: &AccessCode) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM visitors WHERE codice_univoco = $1)",
        )
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_visit(&self, visit: NewVisit) -> StoreResult<Visit> {
        let created = Visit {
            id: VisitId::new(),
            nome: visit.nome,
            ditta: visit.ditta,
            email: visit.email,
            referente: visit.referente,
            zona: visit.zona,
            codice_univoco: visit.codice_univoco,
            ora_entrata: visit.ora_entrata,
            ora_uscita: None,
            firma_url: visit.firma_url,
            privacy_accettata: visit.privacy_accettata,
        };
        sqlx::query(
            "INSERT INTO visitors \
             (id, nome, ditta, email, referente, zona, codice_univoco, \
              ora_entrata, ora_uscita, firma_url, privacy_accettata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, $9, $10)",
        )
        .bind(created.id.as_uuid())
        .bind(&created.nome)
        .bind(&created.ditta)
        .bind(&created.email)
        .bind(&created.referente)
        .bind(&created.zona)
        .bind(created.codice_univoco.as_str())
        .bind(created.ora_entrata)
        .bind(&created.firma_url)
        .bind(created.privacy_accettata)
        .execute(&self.pool)
        .await?;
        Ok(created)
    }

    async fn close_visit(&self, id: &VisitId, ora_uscita: DateTime<Utc>) -> StoreResult<Visit> {
        // The `ora_uscita IS NULL` predicate makes the transition one-shot:
        // a second check-out (or a race) matches zero rows.
        let row = sqlx::query_as::<_, DbVisit>(&format!(
            "UPDATE visitors SET ora_uscita = $2 \
             WHERE id = $1 AND ora_uscita IS NULL \
             RETURNING {VISIT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(ora_uscita)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => visit_from_db(row),
            None => Err(StoreError::NotFound("visit".into())),
        }
    }

    async fn latest_visit_by_code(&self, code: &AccessCode) -> StoreResult<Option<Visit>> {
        let row = sqlx::query_as::<_, DbVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM visitors \
             WHERE codice_univoco = $1 ORDER BY ora_entrata DESC LIMIT 1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(visit_from_db).transpose()
    }

    async fn visits_entered_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>> {
        let rows = sqlx::query_as::<_, DbVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM visitors \
             WHERE ora_entrata >= $1 AND ora_entrata < $2 \
             ORDER BY ora_entrata DESC"
        ))
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(visit_from_db).collect()
    }

    async fn still_present_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>> {
        let rows = sqlx::query_as::<_, DbVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM visitors \
             WHERE ora_entrata >= $1 AND ora_entrata < $2 AND ora_uscita IS NULL \
             ORDER BY ora_entrata ASC"
        ))
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(visit_from_db).collect()
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn referee_from_db(row: DbReferee) -> Referee {
    Referee {
        id: RefereeId::from_uuid(row.id),
        nome: row.nome,
        email: row.email,
        active: row.active,
    }
}

fn visit_from_db(row: DbVisit) -> StoreResult<Visit> {
    // A malformed stored code means manual tampering or a schema drift; treat
    // it as an unexpected dependency failure rather than a not-found.
    let codice = AccessCode::parse(&row.codice_univoco)
        .map_err(|err| StoreError::Unexpected(anyhow!("stored code invalid: {err}")))?;
    Ok(Visit {
        id: VisitId::from_uuid(row.id),
        nome: row.nome,
        ditta: row.ditta,
        email: row.email,
        referente: row.referente,
        zona: row.zona,
        codice_univoco: codice,
        ora_entrata: row.ora_entrata,
        ora_uscita: row.ora_uscita,
        firma_url: row.firma_url,
        privacy_accettata: row.privacy_accettata,
    })
}
