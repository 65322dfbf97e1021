//! In-memory implementation of the visitor store.
//!
//! # Purpose
//! Implements `VisitorStore` entirely in memory using `HashMap`s guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - kiosk deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: write locks serialize mutations, so the
//!   conditional check-out transition behaves exactly like the SQL predicate
//!   in the Postgres backend — two racing check-outs see one success and one
//!   not-found.
use super::{StoreError, StoreResult, VisitorStore};
use crate::day::DayWindow;
use crate::model::{NewReferee, NewVisit, Referee, Visit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use varco_common::ids::{RefereeId, VisitId};
use varco_common::AccessCode;

pub struct InMemoryStore {
    /// Authoritative visit rows keyed by id. Never removed, matching the
    /// ledger's append-only lifecycle.
    visits: Arc<RwLock<HashMap<VisitId, Visit>>>,
    /// Referee directory, soft-deleted rows included.
    referees: Arc<RwLock<HashMap<RefereeId, Referee>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            visits: Arc::new(RwLock::new(HashMap::new())),
            referees: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisitorStore for InMemoryStore {
    async fn list_referees(&self) -> StoreResult<Vec<Referee>> {
        let mut items: Vec<Referee> = self
            .referees
            .read()
            .await
            .values()
            .filter(|referee| referee.active)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(items)
    }

    async fn create_referee(&self, referee: NewReferee) -> StoreResult<Referee> {
        let created = Referee {
            id: RefereeId::new(),
            nome: referee.nome,
            email: referee.email,
            active: true,
        };
        self.referees
            .write()
            .await
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn deactivate_referee(&self, id: &RefereeId) -> StoreResult<()> {
        let mut referees = self.referees.write().await;
        match referees.get_mut(id) {
            Some(referee) if referee.active => {
                referee.active = false;
                Ok(())
            }
            _ => Err(StoreError::NotFound("referee".into())),
        }
    }

    async fn code_exists(&self, code: &AccessCode) -> StoreResult<bool> {
        Ok(self
            .visits
            .read()
            .await
            .values()
            .any(|visit| visit.codice_univoco == *code))
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
        let mut visits = self.visits.write().await;
        visits.insert(created.id, created.clone());
        metrics::gauge!("varco_visits_total").set(visits.len() as f64);
        Ok(created)
    }

    async fn close_visit(&self, id: &VisitId, ora_uscita: DateTime<Utc>) -> StoreResult<Visit> {
        // The write lock makes check-and-set atomic; only a still-open visit
        // transitions, mirroring `WHERE ora_uscita IS NULL` in Postgres.
        let mut visits = self.visits.write().await;
        match visits.get_mut(id) {
            Some(visit) if visit.ora_uscita.is_none() => {
                visit.ora_uscita = Some(ora_uscita);
                Ok(visit.clone())
            }
            _ => Err(StoreError::NotFound("visit".into())),
        }
    }

    async fn latest_visit_by_code(&self, code: &AccessCode) -> StoreResult<Option<Visit>> {
        Ok(self
            .visits
            .read()
            .await
            .values()
            .filter(|visit| visit.codice_univoco == *code)
            .max_by_key(|visit| visit.ora_entrata)
            .cloned())
    }

    async fn visits_entered_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>> {
        let mut items: Vec<Visit> = self
            .visits
            .read()
            .await
            .values()
            .filter(|visit| window.contains(visit.ora_entrata))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.ora_entrata.cmp(&a.ora_entrata));
        Ok(items)
    }

    async fn still_present_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>> {
        let mut items: Vec<Visit> = self
            .visits
            .read()
            .await
            .values()
            .filter(|visit| visit.is_present() && window.contains(visit.ora_entrata))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.ora_entrata.cmp(&b.ora_entrata));
        Ok(items)
    }

    async fn health_check(&self) -> StoreResult<()> {
        // In-memory backend is always "healthy" if the process is running.
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
