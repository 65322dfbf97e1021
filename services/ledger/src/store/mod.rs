use crate::day::DayWindow;
use crate::model::{NewReferee, NewVisit, Referee, Visit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use varco_common::ids::{RefereeId, VisitId};
use varco_common::AccessCode;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for the ledger. All mutation is delegated to the backend's
/// own atomic operations; handlers hold no locks of their own.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    async fn list_referees(&self) -> StoreResult<Vec<Referee>>;
    async fn create_referee(&self, referee: NewReferee) -> StoreResult<Referee>;
    /// Soft-delete: flips `active` to false. `NotFound` when the id is unknown
    /// or the referee was already deactivated.
    async fn deactivate_referee(&self, id: &RefereeId) -> StoreResult<()>;

    /// Exact-match collision probe used by code issuance. Deliberately not
    /// scoped to a date window: a historical code must keep re-admitting its
    /// visitor, so it is a real collision for a fresh visit.
    async fn code_exists(&self, code: &AccessCode) -> StoreResult<bool>;
    async fn insert_visit(&self, visit: NewVisit) -> StoreResult<Visit>;
    /// Conditional close: sets `ora_uscita` only where it is still null, so
    /// two concurrent check-outs resolve to exactly one success. `NotFound`
    /// covers both an unknown id and an already-exited visit.
    async fn close_visit(&self, id: &VisitId, ora_uscita: DateTime<Utc>) -> StoreResult<Visit>;
    /// Most recent visit carrying this code, by entry timestamp.
    async fn latest_visit_by_code(&self, code: &AccessCode) -> StoreResult<Option<Visit>>;
    /// All visits entered inside the window, most recent entry first.
    async fn visits_entered_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>>;
    /// Visits entered inside the window with no recorded exit, oldest first.
    async fn still_present_in(&self, window: &DayWindow) -> StoreResult<Vec<Visit>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
