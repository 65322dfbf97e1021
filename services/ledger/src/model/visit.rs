//! Visit record definitions.
//!
//! # Purpose
//! Defines the persisted visit record and the creation payload the store
//! accepts. Wire names keep the register's historical Italian column names so
//! existing console installations and exports keep working.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use varco_common::ids::VisitId;
use varco_common::AccessCode;

/// One physical entry event. `ora_uscita` stays null while the visitor is on
/// premises and transitions exactly once at check-out.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Visit {
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

impl Visit {
    pub fn is_present(&self) -> bool {
        self.ora_uscita.is_none()
    }
}

/// Fields the ledger supplies when inserting a visit. The store assigns the
/// identifier and echoes the stored row back.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub nome: String,
    pub ditta: String,
    pub email: String,
    pub referente: Option<String>,
    pub zona: Option<String>,
    pub codice_univoco: AccessCode,
    pub ora_entrata: DateTime<Utc>,
    pub firma_url: Option<String>,
    pub privacy_accettata: bool,
}

impl NewVisit {
    /// Build the re-entry copy of an earlier visit: same identity fields and
    /// code, fresh entry timestamp, consent carried over as accepted.
    pub fn reentry_of(original: &Visit, ora_entrata: DateTime<Utc>) -> Self {
        Self {
            nome: original.nome.clone(),
            ditta: original.ditta.clone(),
            email: original.email.clone(),
            referente: original.referente.clone(),
            zona: original.zona.clone(),
            codice_univoco: original.codice_univoco.clone(),
            ora_entrata,
            firma_url: original.firma_url.clone(),
            privacy_accettata: true,
        }
    }
}
