//! Referee (internal contact) directory records.
use serde::Serialize;
use varco_common::ids::RefereeId;

/// Directory entry a visitor can be assigned to. Removal is a soft-delete:
/// `active` flips false and the row stays, because past visits reference the
/// referee by name.
#[derive(Debug, Serialize, Clone)]
pub struct Referee {
    pub id: RefereeId,
    pub nome: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewReferee {
    pub nome: String,
    pub email: Option<String>,
}
