//! Ledger data model module.
//!
//! # Purpose
//! Re-exports the visit and referee records shared by the API and store
//! layers.
mod referee;
mod visit;

pub use referee::{NewReferee, Referee};
pub use visit::{NewVisit, Visit};
