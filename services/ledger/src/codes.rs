//! Re-entry code issuance.
//!
//! # Purpose
//! Allocates a fresh `ARTEN-XXXX` code for a check-in: draw a random
//! candidate, probe the store for an exact-match collision, retry up to a
//! fixed bound. Exhausting the bound is an explicit error surfaced to the
//! caller, never a silent fallback to a possibly-colliding candidate.
use crate::store::{StoreError, VisitorStore};
use thiserror::Error;
use varco_common::AccessCode;

/// With 9000 candidate codes, ten draws only collide repeatedly when the
/// register is already saturated; at that point refusing is the honest answer.
pub const MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum CodeIssueError {
    #[error("no free access code after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn issue_code(store: &dyn VisitorStore) -> Result<AccessCode, CodeIssueError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = AccessCode::generate();
        if !store.code_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(CodeIssueError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}
