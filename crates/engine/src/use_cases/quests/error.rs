//! Quest operation errors.

use questbound_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Errors from quest CRUD, completion and deadline checks.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}
