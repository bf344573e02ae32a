//! User lookups and revision-guarded user writes.

use questbound_domain::User;

use super::records::Records;
use crate::infrastructure::ports::{Collection, RecordFilter, RepoError, WriteBatch};

impl Records<User> {
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .find(&RecordFilter::field("username", username))
            .await?
            .into_iter()
            .next())
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<User>, RepoError> {
        self.find(&RecordFilter::all().limit(limit)).await
    }

    /// Queue `user` for writing, guarded on the revision it was read at.
    ///
    /// Returns the record as it will be stored, with its revision bumped.
    pub fn stage_guarded(batch: &mut WriteBatch, user: &User) -> Result<User, RepoError> {
        let mut next = user.clone();
        next.revision = user.revision + 1;
        batch.guard_revision(user.id, user.revision);
        batch.put(Collection::Users, next.id, &next)?;
        Ok(next)
    }
}
