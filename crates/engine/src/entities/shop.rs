//! Shop catalogue lookups.

use questbound_domain::ShopItem;

use super::records::Records;
use crate::infrastructure::ports::{RecordFilter, RepoError};

impl Records<ShopItem> {
    /// The power entry named `name`, used to build next-tier powers.
    pub async fn find_power_named(&self, name: &str) -> Result<Option<ShopItem>, RepoError> {
        Ok(self
            .find(&RecordFilter::field("name", name))
            .await?
            .into_iter()
            .find(|item| item.is_power))
    }
}
