//! User-directed evolution links between powers.

use std::sync::Arc;

use questbound_domain::{
    progression::{link_evolution, unlink_evolution, EvolutionLink},
    DomainError, Power, PowerId,
};
use serde::Deserialize;

use crate::entities::Powers;
use crate::infrastructure::ports::WriteBatch;
use crate::infrastructure::user_locks::UserLocks;

use super::PowerError;

#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionLinkRequest {
    pub child_power_id: PowerId,
}

pub struct LinkEvolution {
    links: EvolutionLinks,
}

impl LinkEvolution {
    pub fn new(powers: Arc<Powers>, locks: Arc<UserLocks>) -> Self {
        Self {
            links: EvolutionLinks { powers, locks },
        }
    }

    /// Make the requested child an evolution of `parent_id`. Returns every
    /// power whose links changed.
    pub async fn execute(
        &self,
        parent_id: PowerId,
        request: EvolutionLinkRequest,
    ) -> Result<Vec<Power>, PowerError> {
        self.links
            .apply(parent_id, request.child_power_id, "Linked power evolution", link_evolution)
            .await
    }
}

pub struct UnlinkEvolution {
    links: EvolutionLinks,
}

impl UnlinkEvolution {
    pub fn new(powers: Arc<Powers>, locks: Arc<UserLocks>) -> Self {
        Self {
            links: EvolutionLinks { powers, locks },
        }
    }

    pub async fn execute(
        &self,
        parent_id: PowerId,
        request: EvolutionLinkRequest,
    ) -> Result<Vec<Power>, PowerError> {
        self.links
            .apply(parent_id, request.child_power_id, "Unlinked power evolution", unlink_evolution)
            .await
    }
}

struct EvolutionLinks {
    powers: Arc<Powers>,
    locks: Arc<UserLocks>,
}

impl EvolutionLinks {
    async fn apply(
        &self,
        parent_id: PowerId,
        child_id: PowerId,
        message: &'static str,
        rule: fn(&[Power], PowerId, PowerId) -> Result<EvolutionLink, DomainError>,
    ) -> Result<Vec<Power>, PowerError> {
        let owner = self.powers.require(parent_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        let mut powers = self.powers.list_for_user(owner).await?;
        if !powers.iter().any(|p| p.id == child_id) {
            // Let the rule see a foreign child so it reports the ownership clash.
            if let Some(foreign) = self.powers.get(child_id).await? {
                powers.push(foreign);
            }
        }

        let link = match rule(&powers, parent_id, child_id) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(
                    user_id = %owner,
                    parent_id = %parent_id,
                    child_id = %child_id,
                    error = %e,
                    "Evolution link rejected"
                );
                return Err(e.into());
            }
        };

        let mut batch = WriteBatch::new();
        for power in &link.changed {
            Powers::stage(&mut batch, power)?;
        }
        self.powers.commit(batch).await?;

        tracing::info!(user_id = %owner, parent_id = %parent_id, child_id = %child_id, "{}", message);
        Ok(link.changed)
    }
}
