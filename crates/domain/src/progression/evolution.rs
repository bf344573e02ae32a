//! User-directed parent/child links between powers.

use crate::{DomainError, Power, PowerId};

/// Powers whose link fields changed. Every record here must be written back.
#[derive(Debug, Clone, Default)]
pub struct EvolutionLink {
    pub changed: Vec<Power>,
}

/// Make `child_id` an evolution of `parent_id`.
///
/// `powers` are all powers owned by the parent's user. A child has at most one
/// parent, so relinking detaches it from its previous parent first.
pub fn link_evolution(
    powers: &[Power],
    parent_id: PowerId,
    child_id: PowerId,
) -> Result<EvolutionLink, DomainError> {
    if parent_id == child_id {
        return Err(DomainError::invalid_state("A power cannot evolve from itself"));
    }
    let parent = find(powers, parent_id)?;
    let child = find(powers, child_id)?;
    if parent.user_id != child.user_id {
        return Err(DomainError::invalid_state(
            "Powers belong to different users",
        ));
    }
    if is_ancestor(powers, child_id, parent_id) {
        return Err(DomainError::invalid_state(
            "Link would create an evolution cycle",
        ));
    }
    if child.evolved_from == Some(parent_id) {
        return Ok(EvolutionLink::default());
    }

    let mut changed = Vec::new();
    if let Some(previous) = child.evolved_from {
        if let Ok(previous) = find(powers, previous) {
            let mut previous = previous.clone();
            previous.evolved_abilities.retain(|id| *id != child_id);
            changed.push(previous);
        }
    }

    let mut parent = parent.clone();
    if !parent.evolved_abilities.contains(&child_id) {
        parent.evolved_abilities.push(child_id);
    }
    let mut child = child.clone();
    child.evolved_from = Some(parent_id);

    changed.push(parent);
    changed.push(child);
    Ok(EvolutionLink { changed })
}

/// Remove the link between `parent_id` and `child_id`.
pub fn unlink_evolution(
    powers: &[Power],
    parent_id: PowerId,
    child_id: PowerId,
) -> Result<EvolutionLink, DomainError> {
    let parent = find(powers, parent_id)?;
    let child = find(powers, child_id)?;
    if child.evolved_from != Some(parent_id) && !parent.evolved_abilities.contains(&child_id) {
        return Err(DomainError::invalid_state(
            "Powers are not linked by evolution",
        ));
    }

    let mut parent = parent.clone();
    parent.evolved_abilities.retain(|id| *id != child_id);
    let mut child = child.clone();
    child.evolved_from = None;

    Ok(EvolutionLink {
        changed: vec![parent, child],
    })
}

fn find(powers: &[Power], id: PowerId) -> Result<&Power, DomainError> {
    powers
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| DomainError::not_found("Power", id))
}

/// Whether `ancestor` appears on the parent chain of `power` (or is `power`).
fn is_ancestor(powers: &[Power], ancestor: PowerId, power: PowerId) -> bool {
    let mut current = Some(power);
    let mut steps = 0;
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        // A corrupt chain must not spin forever.
        steps += 1;
        if steps > powers.len() {
            return true;
        }
        current = powers
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.evolved_from);
    }
    false
}
