//! Role checks shared by the services.

use crate::domain::{Actor, Club, League};
use crate::errors::domain::DomainError;

pub(crate) fn require_admin(
    league: &League,
    actor: &Actor,
    action: &str,
) -> Result<(), DomainError> {
    if league.is_admin(&actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!("Only a league admin can {action}")))
    }
}

pub(crate) fn require_owner(
    league: &League,
    actor: &Actor,
    action: &str,
) -> Result<(), DomainError> {
    if league.is_owner(&actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!("Only the league owner can {action}")))
    }
}

pub(crate) fn require_manager(club: &Club, actor: &Actor, action: &str) -> Result<(), DomainError> {
    if club.manager_id == actor.id {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!("Only the club manager can {action}")))
    }
}

pub(crate) fn require_manager_or_admin(
    league: &League,
    club: &Club,
    actor: &Actor,
    action: &str,
) -> Result<(), DomainError> {
    if club.manager_id == actor.id || league.is_admin(&actor.id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "Only the club manager or a league admin can {action}"
        )))
    }
}
