//! Roster swap: re-seat one club onto another club's slot.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use super::authz::require_admin;
use crate::domain::{Actor, Club, ClubId, LeagueId};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::infra::analytics::Analytics;
use crate::ledger::{ChangeSet, MembershipLedger};

pub struct RosterSwap {
    ledger: Arc<MembershipLedger>,
    analytics: Arc<dyn Analytics>,
}

impl RosterSwap {
    pub fn new(ledger: Arc<MembershipLedger>, analytics: Arc<dyn Analytics>) -> Self {
        Self { ledger, analytics }
    }

    /// Move `incoming`'s name, manager and roster onto `slot`, keeping the
    /// slot's id and standings row, and delete `incoming`.
    ///
    /// Returns the club now stored at the slot.
    pub async fn swap_clubs(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        slot_id: &ClubId,
        incoming_id: &ClubId,
    ) -> Result<Club, DomainError> {
        if slot_id == incoming_id {
            return Err(DomainError::validation(
                ValidationKind::Other("Swap".into()),
                "A club cannot be swapped with itself",
            ));
        }

        let club = self
            .ledger
            .retrying("swap_clubs", move || async move {
                let league = self.ledger.league(league_id).await?;
                require_admin(&league, actor, "swap clubs")?;
                let slot = self.ledger.club(league_id, slot_id).await?;
                let incoming = self.ledger.club(league_id, incoming_id).await?;

                let slot_members = self.ledger.users(slot.roster.keys()).await?;
                let incoming_members = self.ledger.users(incoming.roster.keys()).await?;

                let mut changes = ChangeSet::new();
                let combined = changes.swap_clubs(
                    &league,
                    &slot,
                    &incoming,
                    &slot_members,
                    &incoming_members,
                )?;
                self.ledger.commit(changes).await?;
                Ok(combined)
            })
            .await?;

        info!(
            league_id = %league_id,
            slot = %slot_id,
            incoming = %incoming_id,
            members = club.roster.len(),
            "clubs swapped"
        );
        self.analytics.log_event(
            "swap_clubs",
            json!({ "leagueId": league_id, "slotClubId": slot_id, "incomingClubId": incoming_id }),
        );
        Ok(club)
    }
}
