use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};

use crate::domain::reconcile::MotmReconciliation;
use crate::domain::standings::{fold_result, StandingDelta};
use crate::domain::{
    Actor, Club, ClubId, League, LeagueId, MatchPlayer, MatchRecord, RosterEntry, Submission,
    UserId, UserRecord,
};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::{encode, paths, Versioned};
use crate::store::{DocPath, FieldOp, FieldPath, Precondition, Write, WriteBatch};

/// Personal stats a player records for a published match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStats {
    pub rating: u8,
    pub goals: u32,
    pub assists: u32,
}

/// Pending mutation of ledger records, committed as one batch.
///
/// The first write to a record carries the caller's precondition; later
/// writes to the same record in the batch see the earlier ones and are
/// unconditioned.
#[derive(Debug, Default)]
pub struct ChangeSet {
    batch: WriteBatch,
    touched: BTreeSet<DocPath>,
}

fn guard_of<T>(record: Option<&Versioned<T>>) -> Precondition {
    record.map_or(Precondition::Missing, |r| Precondition::Version(r.version))
}

fn pointer_field(league_id: &LeagueId, field: &str) -> FieldPath {
    FieldPath::of([paths::LEAGUES, league_id.as_str(), field])
}

fn roster_field(user: &UserId) -> FieldPath {
    FieldPath::of(["roster", user.as_str()])
}

fn encode_value<T: serde::Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::infra(InfraErrorKind::DataCorruption, e.to_string()))
}

/// Pointer fields that tie a user to one club of the league.
fn club_pointer_ops(
    league_id: &LeagueId,
    club_id: &ClubId,
    club_name: &str,
    manager: bool,
    accepted: bool,
) -> Vec<FieldOp> {
    vec![
        FieldOp::put(pointer_field(league_id, "clubId"), club_id.as_str()),
        FieldOp::put(pointer_field(league_id, "clubName"), club_name),
        FieldOp::put(pointer_field(league_id, "manager"), manager),
        FieldOp::put(pointer_field(league_id, "accepted"), accepted),
    ]
}

fn standing_ops(club_id: &ClubId, name: &str, delta: StandingDelta) -> Vec<FieldOp> {
    let f = |field: &str| FieldPath::of([club_id.as_str(), field]);
    let mut ops = vec![FieldOp::put(f("name"), name)];
    for (field, by) in [
        ("played", delta.played),
        ("won", delta.won),
        ("drawn", delta.drawn),
        ("lost", delta.lost),
        ("scored", delta.scored),
        ("conceded", delta.conceded),
        ("points", delta.points),
    ] {
        ops.push(FieldOp::Increment(f(field), by));
    }
    ops
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn records_touched(&self) -> usize {
        self.touched.len()
    }

    pub(crate) fn into_batch(self) -> WriteBatch {
        self.batch
    }

    #[cfg(test)]
    pub(crate) fn writes(&self) -> &[Write] {
        self.batch.writes()
    }

    fn push(&mut self, write: Write, guard: Precondition) {
        let write = if self.touched.insert(write.path.clone()) {
            write.when(guard)
        } else {
            write
        };
        self.batch.push(write);
    }

    /// Drop the user's tie to `club_id` in this league, if they still have one.
    ///
    /// League admins keep their pointer with the admin flags; everyone else
    /// loses the whole league entry.
    fn release_pointer(
        &mut self,
        league: &League,
        club_id: &ClubId,
        user: &Versioned<UserRecord>,
    ) -> Result<(), DomainError> {
        let still_here = user
            .pointer(&league.id)
            .is_some_and(|p| p.points_at(club_id));
        if !still_here {
            return Ok(());
        }

        let ops = if league.is_admin(&user.id) {
            ["clubId", "clubName", "manager", "accepted"]
                .into_iter()
                .map(|f| FieldOp::Remove(pointer_field(&league.id, f)))
                .collect()
        } else {
            vec![FieldOp::Remove(FieldPath::of([
                paths::LEAGUES,
                league.id.as_str(),
            ]))]
        };
        self.push(
            Write::update(paths::user(&user.id)?, ops),
            Precondition::Version(user.version),
        );
        Ok(())
    }

    /// New league plus the owner's admin pointer.
    pub fn open_league(
        &mut self,
        league: &League,
        owner: &Actor,
        owner_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::set(paths::league(&league.id)?, encode(league)?),
            Precondition::Missing,
        );
        self.push(
            Write::upsert(
                paths::user(&owner.id)?,
                vec![
                    FieldOp::put(FieldPath::field("username"), owner.username.as_str()),
                    FieldOp::put(pointer_field(&league.id, "admin"), true),
                    FieldOp::put(pointer_field(&league.id, "owner"), true),
                    FieldOp::put(pointer_field(&league.id, "manager"), false),
                ],
            ),
            guard_of(owner_record),
        );
        Ok(())
    }

    /// New club with its manager, the league index entry, the accepted
    /// count when the club starts accepted, and the manager's pointer.
    pub fn found_club(
        &mut self,
        league: &Versioned<League>,
        club: &Club,
        manager: &Actor,
        manager_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::set(paths::club(&league.id, &club.id)?, encode(club)?),
            Precondition::Missing,
        );

        let mut league_ops = vec![FieldOp::put(
            FieldPath::of(["clubIndex", club.id.as_str()]),
            club.name.as_str(),
        )];
        if club.accepted {
            league_ops.push(FieldOp::Increment(FieldPath::field("acceptedClubs"), 1));
        }
        self.push(
            Write::update(paths::league(&league.id)?, league_ops),
            Precondition::Version(league.version),
        );

        let mut user_ops = vec![FieldOp::put(
            FieldPath::field("username"),
            manager.username.as_str(),
        )];
        user_ops.extend(club_pointer_ops(
            &league.id,
            &club.id,
            &club.name,
            true,
            club.accepted,
        ));
        self.push(
            Write::upsert(paths::user(&manager.id)?, user_ops),
            guard_of(manager_record),
        );
        Ok(())
    }

    /// Remove a club and every trace of it: index entry, accepted count, and
    /// the pointers of `members` that still reference it.
    pub fn dissolve_club(
        &mut self,
        league: &Versioned<League>,
        club: &Versioned<Club>,
        members: &[Versioned<UserRecord>],
    ) -> Result<(), DomainError> {
        self.push(
            Write::delete(paths::club(&league.id, &club.id)?),
            Precondition::Version(club.version),
        );

        let mut league_ops = vec![FieldOp::Remove(FieldPath::of([
            "clubIndex",
            club.id.as_str(),
        ]))];
        if club.accepted {
            league_ops.push(FieldOp::Increment(FieldPath::field("acceptedClubs"), -1));
        }
        self.push(
            Write::update(paths::league(&league.id)?, league_ops),
            Precondition::Version(league.version),
        );

        for member in members {
            self.release_pointer(league, &club.id, member)?;
        }
        Ok(())
    }

    /// Pending club-join request: roster entry plus a pending pointer.
    pub fn add_pending_member(
        &mut self,
        club: &Versioned<Club>,
        user: &Actor,
        user_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::club(&club.league_id, &club.id)?,
                vec![FieldOp::put(
                    roster_field(&user.id),
                    json!({"accepted": false, "username": user.username}),
                )],
            ),
            Precondition::Version(club.version),
        );

        let mut ops = vec![FieldOp::put(
            FieldPath::field("username"),
            user.username.as_str(),
        )];
        ops.extend(club_pointer_ops(
            &club.league_id,
            &club.id,
            &club.name,
            false,
            false,
        ));
        self.push(Write::upsert(paths::user(&user.id)?, ops), guard_of(user_record));
        Ok(())
    }

    /// Flip a pending roster entry and its pointer to accepted.
    pub fn accept_member(
        &mut self,
        club: &Versioned<Club>,
        user: &UserId,
        user_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::club(&club.league_id, &club.id)?,
                vec![FieldOp::put(
                    FieldPath::of(["roster", user.as_str(), "accepted"]),
                    true,
                )],
            ),
            Precondition::Version(club.version),
        );
        self.push(
            Write::upsert(
                paths::user(user)?,
                club_pointer_ops(&club.league_id, &club.id, &club.name, false, true),
            ),
            guard_of(user_record),
        );
        Ok(())
    }

    /// Remove one roster entry and release that user's pointer.
    pub fn drop_member(
        &mut self,
        league: &League,
        club: &Versioned<Club>,
        user: &UserId,
        user_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::club(&league.id, &club.id)?,
                vec![FieldOp::Remove(roster_field(user))],
            ),
            Precondition::Version(club.version),
        );
        if let Some(record) = user_record {
            self.release_pointer(league, &club.id, record)?;
        }
        Ok(())
    }

    /// Move an accepted player between two clubs of one league.
    pub fn move_member(
        &mut self,
        from: &Versioned<Club>,
        to: &Versioned<Club>,
        user: &UserId,
        entry: &RosterEntry,
        user_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::club(&from.league_id, &from.id)?,
                vec![FieldOp::Remove(roster_field(user))],
            ),
            Precondition::Version(from.version),
        );
        self.push(
            Write::update(
                paths::club(&to.league_id, &to.id)?,
                vec![FieldOp::put(
                    roster_field(user),
                    json!({"accepted": true, "username": entry.username}),
                )],
            ),
            Precondition::Version(to.version),
        );
        self.push(
            Write::upsert(
                paths::user(user)?,
                club_pointer_ops(&to.league_id, &to.id, &to.name, false, true),
            ),
            guard_of(user_record),
        );
        Ok(())
    }

    /// Accept a pending club into the league.
    pub fn admit_club(
        &mut self,
        league: &Versioned<League>,
        club: &Versioned<Club>,
        manager_record: Option<&Versioned<UserRecord>>,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::club(&league.id, &club.id)?,
                vec![FieldOp::put(FieldPath::field("accepted"), true)],
            ),
            Precondition::Version(club.version),
        );
        self.push(
            Write::update(
                paths::league(&league.id)?,
                vec![FieldOp::Increment(FieldPath::field("acceptedClubs"), 1)],
            ),
            Precondition::Version(league.version),
        );
        self.push(
            Write::upsert(
                paths::user(&club.manager_id)?,
                club_pointer_ops(&league.id, &club.id, &club.name, true, true),
            ),
            guard_of(manager_record),
        );
        Ok(())
    }

    /// Re-seat `incoming` onto `slot`: the slot keeps its id, creation time
    /// and standings row, and takes the incoming name, manager and roster.
    /// Returns the club as it will be stored at the slot.
    ///
    /// Incoming pointers mirror the roster entry, so pending incoming
    /// members stay pending at the slot instead of being accepted.
    pub fn swap_clubs(
        &mut self,
        league: &Versioned<League>,
        slot: &Versioned<Club>,
        incoming: &Versioned<Club>,
        slot_members: &[Versioned<UserRecord>],
        incoming_members: &[Versioned<UserRecord>],
    ) -> Result<Club, DomainError> {
        let combined = Club {
            id: slot.id.clone(),
            name: incoming.name.clone(),
            manager_id: incoming.manager_id.clone(),
            manager_username: incoming.manager_username.clone(),
            accepted: true,
            roster: incoming.roster.clone(),
            created: slot.created,
            league_id: slot.league_id.clone(),
        };
        self.push(
            Write::set(paths::club(&league.id, &slot.id)?, encode(&combined)?),
            Precondition::Version(slot.version),
        );
        self.push(
            Write::delete(paths::club(&league.id, &incoming.id)?),
            Precondition::Version(incoming.version),
        );
        self.push(
            Write::upsert(
                paths::standings(&league.id)?,
                vec![FieldOp::put(
                    FieldPath::of([slot.id.as_str(), "name"]),
                    incoming.name.as_str(),
                )],
            ),
            Precondition::None,
        );

        for member in slot_members {
            self.release_pointer(league, &slot.id, member)?;
        }
        for (user, entry) in &incoming.roster {
            let record = incoming_members.iter().find(|r| &r.id == user);
            self.push(
                Write::upsert(
                    paths::user(user)?,
                    club_pointer_ops(
                        &league.id,
                        &slot.id,
                        &incoming.name,
                        user == &incoming.manager_id,
                        entry.accepted,
                    ),
                ),
                guard_of(record),
            );
        }

        let mut league_ops = vec![
            FieldOp::put(
                FieldPath::of(["clubIndex", slot.id.as_str()]),
                incoming.name.as_str(),
            ),
            FieldOp::Remove(FieldPath::of(["clubIndex", incoming.id.as_str()])),
        ];
        let accepted_delta = 1 - i64::from(slot.accepted) - i64::from(incoming.accepted);
        if accepted_delta != 0 {
            league_ops.push(FieldOp::Increment(
                FieldPath::field("acceptedClubs"),
                accepted_delta,
            ));
        }
        self.push(
            Write::update(paths::league(&league.id)?, league_ops),
            Precondition::Version(league.version),
        );
        Ok(combined)
    }

    /// Store one club's score claim.
    pub fn record_submission(
        &mut self,
        record: &Versioned<MatchRecord>,
        club: &ClubId,
        submission: Submission,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![
                    FieldOp::put(
                        FieldPath::of(["submissions", club.as_str()]),
                        json!({"ownScore": submission.own_score, "oppScore": submission.opp_score}),
                    ),
                    FieldOp::Increment(FieldPath::field("submissionCount"), 1),
                ],
            ),
            Precondition::Version(record.version),
        );
        Ok(())
    }

    /// Publish an agreed result and fold it into both clubs' standings.
    pub fn publish(
        &mut self,
        record: &Versioned<MatchRecord>,
        (home_score, away_score): (u32, u32),
        (home_name, away_name): (&str, &str),
        players: &BTreeMap<UserId, MatchPlayer>,
    ) -> Result<(), DomainError> {
        let not_submitted: Vec<Value> = players.keys().map(|u| Value::from(u.as_str())).collect();
        let mut result = serde_json::Map::new();
        result.insert(record.home_team_id.to_string(), Value::from(home_score));
        result.insert(record.away_team_id.to_string(), Value::from(away_score));
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![
                    FieldOp::put(FieldPath::field("result"), Value::Object(result)),
                    FieldOp::put(FieldPath::field("published"), true),
                    FieldOp::put(FieldPath::field("conflict"), false),
                    FieldOp::put(FieldPath::field("players"), encode_value(players)?),
                    FieldOp::put(FieldPath::field("notSubmittedPlayers"), not_submitted),
                ],
            ),
            Precondition::Version(record.version),
        );

        let mut ops = standing_ops(
            &record.home_team_id,
            home_name,
            fold_result(home_score, away_score),
        );
        ops.extend(standing_ops(
            &record.away_team_id,
            away_name,
            fold_result(away_score, home_score),
        ));
        self.push(
            Write::upsert(paths::standings(&record.league_id)?, ops),
            Precondition::None,
        );
        Ok(())
    }

    /// Mark disagreeing claims for arbitration.
    pub fn flag_conflict(&mut self, record: &Versioned<MatchRecord>) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![
                    FieldOp::put(FieldPath::field("conflict"), true),
                    FieldOp::put(FieldPath::field("published"), false),
                ],
            ),
            Precondition::Version(record.version),
        );
        self.push(
            Write::update(
                paths::league(&record.league_id)?,
                vec![FieldOp::Increment(
                    FieldPath::field("conflictMatchesCount"),
                    1,
                )],
            ),
            Precondition::Exists,
        );
        Ok(())
    }

    pub fn record_motm(
        &mut self,
        record: &Versioned<MatchRecord>,
        club: &ClubId,
        player: &UserId,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![FieldOp::put(
                    FieldPath::of(["motmSubmissions", club.as_str()]),
                    player.as_str(),
                )],
            ),
            Precondition::Version(record.version),
        );
        Ok(())
    }

    /// Apply a two-sided motm decision. `Pending` writes nothing.
    pub fn settle_motm(
        &mut self,
        record: &Versioned<MatchRecord>,
        decision: &MotmReconciliation,
    ) -> Result<(), DomainError> {
        let ops = match decision {
            MotmReconciliation::Pending => return Ok(()),
            MotmReconciliation::Agreed(player) => {
                let mut ops = vec![
                    FieldOp::put(FieldPath::field("motm"), player.as_str()),
                    FieldOp::put(FieldPath::field("motmConflict"), false),
                ];
                if record.players.contains_key(player) {
                    ops.push(FieldOp::put(
                        FieldPath::of(["players", player.as_str(), "motm"]),
                        true,
                    ));
                }
                ops
            }
            MotmReconciliation::Disagreed => {
                vec![FieldOp::put(FieldPath::field("motmConflict"), true)]
            }
        };
        self.push(
            Write::update(paths::match_doc(&record.league_id, &record.match_id)?, ops),
            Precondition::Version(record.version),
        );
        Ok(())
    }

    pub fn record_player_stats(
        &mut self,
        record: &Versioned<MatchRecord>,
        player: &UserId,
        stats: PlayerStats,
    ) -> Result<(), DomainError> {
        let f = |field: &str| FieldPath::of(["players", player.as_str(), field]);
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![
                    FieldOp::put(f("submitted"), true),
                    FieldOp::put(f("rating"), stats.rating),
                    FieldOp::put(f("goals"), stats.goals),
                    FieldOp::put(f("assists"), stats.assists),
                    FieldOp::ArrayRemove(
                        FieldPath::field("notSubmittedPlayers"),
                        vec![Value::from(player.as_str())],
                    ),
                ],
            ),
            Precondition::Version(record.version),
        );
        Ok(())
    }

    pub fn skip_player_stats(
        &mut self,
        record: &Versioned<MatchRecord>,
        player: &UserId,
    ) -> Result<(), DomainError> {
        self.push(
            Write::update(
                paths::match_doc(&record.league_id, &record.match_id)?,
                vec![
                    FieldOp::put(
                        FieldPath::of(["players", player.as_str(), "skipped"]),
                        true,
                    ),
                    FieldOp::ArrayRemove(
                        FieldPath::field("notSubmittedPlayers"),
                        vec![Value::from(player.as_str())],
                    ),
                ],
            ),
            Precondition::Version(record.version),
        );
        Ok(())
    }
}
