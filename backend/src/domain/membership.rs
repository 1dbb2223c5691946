//! Ordered, duplicate-free membership lists embedded in groups and projects.
//!
//! A [`Roster`] keeps insertion order and holds each user at most once. The
//! role type is generic so groups and projects share the same bookkeeping
//! with their own role vocabularies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, UserId};

/// One `(user, role, joinedAt)` entry of a membership list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member<R> {
    pub user_id: UserId,
    pub role: R,
    pub joined_at: DateTime<Utc>,
}

impl<R> Member<R> {
    /// Create a member entry.
    pub fn new(user_id: UserId, role: R, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            joined_at,
        }
    }
}

/// Raised when a user is added to a roster that already lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("user {0} is already a member")]
pub struct AlreadyMember(pub UserId);

/// Ordered set of members keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster<R> {
    members: Vec<Member<R>>,
}

impl<R> Default for Roster<R> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<R> Roster<R> {
    /// A roster listing only `member`.
    pub fn single(member: Member<R>) -> Self {
        Self {
            members: vec![member],
        }
    }

    /// Build a roster, rejecting the first duplicate user id.
    pub fn from_members(members: Vec<Member<R>>) -> Result<Self, AlreadyMember> {
        let mut roster = Self::default();
        for member in members {
            roster.try_add(member)?;
        }
        Ok(roster)
    }

    /// Whether `user_id` is listed.
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.members.iter().any(|m| &m.user_id == user_id)
    }

    /// Look up a member by user id.
    pub fn get(&self, user_id: &UserId) -> Option<&Member<R>> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    /// Append `member` unless the user is already listed.
    pub fn try_add(&mut self, member: Member<R>) -> Result<(), AlreadyMember> {
        if self.contains(&member.user_id) {
            return Err(AlreadyMember(member.user_id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Remove the entry for `user_id`, returning it when present.
    pub fn remove(&mut self, user_id: &UserId) -> Option<Member<R>> {
        let index = self.members.iter().position(|m| &m.user_id == user_id)?;
        Some(self.members.remove(index))
    }

    /// Change the role of `user_id`; returns `false` when not a member.
    pub fn set_role(&mut self, user_id: &UserId, role: R) -> bool {
        match self.members.iter_mut().find(|m| &m.user_id == user_id) {
            Some(member) => {
                member.role = role;
                true
            }
            None => false,
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Member<R>> {
        self.members.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster has no entries.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Outcome of an atomic membership write performed by a repository.
///
/// Repositories evaluate the membership precondition and apply the write
/// under one lock or transaction so concurrent writers cannot duplicate a
/// member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipWrite<T> {
    /// The write was applied; carries the updated aggregate.
    Applied(T),
    /// The user was already listed; nothing changed.
    AlreadyMember,
    /// The user was not listed; nothing changed.
    NotMember,
    /// The aggregate itself does not exist.
    Missing,
}

/// Membership mutation a repository applies atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange<R> {
    /// Push the member if absent.
    Add(Member<R>),
    /// Remove the member if present.
    Remove(UserId),
    /// Change the member's role if present.
    SetRole(UserId, R),
}

impl<R> MembershipChange<R> {
    /// Apply the change to `roster`, reporting which precondition failed.
    ///
    /// Returns `Ok(())` when the roster was modified.
    pub fn apply(self, roster: &mut Roster<R>) -> Result<(), MembershipWrite<()>> {
        match self {
            Self::Add(member) => roster
                .try_add(member)
                .map_err(|_| MembershipWrite::AlreadyMember),
            Self::Remove(user_id) => roster
                .remove(&user_id)
                .map(|_| ())
                .ok_or(MembershipWrite::NotMember),
            Self::SetRole(user_id, role) => {
                if roster.set_role(&user_id, role) {
                    Ok(())
                } else {
                    Err(MembershipWrite::NotMember)
                }
            }
        }
    }
}

impl MembershipWrite<()> {
    /// Re-type a failed precondition for an aggregate-carrying outcome.
    pub fn rejected<T>(self) -> MembershipWrite<T> {
        match self {
            Self::AlreadyMember => MembershipWrite::AlreadyMember,
            Self::NotMember => MembershipWrite::NotMember,
            Self::Missing | Self::Applied(()) => MembershipWrite::Missing,
        }
    }
}

impl<T> MembershipWrite<T> {
    /// Convert the carried aggregate, keeping any rejection as is.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<MembershipWrite<U>, E> {
        Ok(match self {
            Self::Applied(value) => MembershipWrite::Applied(f(value)?),
            Self::AlreadyMember => MembershipWrite::AlreadyMember,
            Self::NotMember => MembershipWrite::NotMember,
            Self::Missing => MembershipWrite::Missing,
        })
    }

    /// Convert the outcome into the aggregate or a domain error.
    ///
    /// `entity` names the aggregate kind in messages, e.g. `"group"`.
    pub fn into_result(self, entity: &str) -> Result<T, Error> {
        match self {
            Self::Applied(value) => Ok(value),
            Self::AlreadyMember => Err(Error::conflict(format!(
                "user is already a member of this {entity}"
            ))),
            Self::NotMember => Err(Error::not_found(format!(
                "user is not a member of this {entity}"
            ))),
            Self::Missing => Err(Error::not_found(format!("{entity} not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Seat {
        Lead,
        Crew,
    }

    #[rstest]
    fn single_roster_lists_exactly_one_member() {
        let user = UserId::random();
        let roster = Roster::single(Member::new(user, Seat::Lead, chrono::Utc::now()));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(&user).map(|m| m.role), Some(Seat::Lead));
    }

    #[fixture]
    fn roster() -> Roster<Seat> {
        let mut roster = Roster::default();
        roster
            .try_add(Member::new(UserId::random(), Seat::Lead, Utc::now()))
            .expect("first member");
        roster
    }

    #[rstest]
    fn duplicate_add_is_rejected_and_leaves_roster_unchanged(mut roster: Roster<Seat>) {
        let existing = roster.iter().next().expect("member").user_id;
        let err = roster
            .try_add(Member::new(existing, Seat::Crew, Utc::now()))
            .expect_err("duplicate");
        assert_eq!(err, AlreadyMember(existing));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(&existing).map(|m| m.role), Some(Seat::Lead));
    }

    #[rstest]
    fn preserves_insertion_order(mut roster: Roster<Seat>) {
        let second = UserId::random();
        let third = UserId::random();
        roster.try_add(Member::new(second, Seat::Crew, Utc::now())).expect("add");
        roster.try_add(Member::new(third, Seat::Crew, Utc::now())).expect("add");
        let order: Vec<_> = roster.iter().skip(1).map(|m| m.user_id).collect();
        assert_eq!(order, vec![second, third]);
    }

    #[rstest]
    fn change_reports_missing_member(mut roster: Roster<Seat>) {
        let stranger = UserId::random();
        assert_eq!(
            MembershipChange::Remove(stranger).apply(&mut roster),
            Err(MembershipWrite::NotMember)
        );
        assert_eq!(
            MembershipChange::SetRole(stranger, Seat::Lead).apply(&mut roster),
            Err(MembershipWrite::NotMember)
        );
    }

    #[rstest]
    fn change_sets_role_in_place(mut roster: Roster<Seat>) {
        let existing = roster.iter().next().expect("member").user_id;
        MembershipChange::SetRole(existing, Seat::Crew)
            .apply(&mut roster)
            .expect("role change");
        assert_eq!(roster.get(&existing).map(|m| m.role), Some(Seat::Crew));
    }

    #[test]
    fn from_members_rejects_duplicates() {
        let id = UserId::random();
        let members = vec![
            Member::new(id, Seat::Lead, Utc::now()),
            Member::new(id, Seat::Crew, Utc::now()),
        ];
        assert_eq!(Roster::from_members(members), Err(AlreadyMember(id)));
    }

    #[rstest]
    #[case(MembershipWrite::AlreadyMember, ErrorCode::Conflict)]
    #[case(MembershipWrite::NotMember, ErrorCode::NotFound)]
    #[case(MembershipWrite::Missing, ErrorCode::NotFound)]
    fn failed_writes_map_to_errors(#[case] write: MembershipWrite<()>, #[case] code: ErrorCode) {
        let err = write.into_result("project").expect_err("rejected write");
        assert_eq!(err.code(), code);
    }
}
