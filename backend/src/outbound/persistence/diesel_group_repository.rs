//! PostgreSQL-backed `GroupRepository`.
//!
//! Membership lives in the `members` JSONB column. Membership changes lock
//! the group row with `SELECT ... FOR UPDATE`, evaluate the precondition
//! against the committed list and write it back in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::expression_methods::PgJsonbExpressionMethods;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::RunQueryDsl;

use crate::domain::membership::{MembershipChange, MembershipWrite, Roster};
use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::{Group, GroupId, GroupRole, UserId, Visibility};

use super::diesel_basic_error_mapping::{
    DieselErrorMapping, codec_to_diesel, describe_codec_error, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::models::{GroupDetails, GroupRow, RowCodecError, to_json};
use super::pool::{DbPool, PoolError};
use super::schema::groups;

/// Diesel-backed implementation of the `GroupRepository` port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupRepositoryError {
    map_basic_pool_error(error, GroupRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> GroupRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorMapping {
            query: GroupRepositoryError::query,
            connection: GroupRepositoryError::connection,
            duplicate: |_: Option<&str>| GroupRepositoryError::duplicate("name"),
        },
    )
}

fn map_codec_error(error: RowCodecError) -> GroupRepositoryError {
    GroupRepositoryError::query(describe_codec_error(&error))
}

fn decode(row: GroupRow) -> Result<Group, GroupRepositoryError> {
    Group::try_from(row).map_err(map_codec_error)
}

/// JSONB containment pattern matching any roster entry for `user`.
pub(super) fn member_pattern(user: &UserId) -> serde_json::Value {
    serde_json::json!([{ "userId": user.to_string() }])
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn insert(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let row = GroupRow::from_domain(group).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(groups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_details(&self, group: &Group) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(groups::table.find(group.id.as_uuid()))
            .set(GroupDetails::from(group))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        groups::table
            .find(id.as_uuid())
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn list_visible_to(&self, user: &UserId) -> Result<Vec<Group>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .filter(
                groups::visibility
                    .eq(Visibility::Public.as_str())
                    .or(groups::members.contains(member_pattern(user))),
            )
            .select(GroupRow::as_select())
            .order_by((groups::created_at.asc(), groups::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn delete(&self, id: &GroupId) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(groups::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn change_membership(
        &self,
        id: &GroupId,
        change: MembershipChange<GroupRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Group>, GroupRepositoryError> {
        let key = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let stored: Option<serde_json::Value> = groups::table
                        .find(key)
                        .select(groups::members)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(stored) = stored else {
                        return Ok(MembershipWrite::Missing);
                    };
                    let mut roster: Roster<GroupRole> = serde_json::from_value(stored)
                        .map_err(|err| DieselError::DeserializationError(Box::new(err)))?;
                    if let Err(rejected) = change.apply(&mut roster) {
                        return Ok(rejected.rejected());
                    }
                    let members = to_json("members", &roster).map_err(codec_to_diesel)?;
                    let row = diesel::update(groups::table.find(key))
                        .set((groups::members.eq(members), groups::updated_at.eq(now)))
                        .returning(GroupRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, DieselError>(MembershipWrite::Applied(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        outcome.try_map(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_pattern_matches_roster_entry_shape() {
        let user = UserId::random();
        let pattern = member_pattern(&user);
        assert_eq!(pattern[0]["userId"], serde_json::json!(user.to_string()));
        assert_eq!(pattern.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn any_unique_violation_is_a_duplicate_name() {
        let err = map_diesel_error(DieselError::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new(String::from("groups_name_key")),
        ));
        assert_eq!(err, GroupRepositoryError::duplicate("name"));
    }
}
