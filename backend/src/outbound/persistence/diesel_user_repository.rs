//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId};

use super::diesel_basic_error_mapping::{
    DieselErrorMapping, describe_codec_error, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{RowCodecError, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorMapping {
            query: UserRepositoryError::query,
            connection: UserRepositoryError::connection,
            duplicate: |constraint: Option<&str>| {
                let field = match constraint {
                    Some("users_email_key") => "email",
                    _ => "username",
                };
                UserRepositoryError::duplicate(field)
            },
        },
    )
}

fn map_codec_error(error: RowCodecError) -> UserRepositoryError {
    UserRepositoryError::query(describe_codec_error(&error))
}

fn decode(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row).map_err(map_codec_error)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let row = UserRow::from_domain(user).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let row = UserRow::from_domain(user).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::joined_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; query behaviour is exercised against a live
    //! database by the integration suite.
    use super::*;
    use diesel::result::{DatabaseErrorKind, DatabaseErrorInformation, Error as DieselError};

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn violation(constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Violation(constraint)))
    }

    #[test]
    fn unique_constraints_name_the_colliding_field() {
        assert_eq!(
            map_diesel_error(violation("users_email_key")),
            UserRepositoryError::duplicate("email")
        );
        assert_eq!(
            map_diesel_error(violation("users_username_key")),
            UserRepositoryError::duplicate("username")
        );
    }

    #[test]
    fn pool_checkout_failure_is_a_connection_error() {
        let err = map_pool_error(PoolError::checkout("timeout"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }
}
