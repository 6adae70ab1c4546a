//! Users service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::users::{
    data::NewUser, errors::UsersServiceError, records::UserRecord, repository::PgUsersRepository,
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    repository: PgUsersRepository,
}

impl PgUsersService {
    /// Users are not row-level scoped, so this service takes the raw pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgUsersRepository::new(pool),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        self.repository.create_user(user).await.map_err(Into::into)
    }
}

/// User persistence operations.
#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{domain::users::records::UserUuid, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn create_user_returns_correct_uuid_and_name() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgUsersService::new(ctx.db.pool().clone());

        let uuid = UserUuid::new();

        let user = svc
            .create_user(NewUser {
                uuid,
                name: "Riley".to_string(),
            })
            .await?;

        assert_eq!(user.uuid, uuid);
        assert_eq!(user.name, "Riley");
        assert!(user.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn create_user_timestamps_are_set() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgUsersService::new(ctx.db.pool().clone());

        let before = Timestamp::now();

        let user = svc
            .create_user(NewUser {
                uuid: UserUuid::new(),
                name: "Timestamp Test".to_string(),
            })
            .await?;

        assert!(user.created_at >= before, "created_at should not predate the call");
        assert!(user.created_at <= Timestamp::now(), "created_at should not be in the future");

        Ok(())
    }

    #[tokio::test]
    async fn create_user_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgUsersService::new(ctx.db.pool().clone());
        let uuid = UserUuid::new();

        svc.create_user(NewUser {
            uuid,
            name: "First".to_string(),
        })
        .await?;

        let result = svc
            .create_user(NewUser {
                uuid,
                name: "Second".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }
}
