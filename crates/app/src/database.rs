//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, query, query_as};

use crate::domain::users::records::UserUuid;

/// SQL used to set user context for row-level security.
pub const SET_USER_CONTEXT_SQL: &str = "SELECT set_config('app.current_user_uuid', $1, true)";

const CURRENT_ROLE_FLAGS_SQL: &str =
    "SELECT rolsuper, rolbypassrls FROM pg_roles WHERE rolname = current_user";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction and set user context for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting user context fails.
    pub async fn begin_user_transaction(
        &self,
        user: UserUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_USER_CONTEXT_SQL)
            .bind(user.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }

    /// Begin a transaction without user context, for catalog data.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Refuse to run with a role that would silently bypass row-level security.
///
/// # Errors
///
/// Returns a configuration error when the connected role is a superuser or has
/// `BYPASSRLS`, or when the role flags cannot be read.
pub async fn ensure_rls_enforced_role(pool: &PgPool) -> Result<(), sqlx::Error> {
    let (is_superuser, bypasses_rls): (bool, bool) =
        query_as(CURRENT_ROLE_FLAGS_SQL).fetch_one(pool).await?;

    if is_superuser || bypasses_rls {
        return Err(sqlx::Error::Configuration(
            "database role bypasses row-level security; connect with the app role".into(),
        ));
    }

    Ok(())
}
