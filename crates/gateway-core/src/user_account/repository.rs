//! User Account Repository

use crate::shared::error::Result;
use crate::user_account::entity::UserAccount;
use sqlx::PgPool;

pub struct UserAccountRepository {
    pool: PgPool,
}

impl UserAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserAccount>> {
        Ok(
            sqlx::query_as::<_, UserAccount>("SELECT * FROM user_accounts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(
            sqlx::query_as::<_, UserAccount>("SELECT * FROM user_accounts WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Upsert against the same transaction a [`crate::usecase::UnitOfWorkTx`]
    /// owns, so the account row and its `UserUpserted` event commit together.
    pub async fn upsert(
        &self,
        conn: &mut sqlx::PgConnection,
        account: &UserAccount,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_accounts \
             (user_id, email, role, plan, organization_id, provider, raw_metadata, last_sign_in_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (user_id) DO UPDATE SET \
             email = EXCLUDED.email, \
             role = EXCLUDED.role, \
             plan = EXCLUDED.plan, \
             organization_id = EXCLUDED.organization_id, \
             provider = EXCLUDED.provider, \
             raw_metadata = EXCLUDED.raw_metadata, \
             last_sign_in_at = EXCLUDED.last_sign_in_at, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(&account.user_id)
        .bind(&account.email)
        .bind(&account.role)
        .bind(&account.plan)
        .bind(&account.organization_id)
        .bind(&account.provider)
        .bind(&account.raw_metadata)
        .bind(account.last_sign_in_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn count_by_email_domain(&self, domain: &str) -> Result<i64> {
        let pattern = format!("@{}", domain.to_lowercase());
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_accounts WHERE lower(email) LIKE '%' || $1",
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?)
    }
}
