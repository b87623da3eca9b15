//! UAI Repository

use crate::shared::error::Result;
use crate::uai::entity::{CredentialLink, Uai};
use sqlx::PgPool;

pub struct UaiRepository {
    pool: PgPool,
}

impl UaiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS uais (
                universal_id TEXT PRIMARY KEY,
                primary_email TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_uais_primary_email ON uais(primary_email) WHERE primary_email IS NOT NULL;

            CREATE TABLE IF NOT EXISTS credential_links (
                method TEXT NOT NULL,
                identifier_hash TEXT NOT NULL,
                universal_id TEXT NOT NULL REFERENCES uais(universal_id),
                linked_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (method, identifier_hash)
            );
            CREATE INDEX IF NOT EXISTS idx_credential_links_uai ON credential_links(universal_id);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_link(&self, method: &str, identifier_hash: &str) -> Result<Option<CredentialLink>> {
        Ok(sqlx::query_as::<_, CredentialLink>(
            "SELECT * FROM credential_links WHERE method = $1 AND identifier_hash = $2",
        )
        .bind(method)
        .bind(identifier_hash)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn find_uai_by_primary_email(&self, email: &str) -> Result<Option<Uai>> {
        Ok(sqlx::query_as::<_, Uai>("SELECT * FROM uais WHERE primary_email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn insert_uai(&self, conn: &mut sqlx::PgConnection, uai: &Uai) -> Result<()> {
        sqlx::query("INSERT INTO uais (universal_id, primary_email, created_at) VALUES ($1, $2, $3)")
            .bind(&uai.universal_id)
            .bind(&uai.primary_email)
            .bind(uai.created_at)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn insert_link(&self, conn: &mut sqlx::PgConnection, link: &CredentialLink) -> Result<()> {
        sqlx::query(
            "INSERT INTO credential_links (method, identifier_hash, universal_id, linked_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&link.method)
        .bind(&link.identifier_hash)
        .bind(&link.universal_id)
        .bind(link.linked_at)
        .execute(conn)
        .await?;
        Ok(())
    }
}
