use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};

/// Storage operations on user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    /// Overwrite the registration fields of an unverified account. Returns
    /// false when the account was verified in the meantime and nothing changed.
    async fn reissue_otp(&self, id: Uuid, new: NewUser) -> anyhow::Result<bool>;
    async fn set_otp(&self, id: Uuid, otp: Option<&str>) -> anyhow::Result<()>;
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        dob: Option<&str>,
    ) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, dob, email, password_hash, google_id, otp, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, dob, email, password_hash, google_id, otp, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, dob, email, password_hash, otp, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, dob, email, password_hash, google_id, otp, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.dob)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.otp)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn reissue_otp(&self, id: Uuid, new: NewUser) -> anyhow::Result<bool> {
        // The otp guard keeps a verified account from being overwritten by a racing registration.
        let res = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name), dob = COALESCE($3, dob), password_hash = $4, otp = $5
            WHERE id = $1 AND otp IS NOT NULL AND otp <> ''
            "#,
        )
        .bind(id)
        .bind(new.name)
        .bind(new.dob)
        .bind(new.password_hash)
        .bind(new.otp)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_otp(&self, id: Uuid, otp: Option<&str>) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET otp = $2 WHERE id = $1")
            .bind(id)
            .bind(otp)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        dob: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name), dob = COALESCE($3, dob)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(dob)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
