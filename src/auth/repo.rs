use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database.
///
/// `login_attempts`, `password_reset_code`, `password_reset_expires` and
/// `reset_password` are only ever mutated through the operations below;
/// everything touching the counter or the code is a single SQL statement
/// so concurrent requests serialize at the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 hash, never exposed in JSON
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub profile_image: Option<String>,
    pub login_attempts: i32,
    #[serde(skip_serializing)]
    pub password_reset_code: Option<String>,
    pub password_reset_expires: Option<OffsetDateTime>,
    pub reset_password: bool,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = r#"
    id, username, email, password, first_name, last_name, phone, role_id,
    district, sector, profile_image, login_attempts, password_reset_code,
    password_reset_expires, reset_password, created_at
"#;

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Atomically bump the failed-login counter and return the new
    /// value. The increment happens in the store, not read-modify-write
    /// here, so two concurrent failures can never skip the threshold.
    pub async fn record_failed_login(db: &PgPool, id: i64) -> anyhow::Result<i32> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET login_attempts = login_attempts + 1
            WHERE id = $1
            RETURNING login_attempts
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(attempts)
    }

    /// Zero the failed-login counter. Shared by successful login,
    /// completed password reset, and administrative unlock.
    pub async fn clear_login_attempts(db: &PgPool, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET login_attempts = 0 WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store a fresh reset code, but only if no unexpired code is
    /// already pending. Returns `false` when another code holds the
    /// slot. Collisions with a different user's active code trip the
    /// partial unique index and surface as a database error for the
    /// caller to retry.
    pub async fn claim_reset_code(
        db: &PgPool,
        id: i64,
        code: &str,
        expires: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        let claimed = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET password_reset_code = $2, password_reset_expires = $3
            WHERE id = $1
              AND (password_reset_code IS NULL OR password_reset_expires <= now())
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires)
        .fetch_optional(db)
        .await?;
        Ok(claimed.is_some())
    }

    /// Look up the holder of an unexpired reset code. The expiry is
    /// checked against the store clock, so a textually correct but
    /// stale code never matches.
    pub async fn find_by_active_reset_code(
        db: &PgPool,
        code: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE password_reset_code = $1 AND password_reset_expires > now()
            "#
        ))
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Store a new password hash and close out the reset in one
    /// statement: the counter is zeroed, the code and its expiry are
    /// consumed, and any forced-change flag is lifted. Nothing is left
    /// half-applied if the write does not commit.
    pub async fn set_password(db: &PgPool, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password = $2,
                login_attempts = 0,
                password_reset_code = NULL,
                password_reset_expires = NULL,
                reset_password = FALSE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Whether a reset code is present and still within its expiry.
    pub fn has_active_reset_code(&self, now: OffsetDateTime) -> bool {
        self.password_reset_code.is_some()
            && self.password_reset_expires.map_or(false, |t| t > now)
    }
}

/// Role record. The set of roles is admin-managed data; this core only
/// resolves ids to names at request time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, description FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn user_with_reset(
        code: Option<&str>,
        expires: Option<OffsetDateTime>,
    ) -> User {
        User {
            id: 1,
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password: "hash".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone: None,
            role_id: None,
            district: None,
            sector: None,
            profile_image: None,
            login_attempts: 0,
            password_reset_code: code.map(|c| c.to_string()),
            password_reset_expires: expires,
            reset_password: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn no_code_means_no_active_reset() {
        let now = OffsetDateTime::now_utc();
        assert!(!user_with_reset(None, None).has_active_reset_code(now));
    }

    #[test]
    fn future_expiry_means_active_reset() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_reset(Some("482913"), Some(now + Duration::minutes(10)));
        assert!(user.has_active_reset_code(now));
    }

    #[test]
    fn past_expiry_means_no_active_reset() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_reset(Some("482913"), Some(now - Duration::minutes(1)));
        assert!(!user.has_active_reset_code(now));
    }
}
