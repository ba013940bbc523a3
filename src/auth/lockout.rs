use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::repo::User;
use crate::config::SecurityConfig;

/// Outcome of registering a failed credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    Active,
    Locked,
}

/// Per-user lockout policy. An account is Locked once its consecutive
/// failed-attempt counter reaches the threshold; only a successful
/// password reset or an explicit unlock brings it back.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    threshold: i32,
}

impl LockoutPolicy {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn is_locked(&self, attempts: i32) -> bool {
        attempts >= self.threshold
    }
}

impl From<&SecurityConfig> for LockoutPolicy {
    fn from(config: &SecurityConfig) -> Self {
        Self::new(config.lockout_threshold)
    }
}

/// Bump the user's counter after a failed credential check and report
/// whether this attempt crossed the threshold. The increment is atomic
/// in the store; two near-simultaneous failures both observe their own
/// post-increment count.
pub async fn register_failure(
    db: &PgPool,
    policy: LockoutPolicy,
    user_id: i64,
) -> anyhow::Result<LockoutState> {
    let attempts = User::record_failed_login(db, user_id).await?;
    if policy.is_locked(attempts) {
        warn!(user_id = %user_id, attempts, "account locked");
        Ok(LockoutState::Locked)
    } else {
        warn!(user_id = %user_id, attempts, "failed login attempt");
        Ok(LockoutState::Active)
    }
}

/// Reset the counter to zero. Called on successful login and by the
/// administrative unlock path.
pub async fn unlock(db: &PgPool, user_id: i64) -> anyhow::Result<()> {
    User::clear_login_attempts(db, user_id).await?;
    info!(user_id = %user_id, "login attempts cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_stays_active_below_the_threshold() {
        let policy = LockoutPolicy::new(5);
        assert!(!policy.is_locked(0));
        assert!(!policy.is_locked(4));
    }

    #[test]
    fn account_locks_at_the_threshold() {
        let policy = LockoutPolicy::new(5);
        assert!(policy.is_locked(5));
        assert!(policy.is_locked(6));
    }

    #[test]
    fn fifth_failure_from_four_attempts_locks() {
        // A user at four attempts submits one more wrong password: the
        // post-increment count of five must already read as locked.
        let policy = LockoutPolicy::new(5);
        let post_increment = 4 + 1;
        assert!(policy.is_locked(post_increment));
    }

    #[test]
    fn policy_comes_from_security_config() {
        let config = SecurityConfig {
            lockout_threshold: 3,
            reset_code_ttl_minutes: 15,
        };
        let policy = LockoutPolicy::from(&config);
        assert!(!policy.is_locked(2));
        assert!(policy.is_locked(3));
    }
}
