//! # Profile Repository
//!
//! Users of an organization: role, outlet assignment and the optional login
//! (username + Argon2 hash). Usernames are unique per organization.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::{DbError, DbResult};
use stockhub_core::{Role, UserProfile};

const PROFILE_COLUMNS: &str =
    "id, organization_id, full_name, role, outlet_id, username, password_hash, created_at";

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ProfileRepository { pool, feed }
    }

    pub async fn insert(&self, profile: &UserProfile) -> DbResult<()> {
        debug!(id = %profile.id, role = profile.role.as_str(), "Inserting profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, organization_id, full_name, role, outlet_id, username, password_hash, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.organization_id)
        .bind(&profile.full_name)
        .bind(profile.role)
        .bind(&profile.outlet_id)
        .bind(&profile.username)
        .bind(&profile.password_hash)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: profile.username.clone().unwrap_or_default(),
            },
            other => other,
        })?;

        self.feed.publish(ChangeEvent::new(
            ChangeTable::Profiles,
            ChangeOp::Insert,
            &profile.organization_id,
            &profile.id,
        ));
        Ok(())
    }

    /// All profiles of the organization, by name.
    pub async fn list(&self, organization_id: &str) -> DbResult<Vec<UserProfile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE organization_id = ?1 ORDER BY full_name, id"
        );
        let profiles = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    pub async fn get_by_id(&self, organization_id: &str, id: &str) -> DbResult<UserProfile> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE organization_id = ?1 AND id = ?2"
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Profile", id))
    }

    pub async fn find_by_username(
        &self,
        organization_id: &str,
        username: &str,
    ) -> DbResult<Option<UserProfile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE organization_id = ?1 AND username = ?2"
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(organization_id)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Changes role and outlet assignment. Returns the updated profile.
    pub async fn update_assignment(
        &self,
        organization_id: &str,
        id: &str,
        role: Role,
        outlet_id: Option<&str>,
    ) -> DbResult<UserProfile> {
        let result = sqlx::query(
            "UPDATE profiles SET role = ?3, outlet_id = ?4 WHERE organization_id = ?1 AND id = ?2",
        )
        .bind(organization_id)
        .bind(id)
        .bind(role)
        .bind(outlet_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }

        info!(id = %id, role = role.as_str(), outlet = ?outlet_id, "Profile assignment changed");
        self.feed.publish(ChangeEvent::new(
            ChangeTable::Profiles,
            ChangeOp::Update,
            organization_id,
            id,
        ));
        self.get_by_id(organization_id, id).await
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a login password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// `false` for a wrong password or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::fixture;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(org: &str, username: &str, role: Role, outlet: Option<&str>) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4().to_string(),
            organization_id: org.to_string(),
            full_name: format!("User {}", username),
            role,
            outlet_id: outlet.map(str::to_string),
            username: Some(username.to_string()),
            password_hash: Some(hash_password("correct horse").unwrap()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let fx = fixture().await;
        let staff = profile(&fx.org.id, "asha", Role::Staff, Some(&fx.outlets[0].id));
        fx.db.profiles().insert(&staff).await.unwrap();

        let found = fx
            .db
            .profiles()
            .find_by_username(&fx.org.id, "asha")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.role, Role::Staff);
        assert_eq!(found.outlet_id.as_deref(), Some(fx.outlets[0].id.as_str()));
        assert!(verify_password("correct horse", found.password_hash.as_deref().unwrap()));

        assert!(fx
            .db
            .profiles()
            .find_by_username(&fx.org.id, "ravi")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let fx = fixture().await;
        fx.db
            .profiles()
            .insert(&profile(&fx.org.id, "asha", Role::Staff, None))
            .await
            .unwrap();

        let dup = fx
            .db
            .profiles()
            .insert(&profile(&fx.org.id, "asha", Role::Manager, None))
            .await;
        match dup {
            Err(DbError::UniqueViolation { value, .. }) => assert_eq!(value, "asha"),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_assignment() {
        let fx = fixture().await;
        let p = profile(&fx.org.id, "ravi", Role::Staff, Some(&fx.outlets[0].id));
        fx.db.profiles().insert(&p).await.unwrap();

        let updated = fx
            .db
            .profiles()
            .update_assignment(&fx.org.id, &p.id, Role::Manager, Some(&fx.outlets[1].id))
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.outlet_id.as_deref(), Some(fx.outlets[1].id.as_str()));
    }
}
