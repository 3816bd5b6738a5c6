/// Refresh-token revocation list (blacklist)
///
/// Logging out revokes a refresh token by recording its `jti` here; every
/// refresh call checks the list before minting a new access token. The
/// store is injected into the API state as a trait object rather than
/// held as process-global state, so multiple server instances can share
/// one backing store.
///
/// Entries carry the token's own expiry timestamp: once a token has
/// expired naturally its signature check fails anyway, so the row can be
/// pruned to bound memory. Pruning is pure garbage collection with no
/// correctness dependency on its timing.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Error type for revocation-store operations
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    /// Backing store failure
    #[error("Revocation store error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// A shared set of revoked refresh-token identifiers
///
/// A revocation must be visible to every subsequent `is_revoked` call
/// (read-your-writes through the backing store). Revoking the same
/// token twice is a no-op.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Records `jti` as revoked until the token's natural expiry
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), RevocationError>;

    /// Whether `jti` has been revoked
    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError>;

    /// Removes entries whose tokens expired at or before `now`,
    /// returning how many were dropped
    async fn prune(&self, now: DateTime<Utc>) -> Result<u64, RevocationError>;
}

/// Postgres-backed revocation store
///
/// Backed by the `revoked_tokens` table, shared by all API instances
/// pointed at the same database.
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), RevocationError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }

    async fn prune(&self, now: DateTime<Utc>) -> Result<u64, RevocationError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory revocation store
///
/// Suitable for tests and single-instance development setups; revocations
/// are lost on restart.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), RevocationError> {
        self.entries.write().await.entry(jti).or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, RevocationError> {
        Ok(self.entries.read().await.contains_key(&jti))
    }

    async fn prune(&self, now: DateTime<Utc>) -> Result<u64, RevocationError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_revoke_then_is_revoked() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();

        assert!(!store.is_revoked(jti).await.unwrap());
        store
            .revoke(jti, Utc::now() + Duration::days(7))
            .await
            .unwrap();
        assert!(store.is_revoked(jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();
        let expires = Utc::now() + Duration::days(7);

        store.revoke(jti, expires).await.unwrap();
        store.revoke(jti, expires).await.unwrap();
        assert!(store.is_revoked(jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_revocations_do_not_interfere() {
        let store = std::sync::Arc::new(InMemoryRevocationStore::new());
        let jtis: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();

        let mut handles = vec![];
        for jti in &jtis {
            let store = store.clone();
            let jti = *jti;
            handles.push(tokio::spawn(async move {
                store.revoke(jti, Utc::now() + Duration::days(1)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for jti in &jtis {
            assert!(store.is_revoked(*jti).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_prune_drops_only_expired_entries() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();

        let expired = Uuid::new_v4();
        let live = Uuid::new_v4();
        store.revoke(expired, now - Duration::hours(1)).await.unwrap();
        store.revoke(live, now + Duration::hours(1)).await.unwrap();

        let dropped = store.prune(now).await.unwrap();
        assert_eq!(dropped, 1);
        assert!(!store.is_revoked(expired).await.unwrap());
        assert!(store.is_revoked(live).await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_boundary_is_inclusive() {
        let store = InMemoryRevocationStore::new();
        let now = Utc::now();

        let jti = Uuid::new_v4();
        store.revoke(jti, now).await.unwrap();

        // expires_at == now counts as expired
        assert_eq!(store.prune(now).await.unwrap(), 1);
    }
}
