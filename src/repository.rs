use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AccountStatus, Role, User, UserRow, Wishlist};

/// RepoError
///
/// Failure type for all persistence operations. Gate callers translate it
/// into a generic 500; the detail is logged where the failure surfaces.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// Infrastructure-level failure outside the driver (also used by test
    /// doubles to simulate an unavailable store).
    #[error("{0}")]
    Unavailable(String),
}

/// Repository Trait
///
/// Abstract contract for the user store and the wishlist store. Handlers and
/// gates depend on this trait only, so tests can substitute an in-memory
/// implementation.
///
/// `Send + Sync + async_trait` make the trait object (`Arc<dyn Repository>`)
/// safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User store (consumed by the authentication gate) ---
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError>;
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    // Role mutation; validity of the assignment is enforced by the
    // escalation guard before this is called.
    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<User>, RepoError>;
    async fn set_user_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<Option<User>, RepoError>;
    async fn delete_user(&self, id: &str) -> Result<bool, RepoError>;

    // --- Wishlists (the ownership-checked resource) ---
    async fn wishlists_for(&self, user_id: &str) -> Result<Vec<Wishlist>, RepoError>;
    async fn create_wishlist(&self, user_id: &str, title: String) -> Result<Wishlist, RepoError>;
    async fn get_wishlist(&self, id: &str) -> Result<Option<Wishlist>, RepoError>;
    /// Ownership resolver source: the owning user id, or `None` when the
    /// wishlist does not exist.
    async fn wishlist_owner(&self, id: &str) -> Result<Option<String>, RepoError>;
    async fn delete_wishlist(&self, id: &str) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, role, status, first_name, last_name";

#[async_trait]
impl Repository for PostgresRepository {
    /// Retrieves the full profile needed for authentication and
    /// authorization. Called on every authenticated request; freshness over
    /// caching, so a revoked approval takes effect immediately.
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn set_user_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET status = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn wishlists_for(&self, user_id: &str) -> Result<Vec<Wishlist>, RepoError> {
        let lists = sqlx::query_as::<_, Wishlist>(
            "SELECT id, user_id, title, created_at FROM wishlists \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn create_wishlist(&self, user_id: &str, title: String) -> Result<Wishlist, RepoError> {
        let new_id = Uuid::new_v4().to_string();
        let wishlist = sqlx::query_as::<_, Wishlist>(
            "INSERT INTO wishlists (id, user_id, title, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             RETURNING id, user_id, title, created_at",
        )
        .bind(new_id)
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(wishlist)
    }

    async fn get_wishlist(&self, id: &str) -> Result<Option<Wishlist>, RepoError> {
        let wishlist = sqlx::query_as::<_, Wishlist>(
            "SELECT id, user_id, title, created_at FROM wishlists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(wishlist)
    }

    /// The injected ownership source for wishlist routes. `None` means the
    /// wishlist does not exist, which the ownership gate treats as a
    /// non-match rather than an error.
    async fn wishlist_owner(&self, id: &str) -> Result<Option<String>, RepoError> {
        let owner: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM wishlists WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(owner.map(|(user_id,)| user_id))
    }

    async fn delete_wishlist(&self, id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM wishlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
