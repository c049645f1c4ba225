use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// --- Access Control Primitives ---

/// Role
///
/// The RBAC field carried by every user record. Roles form a strict hierarchy
/// used for both minimum-role checks and role-assignment validation:
/// `owner (3) > admin (2) > user (1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    User,
}

impl Role {
    /// The fixed numeric ranking used for every hierarchy comparison.
    /// Role assignment requires the granted rank to be *strictly below*
    /// the granter's rank.
    pub fn rank(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Admin => 2,
            Role::User => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Parses the lowercase database/API representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AccountStatus
///
/// Account lifecycle state. New registrations start as `pending` and must be
/// approved by an administrator; only `approved` passes the authentication
/// gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Approved,
    Pending,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Approved => "approved",
            AccountStatus::Pending => "pending",
            AccountStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(AccountStatus::Approved),
            "pending" => Some(AccountStatus::Pending),
            "rejected" => Some(AccountStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. This profile is
/// reloaded on every authenticated request; there is deliberately no
/// cross-request cache, so a status or role change takes effect on the next
/// request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Opaque, stable identifier (primary key).
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Raw database row for `users`. Role and status are stored as text and
/// normalized into the typed enums on the way out; unknown values degrade to
/// the least-privileged interpretation.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
    pub status: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            role: Role::parse(&row.role).unwrap_or(Role::User),
            status: AccountStatus::parse(&row.status).unwrap_or(AccountStatus::Pending),
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Wishlist
///
/// A wishlist record from the `wishlists` table. Wishlists are the
/// ownership-checked resource: non-privileged users may only read or delete
/// wishlists whose `user_id` matches their own.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: String,
    /// Owner (FK to `users.id`).
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// UpdateRoleRequest
///
/// Input payload for PATCH /admin/users/{id}/role. The requested role is
/// validated by the escalation guard before any mutation happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// UpdateStatusRequest
///
/// Input payload for PATCH /admin/users/{id}/status (approve / reject).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

/// CreateWishlistRequest
///
/// Input payload for POST /wishlists. The owner is always the authenticated
/// caller; it is never taken from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWishlistRequest {
    pub title: String,
}

// --- Output Schemas ---

/// UserProfile
///
/// Outward-facing user representation. Field names follow the API's
/// camelCase convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            role: user.role,
            status: user.status,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}
