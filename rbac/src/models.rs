//! Database models for the authorization graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A permission record.
///
/// `slug` is the unique machine-readable key callers address permissions
/// by; `name` is the display label. `conditions` holds a serialized rule
/// expression evaluated at authorization-check time — opaque here, never
/// parsed by this crate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub conditions: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a permission. `slug` and `name` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPermission {
    pub slug: String,
    pub name: String,
    pub conditions: Option<String>,
    pub description: Option<String>,
}

/// Partial update over the fillable fields of a permission.
///
/// `None` leaves a field untouched. The record's `updated_at` is refreshed
/// on every update regardless of which fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub conditions: Option<String>,
    pub description: Option<String>,
}

impl PermissionUpdate {
    /// Whether the update carries no field changes at all.
    pub const fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.name.is_none()
            && self.conditions.is_none()
            && self.description.is_none()
    }
}

/// A role, as seen by this subsystem: identity plus display attributes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user, as seen by this subsystem: identity plus display attributes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A permission↔role association row.
///
/// The association carries its own timestamps, distinct from the
/// permission and role it links. Re-attaching an existing pair refreshes
/// `updated_at` rather than inserting a duplicate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PermissionRole {
    pub permission_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user holding a permission, annotated with every role through which
/// the permission is held. Produced by the two-hop resolver; each user
/// appears at most once in a result set.
#[derive(Debug, Clone, Serialize)]
pub struct UserGrant {
    pub user: User,
    pub role_ids: Vec<Uuid>,
}
