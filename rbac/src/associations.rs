//! Association queries for the permission↔role and role↔user join tables.
//!
//! `permission_roles` is owned here: attach/detach mutate it and the
//! pair-level queries read it. `role_users` belongs to the role/user
//! subsystem and is only ever read (the resolver's second hop).

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Permission, PermissionRole, Role};

/// Attach a role to a permission, idempotently.
///
/// Both endpoints must exist; attaching against a missing permission or
/// role is rejected with [`Error::IntegrityViolation`] before any row is
/// written. Re-attaching an existing pair inserts nothing and refreshes
/// the association's `updated_at`.
pub async fn attach(pool: &PgPool, permission_id: Uuid, role_id: Uuid) -> Result<PermissionRole> {
    let permission_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM permissions WHERE id = $1)")
            .bind(permission_id)
            .fetch_one(pool)
            .await?;
    if !permission_exists.0 {
        return Err(Error::IntegrityViolation(format!(
            "cannot attach: permission {permission_id} does not exist"
        )));
    }

    let role_exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
        .bind(role_id)
        .fetch_one(pool)
        .await?;
    if !role_exists.0 {
        return Err(Error::IntegrityViolation(format!(
            "cannot attach: role {role_id} does not exist"
        )));
    }

    let row = sqlx::query_as::<_, PermissionRole>(
        r"
        INSERT INTO permission_roles (permission_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (permission_id, role_id) DO UPDATE
        SET updated_at = NOW()
        RETURNING permission_id, role_id, created_at, updated_at
        ",
    )
    .bind(permission_id)
    .bind(role_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Remove every role association for the given permission.
///
/// Returns the number of rows removed; 0 is a valid result, not an error.
/// Safe to retry: re-running after a partial failure removes nothing
/// further once the rows are gone.
pub async fn detach_all(pool: &PgPool, permission_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM permission_roles WHERE permission_id = $1")
        .bind(permission_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Get the roles to which a permission is assigned. No ordering guarantee.
pub async fn roles_of(pool: &PgPool, permission_id: Uuid) -> Result<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        r"
        SELECT r.id, r.slug, r.name, r.created_at, r.updated_at
        FROM roles r
        INNER JOIN permission_roles pr ON pr.role_id = r.id
        WHERE pr.permission_id = $1
        ",
    )
    .bind(permission_id)
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Get all permissions assigned to a specific role.
pub async fn permissions_for_role(pool: &PgPool, role_id: Uuid) -> Result<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        r"
        SELECT p.id, p.slug, p.name, p.conditions, p.description, p.created_at, p.updated_at
        FROM permissions p
        INNER JOIN permission_roles pr
            ON pr.permission_id = p.id
            AND pr.role_id = $1
        ",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    Ok(permissions)
}

/// Get all permissions NOT associated with a specific role.
///
/// Uses a strict inequality join condition (`role_id <> $1`), not
/// absence-of-row semantics. Consequence for callers: a permission with
/// zero role associations has no join row to match, so it appears in
/// neither this query's results nor [`permissions_for_role`]'s. Callers
/// expecting set-complement semantics must account for unattached
/// permissions separately.
pub async fn permissions_not_for_role(pool: &PgPool, role_id: Uuid) -> Result<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        r"
        SELECT DISTINCT p.id, p.slug, p.name, p.conditions, p.description, p.created_at, p.updated_at
        FROM permissions p
        INNER JOIN permission_roles pr
            ON pr.permission_id = p.id
            AND pr.role_id <> $1
        ",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    Ok(permissions)
}

/// One edge of the role→user join, annotated with the user's attributes.
#[derive(Debug, Clone, FromRow)]
pub struct RoleUserEdge {
    pub role_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

/// Get every (role, user) edge for the given roles — the resolver's
/// second hop. Read-only over `role_users`. No ordering guarantee.
pub async fn users_of_roles(pool: &PgPool, role_ids: &[Uuid]) -> Result<Vec<RoleUserEdge>> {
    let edges = sqlx::query_as::<_, RoleUserEdge>(
        r"
        SELECT
            ru.role_id,
            u.id AS user_id,
            u.user_name,
            u.created_at AS user_created_at,
            u.updated_at AS user_updated_at
        FROM users u
        INNER JOIN role_users ru ON ru.user_id = u.id
        WHERE ru.role_id = ANY($1)
        ",
    )
    .bind(role_ids)
    .fetch_all(pool)
    .await?;

    Ok(edges)
}
