//! Permission lifecycle: create, read, update, cascading delete.
//!
//! The store enforces no referential integrity between `permissions` and
//! `permission_roles`, so deletion must detach every role association
//! before removing the record itself. That ordering is the invariant this
//! module exists to hold.

use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::associations;
use crate::error::{Error, Result};
use crate::models::{NewPermission, Permission, PermissionUpdate};

/// Create a new permission.
///
/// The id and timestamps are store-generated. A duplicate slug is rejected
/// with [`Error::IntegrityViolation`].
pub async fn create_permission(pool: &PgPool, new: &NewPermission) -> Result<Permission> {
    let permission = sqlx::query_as::<_, Permission>(
        r"
        INSERT INTO permissions (slug, name, conditions, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id, slug, name, conditions, description, created_at, updated_at
        ",
    )
    .bind(&new.slug)
    .bind(&new.name)
    .bind(new.conditions.as_deref())
    .bind(new.description.as_deref())
    .fetch_one(pool)
    .await
    .map_err(|e| Error::from_insert(e, &format!("permission slug '{}'", new.slug)))?;

    debug!(permission_id = %permission.id, slug = %permission.slug, "Permission created");
    Ok(permission)
}

/// Get a permission by id.
///
/// Fails with [`Error::PermissionNotFound`] — a missing record is never
/// substituted with an empty result.
pub async fn get_permission(pool: &PgPool, permission_id: Uuid) -> Result<Permission> {
    sqlx::query_as::<_, Permission>(
        r"
        SELECT id, slug, name, conditions, description, created_at, updated_at
        FROM permissions
        WHERE id = $1
        ",
    )
    .bind(permission_id)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::PermissionNotFound(permission_id))
}

/// Get a permission by its unique slug.
pub async fn get_permission_by_slug(pool: &PgPool, slug: &str) -> Result<Permission> {
    sqlx::query_as::<_, Permission>(
        r"
        SELECT id, slug, name, conditions, description, created_at, updated_at
        FROM permissions
        WHERE slug = $1
        ",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::PermissionSlugNotFound(slug.to_string()))
}

/// List all permissions, ordered by slug.
pub async fn list_permissions(pool: &PgPool) -> Result<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        r"
        SELECT id, slug, name, conditions, description, created_at, updated_at
        FROM permissions
        ORDER BY slug ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(permissions)
}

/// Update a permission's fillable fields.
///
/// Uses COALESCE to only update provided fields; `updated_at` is refreshed
/// whenever at least one field is set. An update carrying no fields is a
/// plain read and leaves the record untouched. Fails with
/// [`Error::PermissionNotFound`] for a missing id and
/// [`Error::IntegrityViolation`] for a slug collision.
pub async fn update_permission(
    pool: &PgPool,
    permission_id: Uuid,
    update: &PermissionUpdate,
) -> Result<Permission> {
    if update.is_empty() {
        return get_permission(pool, permission_id).await;
    }

    let permission = sqlx::query_as::<_, Permission>(
        r"
        UPDATE permissions
        SET slug = COALESCE($2, slug),
            name = COALESCE($3, name),
            conditions = COALESCE($4, conditions),
            description = COALESCE($5, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, slug, name, conditions, description, created_at, updated_at
        ",
    )
    .bind(permission_id)
    .bind(update.slug.as_deref())
    .bind(update.name.as_deref())
    .bind(update.conditions.as_deref())
    .bind(update.description.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::from_insert(e, "permission slug"))?
    .ok_or(Error::PermissionNotFound(permission_id))?;

    Ok(permission)
}

/// Delete a permission, removing its role associations first.
///
/// Sequence: verify the permission exists, detach every `permission_roles`
/// row, then delete the record. Detachment must complete before the entity
/// delete is issued — the store has no cascade of its own, and reversing
/// the order could leave join rows referencing a deleted permission.
///
/// The two store calls are not wrapped in a transaction. If detachment
/// fails, the delete is never attempted and the permission is untouched.
/// If the delete fails after detachment, what remains is a permission with
/// zero associations — a valid state; retrying the delete completes the
/// removal.
///
/// Returns the number of role associations that were detached.
pub async fn delete_permission(pool: &PgPool, permission_id: Uuid) -> Result<u64> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM permissions WHERE id = $1)")
        .bind(permission_id)
        .fetch_one(pool)
        .await?;
    if !exists.0 {
        return Err(Error::PermissionNotFound(permission_id));
    }

    let detached = associations::detach_all(pool, permission_id).await?;
    debug!(permission_id = %permission_id, detached, "Detached role associations");

    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(permission_id)
        .execute(pool)
        .await
        .map_err(|e| {
            warn!(
                permission_id = %permission_id,
                error = %e,
                "Permission delete failed after detach; record remains with no associations, retry to complete"
            );
            Error::from(e)
        })?;

    if result.rows_affected() > 0 {
        debug!(permission_id = %permission_id, "Permission deleted");
    }

    Ok(detached)
}
