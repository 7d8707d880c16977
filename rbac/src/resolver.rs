//! Two-hop traversal: permission → roles → users.
//!
//! Resolves which users effectively hold a permission, annotated with the
//! roles through which each holds it. Exactly two hops — the traversal
//! never recurses through any further indirection.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::associations::{self, RoleUserEdge};
use crate::error::{Error, Result};
use crate::models::{User, UserGrant};

/// Resolve every user holding the given permission.
///
/// Hop 1 collects the roles attached to the permission; hop 2 collects the
/// users of those roles. Each user appears exactly once, with the union of
/// all roles granting it the permission.
///
/// A permission with no roles (or whose roles have no users) resolves to
/// an empty set. A permission id that does not exist fails with
/// [`Error::PermissionNotFound`] — "no grants" and "no such permission"
/// are distinct outcomes.
pub async fn users_with_permission(pool: &PgPool, permission_id: Uuid) -> Result<Vec<UserGrant>> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM permissions WHERE id = $1)")
        .bind(permission_id)
        .fetch_one(pool)
        .await?;
    if !exists.0 {
        return Err(Error::PermissionNotFound(permission_id));
    }

    let roles = associations::roles_of(pool, permission_id).await?;
    if roles.is_empty() {
        return Ok(Vec::new());
    }

    let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();
    let edges = associations::users_of_roles(pool, &role_ids).await?;

    Ok(merge_grants(edges))
}

/// Group (role, user) edges by user, deduplicating users and unioning the
/// roles that grant each one access.
///
/// Role ids within a grant are sorted and deduplicated; the order of
/// grants themselves follows user id and carries no semantic meaning.
fn merge_grants(edges: Vec<RoleUserEdge>) -> Vec<UserGrant> {
    let mut by_user: BTreeMap<Uuid, (User, Vec<Uuid>)> = BTreeMap::new();

    for edge in edges {
        let entry = by_user.entry(edge.user_id).or_insert_with(|| {
            let user = User {
                id: edge.user_id,
                user_name: edge.user_name.clone(),
                created_at: edge.user_created_at,
                updated_at: edge.user_updated_at,
            };
            (user, Vec::new())
        });
        entry.1.push(edge.role_id);
    }

    by_user
        .into_values()
        .map(|(user, mut role_ids)| {
            role_ids.sort_unstable();
            role_ids.dedup();
            UserGrant { user, role_ids }
        })
        .collect()
}
