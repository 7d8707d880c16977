//! RBAC authorization graph.
//!
//! Permissions are granted to roles, roles to users. A permission is
//! therefore transitively associated with users through the role layer:
//!
//! ```text
//! permission --(permission_roles)--> role --(role_users)--> user
//! ```
//!
//! The crate owns the `permission` entity, its `permission_roles`
//! association table, and the two operations worth getting right:
//!
//! - [`resolver::users_with_permission`]: the two-hop traversal resolving
//!   which users effectively hold a permission, and via which roles.
//! - [`lifecycle::delete_permission`]: cascading deletion that detaches
//!   all role associations before removing the permission record.
//!
//! `role_users` belongs to the role/user subsystem and is consumed
//! read-only. All functions take an explicit [`sqlx::PgPool`]; there is no
//! shared global state.

pub mod associations;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod resolver;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    NewPermission, Permission, PermissionRole, PermissionUpdate, Role, User, UserGrant,
};
