//! Roles, owner scoping, and route access policies.
//!
//! Role codes are persisted as SMALLINT in `users.role`. The numeric values
//! are only known to [`Role::from_code`] and [`Role::code`]; everything else
//! works on the closed [`Role`] enum.

use serde::Serialize;

use crate::types::DbId;

/// Role code type matching SMALLINT in the database.
pub type RoleCode = i16;

pub const ROLE_CODE_ADMIN: RoleCode = 1;
pub const ROLE_CODE_REGULAR: RoleCode = 2;
pub const ROLE_CODE_SUPER_ADMIN: RoleCode = 3;

/// A user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Regular,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Map a stored role code. Unknown codes are regular users.
    pub fn from_code(code: RoleCode) -> Self {
        match code {
            ROLE_CODE_ADMIN => Role::Admin,
            ROLE_CODE_SUPER_ADMIN => Role::SuperAdmin,
            _ => Role::Regular,
        }
    }

    /// The code stored in `users.role`.
    pub fn code(self) -> RoleCode {
        match self {
            Role::Regular => ROLE_CODE_REGULAR,
            Role::Admin => ROLE_CODE_ADMIN,
            Role::SuperAdmin => ROLE_CODE_SUPER_ADMIN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Regular => "regular",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

// ---------------------------------------------------------------------------
// Owner scope
// ---------------------------------------------------------------------------

/// Which owners' projects (and their logs) a caller may see or mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// No owner filter at all.
    All,
    /// Only rows whose project was created by this user.
    Owner(DbId),
}

impl OwnerScope {
    /// Super-admins see every owner; everybody else only their own rows.
    pub fn for_user(user_id: DbId, role: Role) -> Self {
        match role {
            Role::SuperAdmin => OwnerScope::All,
            Role::Admin | Role::Regular => OwnerScope::Owner(user_id),
        }
    }

    /// The owner id to filter on, `None` when unrestricted.
    pub fn owner_id(self) -> Option<DbId> {
        match self {
            OwnerScope::All => None,
            OwnerScope::Owner(id) => Some(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Access policies
// ---------------------------------------------------------------------------

/// Role requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    SuperAdminOnly,
    AdminOnly,
    /// The path user id must be the caller's own id.
    SelfOnly,
    SuperAdminOrAdmin,
    SuperAdminOrSelf,
    AdminOrSelf,
}

impl AccessPolicy {
    /// Whether the policy compares the caller against a path user id.
    pub fn needs_target(self) -> bool {
        matches!(
            self,
            AccessPolicy::SelfOnly | AccessPolicy::SuperAdminOrSelf | AccessPolicy::AdminOrSelf
        )
    }

    /// Evaluate the policy for a caller.
    ///
    /// `target_id` is the user id from the request path; it is ignored by
    /// policies that do not [`need a target`](Self::needs_target).
    pub fn permits(self, role: Role, session_id: DbId, target_id: Option<DbId>) -> bool {
        let is_self = target_id == Some(session_id);
        match self {
            AccessPolicy::SuperAdminOnly => role == Role::SuperAdmin,
            AccessPolicy::AdminOnly => role == Role::Admin,
            AccessPolicy::SelfOnly => is_self,
            AccessPolicy::SuperAdminOrAdmin => matches!(role, Role::Admin | Role::SuperAdmin),
            AccessPolicy::SuperAdminOrSelf => role == Role::SuperAdmin || is_self,
            AccessPolicy::AdminOrSelf => role == Role::Admin || is_self,
        }
    }
}
