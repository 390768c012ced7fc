// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Library user roles.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, including administrative token revocation
/// - `Librarian` - Manages the catalogue and loans on behalf of members
/// - `Member` - Regular reader; the role every self-registered account gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Library staff
    Librarian,
    /// Regular library member
    Member,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::Librarian, Role::Librarian | Role::Member) => true,
            (Role::Member, Role::Member) => true,
            _ => false,
        }
    }
}

impl Default for Role {
    /// Default role is Member (least privilege for authenticated users).
    fn default() -> Self {
        Role::Member
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Librarian => write!(f, "librarian"),
            Role::Member => write!(f, "member"),
        }
    }
}
