// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

pub const MAX_ROLE_COUNT: usize = 64;
pub const MAX_ROLE_CHARS: usize = 64;
pub const DEFAULT_ANONYMOUS_ROLE: &str = "anonymous";
const ANONYMOUS_ROLE_LABEL: &str = "Anonymous visitors";

pub type RoleId = String;

#[derive(Debug)]
pub struct RoleValidationError {
    message: String,
}

impl RoleValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RoleValidationError {}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub label: String,
}

impl RoleDefinition {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

pub fn default_role_definitions() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new("administrator", "Administrator"),
        RoleDefinition::new("editor", "Editor"),
        RoleDefinition::new("author", "Author"),
        RoleDefinition::new("contributor", "Contributor"),
        RoleDefinition::new("subscriber", "Subscriber"),
        RoleDefinition::new("shop_manager", "Shop Manager"),
        RoleDefinition::new("shop_accountant", "Shop Accountant"),
        RoleDefinition::new("shop_worker", "Shop Worker"),
        RoleDefinition::new("shop_vendor", "Shop Vendor"),
    ]
}

pub fn normalize_role(role: &str) -> Result<RoleId, RoleValidationError> {
    let trimmed = role.trim();
    if trimmed.is_empty() {
        return Err(RoleValidationError::new("Role is required"));
    }
    if trimmed.chars().count() > MAX_ROLE_CHARS {
        return Err(RoleValidationError::new(format!(
            "Role must be at most {} characters",
            MAX_ROLE_CHARS
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RoleValidationError::new(format!(
            "Role '{}' contains invalid characters",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

/// The host's known roles, plus the pseudo-role carried by anonymous viewers.
///
/// Restrictions may only grant access to roles listed here. A role that the
/// host removes after a restriction was saved stays in the stored record but
/// never matches a viewer again.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<RoleDefinition>,
    anonymous_role: RoleId,
}

impl RoleCatalog {
    pub fn new(roles: Vec<RoleDefinition>, anonymous_role: impl Into<RoleId>) -> Self {
        Self {
            roles,
            anonymous_role: anonymous_role.into(),
        }
    }

    pub fn anonymous_role(&self) -> &str {
        &self.anonymous_role
    }

    pub fn is_known(&self, role: &str) -> bool {
        role == self.anonymous_role || self.roles.iter().any(|entry| entry.id == role)
    }

    pub fn label_for(&self, role: &str) -> String {
        if role == self.anonymous_role {
            return ANONYMOUS_ROLE_LABEL.to_string();
        }
        self.roles
            .iter()
            .find(|entry| entry.id == role)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| role.to_string())
    }

    /// Every selectable role, host roles first and the anonymous role last.
    pub fn entries(&self) -> Vec<RoleDefinition> {
        let mut entries = self.roles.clone();
        entries.push(RoleDefinition::new(
            &self.anonymous_role,
            ANONYMOUS_ROLE_LABEL,
        ));
        entries
    }

    /// Splits `roles` into the known set and the ids that were dropped.
    pub fn retain_known(&self, roles: &[String]) -> (BTreeSet<RoleId>, Vec<String>) {
        let mut known = BTreeSet::new();
        let mut dropped = Vec::new();
        for role in roles {
            match normalize_role(role) {
                Ok(role) if self.is_known(&role) => {
                    known.insert(role);
                }
                _ => dropped.push(role.clone()),
            }
        }
        (known, dropped)
    }
}
