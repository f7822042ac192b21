// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::iam::UserId;
use crate::roles::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Restriction settings attached to one taxonomy term.
///
/// An inactive record imposes nothing. An active record with no roles and no
/// whitelisted users admits only bypass viewers.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TermRestriction {
    pub active: bool,
    #[serde(rename = "roles")]
    pub allowed_roles: BTreeSet<RoleId>,
    #[serde(rename = "whitelist")]
    pub whitelisted_users: Vec<UserId>,
    #[serde(rename = "message")]
    pub denial_message: String,
}

impl TermRestriction {
    pub fn is_whitelisted(&self, user_id: UserId) -> bool {
        self.whitelisted_users.contains(&user_id)
    }

    pub fn allows_role(&self, role: &str) -> bool {
        self.allowed_roles.contains(role)
    }
}

/// Removes repeated user ids, keeping the first occurrence of each.
pub(crate) fn dedupe_users(users: &[UserId]) -> Vec<UserId> {
    let mut seen = BTreeSet::new();
    users
        .iter()
        .copied()
        .filter(|user_id| seen.insert(*user_id))
        .collect()
}
