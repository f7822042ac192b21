// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::iam::Viewer;
use crate::roles::RoleId;
use std::collections::BTreeSet;

/// Decides whether a viewer skips every restriction check.
pub trait BypassPolicy: Send + Sync {
    fn bypasses(&self, viewer: &Viewer) -> bool;
}

/// Grants bypass to signed-in viewers holding one of the configured roles.
#[derive(Debug, Clone)]
pub struct RoleBypassPolicy {
    roles: BTreeSet<RoleId>,
}

impl RoleBypassPolicy {
    pub fn new(roles: &[RoleId]) -> Self {
        Self {
            roles: roles.iter().cloned().collect(),
        }
    }
}

impl BypassPolicy for RoleBypassPolicy {
    fn bypasses(&self, viewer: &Viewer) -> bool {
        !viewer.is_anonymous() && self.roles.contains(&viewer.role)
    }
}
