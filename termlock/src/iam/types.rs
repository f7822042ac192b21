// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// A user record as provided by the host's user directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl User {
    /// Name shown in admin lists, falling back to the login.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.login
        } else {
            &self.name
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.login.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }

    pub(crate) fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        !needle.is_empty() && self.matches(&needle)
    }
}

#[derive(Debug, Clone)]
pub enum IamError {
    ConfigurationError(String),
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IamError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            IamError::FileError(msg) => write!(f, "File error: {}", msg),
            IamError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for IamError {}
