// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::types::{IamError, User, UserId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Upper bound on whitelist candidates returned by a single search.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Read-only view of the host's users.
pub trait UserDirectory: Send + Sync {
    fn get(&self, id: UserId) -> Option<User>;
    /// Case-insensitive substring search, in directory order.
    fn search(&self, query: &str, limit: usize) -> Vec<User>;
}

/// Directory backed by an ordered YAML list of users.
pub struct FileUserDirectory {
    users_file: PathBuf,
    users: Vec<User>,
    by_id: HashMap<UserId, usize>,
}

impl FileUserDirectory {
    pub fn load(users_file: PathBuf) -> Result<Self, IamError> {
        if users_file.as_os_str().is_empty() {
            return Err(IamError::ConfigurationError(
                "Users file path is empty".to_string(),
            ));
        }

        let users = match std::fs::read_to_string(&users_file) {
            Ok(content) => Self::parse_users(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Users file {} not found; the user directory is empty",
                    users_file.display()
                );
                Vec::new()
            }
            Err(err) => {
                return Err(IamError::FileError(format!(
                    "Failed to read users file: {}",
                    err
                )));
            }
        };

        Self::from_users(users_file, users)
    }

    pub fn from_users(users_file: PathBuf, users: Vec<User>) -> Result<Self, IamError> {
        let mut by_id = HashMap::with_capacity(users.len());
        for (index, user) in users.iter().enumerate() {
            if by_id.insert(user.id, index).is_some() {
                return Err(IamError::ParseError(format!(
                    "Duplicate user id {} in users file",
                    user.id
                )));
            }
        }
        log::info!("Loaded {} users from {}", users.len(), users_file.display());
        Ok(Self {
            users_file,
            users,
            by_id,
        })
    }

    pub fn users_file(&self) -> &Path {
        &self.users_file
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn parse_users(content: &str) -> Result<Vec<User>, IamError> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(content)
            .map_err(|e| IamError::ParseError(format!("Failed to parse users file: {}", e)))
    }
}

impl UserDirectory for FileUserDirectory {
    fn get(&self, id: UserId) -> Option<User> {
        self.by_id
            .get(&id)
            .and_then(|index| self.users.get(*index))
            .cloned()
    }

    fn search(&self, query: &str, limit: usize) -> Vec<User> {
        self.users
            .iter()
            .filter(|user| user.matches_query(query))
            .take(limit.min(MAX_SEARCH_RESULTS))
            .cloned()
            .collect()
    }
}
