// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::config::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const CATALOG_FILE_NAME: &str = "catalog.yaml";
pub const USERS_FILE_NAME: &str = "users.yaml";
pub const RESTRICTIONS_FILE_NAME: &str = "term_restrictions.yaml";

/// Resolved locations inside a runtime root.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub catalog_file: PathBuf,
    pub users_file: PathBuf,
    pub state_dir: PathBuf,
    pub restrictions_file: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = canonicalize(&root_path, "runtime root")?;
        let state_dir = root_canonical.join("state");
        ensure_dir_exists(&state_dir)?;
        let state_dir = canonicalize(&state_dir, "state directory")?;

        Ok(Self {
            config_file: root_canonical.join(CONFIG_FILE_NAME),
            catalog_file: root_canonical.join(CATALOG_FILE_NAME),
            users_file: root_canonical.join(USERS_FILE_NAME),
            restrictions_file: state_dir.join(RESTRICTIONS_FILE_NAME),
            root: root_canonical,
            state_dir,
        })
    }
}

fn canonicalize(path: &Path, what: &str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize {} '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    ensure_dir_writable(path, "Directory must be writable")
}

fn ensure_dir_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a directory): {}",
            context,
            path.display()
        )));
    }

    let probe_path = path.join(format!(".termlock-write-check-{}", Uuid::new_v4()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe_path)
    {
        Ok(_) => fs::remove_file(&probe_path).map_err(|err| {
            ConfigError::ValidationError(format!(
                "{} (unable to clean probe file {}): {}",
                context,
                probe_path.display(),
                err
            ))
        }),
        Err(err) => Err(ConfigError::ValidationError(format!(
            "{} ({}): {}",
            context,
            path.display(),
            err
        ))),
    }
}
