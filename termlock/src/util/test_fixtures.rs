// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::runtime_paths::{
    CATALOG_FILE_NAME, CONFIG_FILE_NAME, RESTRICTIONS_FILE_NAME, RuntimePaths, USERS_FILE_NAME,
};

/// Scratch runtime root under `target/test-fixtures`, removed on drop.
#[derive(Debug)]
pub struct TestFixtureRoot {
    path: PathBuf,
}

impl TestFixtureRoot {
    pub fn new_fixed(name: &str) -> std::io::Result<Self> {
        let root = fixtures_root().join(name);
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self { path: root })
    }

    pub fn new_unique(prefix: &str) -> std::io::Result<Self> {
        let name = format!("{}-{}", prefix, Uuid::new_v4());
        Self::new_fixed(&name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_file(&self) -> PathBuf {
        self.path.join(CONFIG_FILE_NAME)
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.path.join(CATALOG_FILE_NAME)
    }

    pub fn users_file(&self) -> PathBuf {
        self.path.join(USERS_FILE_NAME)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path.join("state")
    }

    pub fn restrictions_file(&self) -> PathBuf {
        self.state_dir().join(RESTRICTIONS_FILE_NAME)
    }

    pub fn write_catalog(&self, yaml: &str) -> std::io::Result<()> {
        fs::write(self.catalog_file(), yaml)
    }

    pub fn write_users(&self, yaml: &str) -> std::io::Result<()> {
        fs::write(self.users_file(), yaml)
    }

    pub fn runtime_paths(&self) -> std::io::Result<RuntimePaths> {
        RuntimePaths::from_root(&self.path).map_err(|err| std::io::Error::other(err.to_string()))
    }
}

impl Drop for TestFixtureRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn fixtures_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    repo_root.join("target").join("test-fixtures")
}
