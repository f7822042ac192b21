// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}

/// Reads a YAML document, treating a missing or blank file as absent.
pub(crate) fn read_yaml<T: DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|err| StoreError::new(format!("Failed to read {} file: {}", label, err)))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|err| StoreError::new(format!("Failed to parse {} file: {}", label, err)))
}

/// Replaces `path` with the YAML encoding of `value` via write, fsync and rename.
pub(crate) fn write_yaml_atomic<T: Serialize>(
    path: &Path,
    label: &str,
    value: &T,
) -> Result<(), StoreError> {
    let content = serde_yaml::to_string(value)
        .map_err(|err| StoreError::new(format!("Failed to serialize {}: {}", label, err)))?;
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::new(format!("The {} file path has no parent", label)))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::new(format!("The {} file name is not valid UTF-8", label)))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name, label)?;

    let written = file
        .write_all(content.as_bytes())
        .and_then(|_| file.sync_all())
        .and_then(|_| fs::rename(&temp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::new(format!(
            "Failed to replace {} file: {}",
            label, err
        )));
    }

    #[cfg(unix)]
    {
        if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
            log::warn!("Directory sync for {} failed: {}", label, err);
        }
    }

    Ok(())
}

fn create_temp_file(
    parent: &Path,
    file_name: &str,
    label: &str,
) -> Result<(fs::File, PathBuf), StoreError> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = parent.join(format!(
            ".{}.tmp.{}.{}",
            file_name,
            std::process::id(),
            attempt
        ));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::new(format!(
                    "Failed to create temp {} file: {}",
                    label, err
                )));
            }
        }
    }
    Err(StoreError::new(format!(
        "Failed to create temp {} file after {} attempts",
        label, MAX_TEMP_ATTEMPTS
    )))
}
