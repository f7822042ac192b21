// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::{BootstrapError, log_warning};
use crate::runtime_paths::RuntimePaths;
use std::path::Path;

/// Resolves the runtime layout and reports host files that are not there yet.
pub fn ensure_paths(root: &Path) -> Result<RuntimePaths, BootstrapError> {
    let runtime_paths = RuntimePaths::from_root(root).map_err(BootstrapError::Config)?;

    for (label, path) in [
        ("catalog", &runtime_paths.catalog_file),
        ("users", &runtime_paths.users_file),
    ] {
        if !path.exists() {
            log_warning(format!(
                "{} file {} is missing; starting with an empty {}",
                label,
                path.display(),
                label
            ));
        }
    }

    Ok(runtime_paths)
}
