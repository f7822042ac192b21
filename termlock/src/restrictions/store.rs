// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{TermRestriction, dedupe_users};
use super::yaml_store::{self, StoreError};
use crate::catalog::TermId;
use crate::iam::UserId;
use crate::roles::RoleCatalog;
use log::{error, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const STORE_LABEL: &str = "term restrictions";

type Records = BTreeMap<TermId, TermRestriction>;

/// Per-term restriction metadata, persisted as one YAML document.
///
/// Every mutation runs under the write lock: the updated map is written to
/// disk first and only then swapped in, so readers observe either the old or
/// the new record and never a partial save.
pub struct TermRestrictionStore {
    file: PathBuf,
    roles: Arc<RoleCatalog>,
    records: RwLock<Records>,
}

impl TermRestrictionStore {
    pub fn open(file: PathBuf, roles: Arc<RoleCatalog>) -> Result<Self, StoreError> {
        let records = Self::load_from_disk(&file)?;
        Ok(Self {
            file,
            roles,
            records: RwLock::new(records),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Stored settings for `term_id`, or the inactive default.
    pub fn get(&self, term_id: TermId) -> TermRestriction {
        let records = match self.records.read() {
            Ok(records) => records,
            Err(poisoned) => {
                error!("🚨 CRITICAL: term restriction lock poisoned in get");
                poisoned.into_inner()
            }
        };
        records.get(&term_id).cloned().unwrap_or_default()
    }

    pub fn records(&self) -> Records {
        match self.records.read() {
            Ok(records) => records.clone(),
            Err(poisoned) => {
                error!("🚨 CRITICAL: term restriction lock poisoned in records");
                poisoned.into_inner().clone()
            }
        }
    }

    /// Replaces the settings for `term_id`. Unknown roles are dropped, the
    /// whitelist is de-duplicated and the message trimmed.
    pub fn save(
        &self,
        term_id: TermId,
        settings: TermRestriction,
    ) -> Result<TermRestriction, StoreError> {
        let role_ids: Vec<String> = settings.allowed_roles.iter().cloned().collect();
        let (allowed_roles, dropped) = self.roles.retain_known(&role_ids);
        if !dropped.is_empty() {
            warn!(
                "Dropping unknown roles {:?} from restriction on term {}",
                dropped, term_id
            );
        }
        let record = TermRestriction {
            active: settings.active,
            allowed_roles,
            whitelisted_users: dedupe_users(&settings.whitelisted_users),
            denial_message: settings.denial_message.trim().to_string(),
        };

        let saved = record.clone();
        self.mutate(|records| {
            let changed = records.get(&term_id) != Some(&record);
            records.insert(term_id, record);
            ((), changed)
        })?;
        info!(
            "Saved restriction for term {} (active: {}, roles: {}, users: {})",
            term_id,
            saved.active,
            saved.allowed_roles.len(),
            saved.whitelisted_users.len()
        );
        Ok(saved)
    }

    /// Appends `user_id` to the term's whitelist. Returns `false` when the
    /// user was already present and nothing changed.
    pub fn add_whitelisted_user(
        &self,
        term_id: TermId,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        let added = self.mutate(|records| {
            let record = records.entry(term_id).or_default();
            if record.is_whitelisted(user_id) {
                return (false, false);
            }
            record.whitelisted_users.push(user_id);
            (true, true)
        })?;
        if added {
            info!("Whitelisted user {} on term {}", user_id, term_id);
        }
        Ok(added)
    }

    /// Removes every listed user from the term's whitelist and returns how
    /// many entries were removed. Ids that are not present are ignored.
    pub fn remove_whitelisted_users(
        &self,
        term_id: TermId,
        user_ids: &[UserId],
    ) -> Result<usize, StoreError> {
        let removed = self.mutate(|records| {
            let Some(record) = records.get_mut(&term_id) else {
                return (0, false);
            };
            let before = record.whitelisted_users.len();
            record
                .whitelisted_users
                .retain(|user_id| !user_ids.contains(user_id));
            let removed = before - record.whitelisted_users.len();
            (removed, removed > 0)
        })?;
        if removed > 0 {
            info!("Removed {} whitelisted users from term {}", removed, term_id);
        }
        Ok(removed)
    }

    pub fn delete(&self, term_id: TermId) -> Result<bool, StoreError> {
        self.mutate(|records| {
            let removed = records.remove(&term_id).is_some();
            (removed, removed)
        })
    }

    /// Drops records for terms the host no longer knows about.
    pub fn prune_orphans(&self, known_terms: &HashSet<TermId>) -> Result<Vec<TermId>, StoreError> {
        let pruned = self.mutate(|records| {
            let orphans: Vec<TermId> = records
                .keys()
                .filter(|term_id| !known_terms.contains(term_id))
                .copied()
                .collect();
            for term_id in &orphans {
                records.remove(term_id);
            }
            let changed = !orphans.is_empty();
            (orphans, changed)
        })?;
        if !pruned.is_empty() {
            warn!("Pruned restrictions for deleted terms {:?}", pruned);
        }
        Ok(pruned)
    }

    fn mutate<R>(&self, apply: impl FnOnce(&mut Records) -> (R, bool)) -> Result<R, StoreError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::new("Term restriction store lock poisoned"))?;
        let mut updated = guard.clone();
        let (result, changed) = apply(&mut updated);
        if changed {
            yaml_store::write_yaml_atomic(&self.file, STORE_LABEL, &updated)?;
            *guard = updated;
        }
        Ok(result)
    }

    fn load_from_disk(file: &Path) -> Result<Records, StoreError> {
        let raw: Option<Records> = yaml_store::read_yaml(file, STORE_LABEL)?;
        let mut records = raw.unwrap_or_default();
        for record in records.values_mut() {
            record.whitelisted_users = dedupe_users(&record.whitelisted_users);
        }
        Ok(records)
    }
}
