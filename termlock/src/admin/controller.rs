// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::catalog::{Catalog, Term, TermId};
use crate::iam::{MAX_SEARCH_RESULTS, User, UserDirectory, UserId, avatar_url};
use crate::restrictions::{RestrictionSettings, StoreError, TermRestriction, TermRestrictionStore};
use crate::roles::{RoleCatalog, RoleDefinition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Minimum number of characters a user search must carry.
pub const MIN_SEARCH_CHARS: usize = 3;

#[derive(Debug)]
pub enum AdminError {
    InvalidRequest(String),
    NotFound(String),
    Storage(StoreError),
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminError::InvalidRequest(msg) => write!(f, "{}", msg),
            AdminError::NotFound(msg) => write!(f, "{}", msg),
            AdminError::Storage(err) => write!(f, "Failed to persist restriction: {}", err),
        }
    }
}

impl std::error::Error for AdminError {}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        AdminError::Storage(err)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaxonomySummary {
    pub slug: String,
    pub label: String,
}

/// Display-ready user row, as shown in the whitelist table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: UserId,
    pub name: String,
    pub role: String,
    pub email: String,
    pub avatar: String,
}

/// One whitelist candidate returned by a user search.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserCandidate {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddUserOutcome {
    Added(UserSummary),
    AlreadyPresent { user_id: UserId },
}

/// Term edit panel state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TermPanel {
    pub taxonomy: String,
    pub taxonomy_label: String,
    pub term_id: TermId,
    pub term_name: String,
    pub active: bool,
    pub allowed_roles: Vec<String>,
    pub message: String,
    pub whitelist: Vec<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TermPanelForm {
    pub active: bool,
    pub allowed_roles: Vec<String>,
    pub whitelisted_users: Vec<UserId>,
    pub message: String,
}

/// Admin-side operations over the restriction store.
///
/// Taxonomy, term and user identifiers are all resolved against the host
/// before the store is touched.
pub struct AdminController {
    settings: Arc<RestrictionSettings>,
    roles: Arc<RoleCatalog>,
    catalog: Arc<Catalog>,
    users: Arc<dyn UserDirectory>,
    store: Arc<TermRestrictionStore>,
}

impl AdminController {
    pub fn new(
        settings: Arc<RestrictionSettings>,
        roles: Arc<RoleCatalog>,
        catalog: Arc<Catalog>,
        users: Arc<dyn UserDirectory>,
        store: Arc<TermRestrictionStore>,
    ) -> Self {
        Self {
            settings,
            roles,
            catalog,
            users,
            store,
        }
    }

    pub fn role_labels(&self) -> Vec<RoleDefinition> {
        self.roles.entries()
    }

    pub fn taxonomies(&self) -> Vec<TaxonomySummary> {
        self.settings
            .taxonomies()
            .iter()
            .map(|taxonomy| TaxonomySummary {
                slug: taxonomy.slug.clone(),
                label: taxonomy.label().to_string(),
            })
            .collect()
    }

    pub fn term_panel(&self, taxonomy: &str, term_id: TermId) -> Result<TermPanel, AdminError> {
        let term = self.managed_term(taxonomy, term_id)?;
        Ok(self.panel_for(term, self.store.get(term_id)))
    }

    pub fn save_panel(
        &self,
        taxonomy: &str,
        term_id: TermId,
        form: TermPanelForm,
    ) -> Result<TermPanel, AdminError> {
        let term = self.managed_term(taxonomy, term_id)?;
        let (whitelisted_users, unknown): (Vec<UserId>, Vec<UserId>) = form
            .whitelisted_users
            .into_iter()
            .partition(|user_id| self.users.get(*user_id).is_some());
        if !unknown.is_empty() {
            log::warn!(
                "Dropping unknown users {:?} from whitelist on term {}",
                unknown, term_id
            );
        }
        let saved = self.store.save(
            term_id,
            TermRestriction {
                active: form.active,
                allowed_roles: form.allowed_roles.into_iter().collect(),
                whitelisted_users,
                denial_message: form.message,
            },
        )?;
        Ok(self.panel_for(term, saved))
    }

    /// Removes the stored restriction, returning the panel in its default state.
    pub fn clear_panel(&self, taxonomy: &str, term_id: TermId) -> Result<TermPanel, AdminError> {
        let term = self.managed_term(taxonomy, term_id)?;
        if self.store.delete(term_id)? {
            log::info!("Cleared restriction on term {}", term_id);
        }
        Ok(self.panel_for(term, TermRestriction::default()))
    }

    pub fn remove_whitelisted(
        &self,
        taxonomy: &str,
        term_id: TermId,
        user_ids: &[UserId],
    ) -> Result<TermPanel, AdminError> {
        let term = self.managed_term(taxonomy, term_id)?;
        self.store.remove_whitelisted_users(term_id, user_ids)?;
        Ok(self.panel_for(term, self.store.get(term_id)))
    }

    /// Whitelist candidates matching `query`. Users already whitelisted on
    /// `term_id` are still returned, flagged as disabled.
    pub fn search_users(
        &self,
        query: &str,
        term_id: Option<TermId>,
    ) -> Result<Vec<UserCandidate>, AdminError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Err(AdminError::InvalidRequest(format!(
                "Search query must be at least {} characters",
                MIN_SEARCH_CHARS
            )));
        }

        let restriction = term_id.map(|term_id| self.store.get(term_id));
        Ok(self
            .users
            .search(query, MAX_SEARCH_RESULTS)
            .into_iter()
            .map(|user| UserCandidate {
                disabled: restriction
                    .as_ref()
                    .is_some_and(|restriction| restriction.is_whitelisted(user.id)),
                id: user.id,
                name: user.display_name().to_string(),
                role: self.roles.label_for(&user.role),
                avatar_url: avatar_url(&user.email),
                email: user.email,
            })
            .collect())
    }

    pub fn resolve_and_add(
        &self,
        taxonomy: &str,
        term_id: TermId,
        user_id: UserId,
    ) -> Result<AddUserOutcome, AdminError> {
        self.managed_term(taxonomy, term_id)?;
        let user = self
            .users
            .get(user_id)
            .ok_or_else(|| AdminError::NotFound(format!("User {} not found", user_id)))?;

        if self.store.add_whitelisted_user(term_id, user_id)? {
            Ok(AddUserOutcome::Added(self.summarize(&user)))
        } else {
            Ok(AddUserOutcome::AlreadyPresent { user_id })
        }
    }

    fn managed_term(&self, taxonomy: &str, term_id: TermId) -> Result<&Term, AdminError> {
        if !self.settings.is_managed_taxonomy(taxonomy) {
            return Err(AdminError::NotFound(format!(
                "Taxonomy '{}' is not managed",
                taxonomy
            )));
        }
        self.catalog.term_in(taxonomy, term_id).ok_or_else(|| {
            AdminError::NotFound(format!("Term {} not found in '{}'", term_id, taxonomy))
        })
    }

    fn panel_for(&self, term: &Term, restriction: TermRestriction) -> TermPanel {
        let taxonomy_label = self
            .settings
            .taxonomy(&term.taxonomy)
            .map(|taxonomy| taxonomy.label().to_string())
            .unwrap_or_else(|| term.taxonomy.clone());
        let whitelist = restriction
            .whitelisted_users
            .iter()
            .map(|user_id| match self.users.get(*user_id) {
                Some(user) => self.summarize(&user),
                None => UserSummary {
                    user_id: *user_id,
                    name: String::new(),
                    role: String::new(),
                    email: String::new(),
                    avatar: String::new(),
                },
            })
            .collect();

        TermPanel {
            taxonomy: term.taxonomy.clone(),
            taxonomy_label,
            term_id: term.id,
            term_name: term.name.clone(),
            active: restriction.active,
            allowed_roles: restriction.allowed_roles.into_iter().collect(),
            message: restriction.denial_message,
            whitelist,
        }
    }

    fn summarize(&self, user: &User) -> UserSummary {
        UserSummary {
            user_id: user.id,
            name: user.display_name().to_string(),
            role: self.roles.label_for(&user.role),
            email: user.email.clone(),
            avatar: avatar_url(&user.email),
        }
    }
}
