// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use std::sync::Arc;

use crate::access::{AccessEngine, BypassPolicy, RoleBypassPolicy};
use crate::admin::AdminController;
use crate::catalog::Catalog;
use crate::config::ValidatedConfig;
use crate::iam::UserDirectory;
use crate::public::ContentGate;
use crate::public::error::ErrorRenderer;
use crate::restrictions::{RestrictionSettings, StoreError, TermRestrictionStore};
use crate::roles::RoleCatalog;
use crate::runtime_paths::RuntimePaths;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

/// Services constructed once at startup and shared by every worker.
pub struct AppState {
    pub settings: Arc<RestrictionSettings>,
    pub roles: Arc<RoleCatalog>,
    pub catalog: Arc<Catalog>,
    pub users: Arc<dyn UserDirectory>,
    pub store: Arc<TermRestrictionStore>,
    pub bypass: Arc<dyn BypassPolicy>,
    pub engine: Arc<AccessEngine>,
    pub gate: Arc<ContentGate>,
    pub admin: Arc<AdminController>,
    pub templates: Arc<dyn TemplateEngine>,
    pub error_renderer: ErrorRenderer,
    pub runtime_paths: RuntimePaths,
}

impl AppState {
    pub fn new(
        config: &ValidatedConfig,
        runtime_paths: RuntimePaths,
        catalog: Catalog,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, StoreError> {
        let bypass = Arc::new(RoleBypassPolicy::new(config.restrictions.bypass_roles()));
        Self::with_bypass_policy(config, runtime_paths, catalog, users, bypass)
    }

    pub fn with_bypass_policy(
        config: &ValidatedConfig,
        runtime_paths: RuntimePaths,
        catalog: Catalog,
        users: Arc<dyn UserDirectory>,
        bypass: Arc<dyn BypassPolicy>,
    ) -> Result<Self, StoreError> {
        let settings = Arc::new(config.restrictions.clone());
        let roles = Arc::new(config.role_catalog());
        let catalog = Arc::new(catalog);

        let store = Arc::new(TermRestrictionStore::open(
            runtime_paths.restrictions_file.clone(),
            roles.clone(),
        )?);
        if catalog.term_ids().is_empty() {
            log::warn!("Catalog has no terms; skipping orphaned restriction cleanup");
        } else {
            store.prune_orphans(&catalog.term_ids())?;
        }

        let engine = Arc::new(AccessEngine::new(
            settings.clone(),
            roles.clone(),
            store.clone(),
            catalog.clone(),
            bypass.clone(),
        ));
        let gate = Arc::new(ContentGate::new(settings.clone(), engine.clone()));
        let admin = Arc::new(AdminController::new(
            settings.clone(),
            roles.clone(),
            catalog.clone(),
            users.clone(),
            store.clone(),
        ));

        Ok(Self {
            settings,
            roles,
            catalog,
            users,
            store,
            bypass,
            engine,
            gate,
            admin,
            templates: Arc::new(MiniJinjaEngine::new()),
            error_renderer: ErrorRenderer::new(config.app.name.clone()),
            runtime_paths,
        })
    }
}
