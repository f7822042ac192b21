// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::access::{AccessDecision, AccessEngine};
use crate::catalog::ContentItem;
use crate::iam::Viewer;
use crate::restrictions::RestrictionSettings;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Visible,
    Restricted { message: String },
}

/// Enforcement point shared by listing, search and single-item display.
///
/// Items whose content type is not managed always pass. Decisions are made
/// per call against the current store contents.
pub struct ContentGate {
    settings: Arc<RestrictionSettings>,
    engine: Arc<AccessEngine>,
}

impl ContentGate {
    pub fn new(settings: Arc<RestrictionSettings>, engine: Arc<AccessEngine>) -> Self {
        Self { settings, engine }
    }

    pub fn is_managed(&self, item: &ContentItem) -> bool {
        self.settings.is_managed_content_type(&item.content_type)
    }

    pub fn check(&self, item: &ContentItem, viewer: &Viewer) -> bool {
        !self.is_managed(item) || self.engine.can_view(item, viewer)
    }

    /// Drops the items the viewer may not see, keeping the input order.
    pub fn filter_visible<'a, I>(&self, items: I, viewer: &Viewer) -> Vec<&'a ContentItem>
    where
        I: IntoIterator<Item = &'a ContentItem>,
    {
        items
            .into_iter()
            .filter(|item| self.check(item, viewer))
            .collect()
    }

    pub fn resolve(&self, item: &ContentItem, viewer: &Viewer) -> GateOutcome {
        if !self.is_managed(item) {
            return GateOutcome::Visible;
        }
        match self.engine.decide(item, viewer) {
            AccessDecision::Allowed => GateOutcome::Visible,
            AccessDecision::Denied { message, .. } => GateOutcome::Restricted { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::RoleBypassPolicy;
    use crate::catalog::{Catalog, Term};
    use crate::restrictions::{TermRestriction, TermRestrictionStore};
    use crate::roles::{DEFAULT_ANONYMOUS_ROLE, RoleCatalog, default_role_definitions};
    use crate::util::test_fixtures::TestFixtureRoot;

    fn item(id: u64, content_type: &str) -> ContentItem {
        ContentItem {
            id,
            content_type: content_type.to_string(),
            title: format!("Item {}", id),
            slug: String::new(),
            excerpt: String::new(),
            body: String::new(),
            terms: vec![1],
        }
    }

    fn gate(fixture: &TestFixtureRoot, items: Vec<ContentItem>) -> (ContentGate, Arc<Catalog>) {
        let settings = Arc::new(RestrictionSettings::default());
        let roles = Arc::new(RoleCatalog::new(
            default_role_definitions(),
            DEFAULT_ANONYMOUS_ROLE,
        ));
        let store = Arc::new(
            TermRestrictionStore::open(fixture.path().join("r.yaml"), roles.clone()).unwrap(),
        );
        store
            .save(
                1,
                TermRestriction {
                    active: true,
                    allowed_roles: ["subscriber".to_string()].into_iter().collect(),
                    whitelisted_users: vec![],
                    denial_message: "Subscribers only".to_string(),
                },
            )
            .unwrap();
        let catalog = Arc::new(
            Catalog::from_parts(
                vec![Term {
                    id: 1,
                    taxonomy: "download_category".to_string(),
                    name: "Premium".to_string(),
                    slug: "premium".to_string(),
                }],
                items,
            )
            .unwrap(),
        );
        let bypass = Arc::new(RoleBypassPolicy::new(settings.bypass_roles()));
        let engine = Arc::new(AccessEngine::new(
            settings.clone(),
            roles,
            store,
            catalog.clone(),
            bypass,
        ));
        (ContentGate::new(settings, engine), catalog)
    }

    #[test]
    fn unmanaged_content_types_always_pass() {
        let fixture = TestFixtureRoot::new_unique("gate-unmanaged").unwrap();
        let (gate, _) = gate(&fixture, vec![]);
        let post = item(1, "post");
        let anonymous = Viewer::anonymous(DEFAULT_ANONYMOUS_ROLE);
        assert!(!gate.is_managed(&post));
        assert!(gate.check(&post, &anonymous));
        assert_eq!(gate.resolve(&post, &anonymous), GateOutcome::Visible);
    }

    #[test]
    fn listing_and_single_view_agree() {
        let fixture = TestFixtureRoot::new_unique("gate-agree").unwrap();
        let (gate, catalog) = gate(&fixture, vec![item(1, "download"), item(2, "post")]);
        let anonymous = Viewer::anonymous(DEFAULT_ANONYMOUS_ROLE);
        let subscriber = Viewer::user(5, "subscriber", "Sub");

        let visible: Vec<u64> = gate
            .filter_visible(catalog.items(), &anonymous)
            .iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(visible, vec![2]);
        assert_eq!(gate.filter_visible(catalog.items(), &subscriber).len(), 2);

        let download = catalog.item(1).unwrap();
        assert_eq!(
            gate.resolve(download, &anonymous),
            GateOutcome::Restricted {
                message: "Subscribers only".to_string()
            }
        );
        assert_eq!(gate.resolve(download, &subscriber), GateOutcome::Visible);
    }
}
