// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::bypass::BypassPolicy;
use crate::catalog::{Catalog, ContentItem, TermId};
use crate::iam::Viewer;
use crate::restrictions::{RestrictionSettings, TermRestriction, TermRestrictionStore};
use crate::roles::RoleCatalog;
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied { term_id: TermId, message: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Evaluates the restrictions attached to a content item against a viewer.
///
/// Every active restriction on a managed-taxonomy term attached to the item
/// must be passed; the first one that is not (in the item's term order)
/// produces the denial.
pub struct AccessEngine {
    settings: Arc<RestrictionSettings>,
    roles: Arc<RoleCatalog>,
    store: Arc<TermRestrictionStore>,
    catalog: Arc<Catalog>,
    bypass: Arc<dyn BypassPolicy>,
}

impl AccessEngine {
    pub fn new(
        settings: Arc<RestrictionSettings>,
        roles: Arc<RoleCatalog>,
        store: Arc<TermRestrictionStore>,
        catalog: Arc<Catalog>,
        bypass: Arc<dyn BypassPolicy>,
    ) -> Self {
        Self {
            settings,
            roles,
            store,
            catalog,
            bypass,
        }
    }

    pub fn can_view(&self, item: &ContentItem, viewer: &Viewer) -> bool {
        self.decide(item, viewer).is_allowed()
    }

    pub fn decide(&self, item: &ContentItem, viewer: &Viewer) -> AccessDecision {
        let bypass = self.bypass.bypasses(viewer);

        for term_id in &item.terms {
            let Some(term) = self.catalog.term(*term_id) else {
                debug!(
                    "Item {} references unknown term {}; skipping",
                    item.id, term_id
                );
                continue;
            };
            if !self.settings.is_managed_taxonomy(&term.taxonomy) {
                continue;
            }

            let restriction = self.store.get(term.id);
            if !restriction.active || bypass {
                continue;
            }
            if !self.passes(&restriction, viewer) {
                debug!(
                    "Viewer {:?} (role {}) denied item {} by term {}",
                    viewer.user_id, viewer.role, item.id, term.id
                );
                return AccessDecision::Denied {
                    term_id: term.id,
                    message: self.message_for(&restriction),
                };
            }
        }

        AccessDecision::Allowed
    }

    pub fn bypasses(&self, viewer: &Viewer) -> bool {
        self.bypass.bypasses(viewer)
    }

    fn passes(&self, restriction: &TermRestriction, viewer: &Viewer) -> bool {
        if let Some(user_id) = viewer.user_id
            && restriction.is_whitelisted(user_id)
        {
            return true;
        }
        restriction.allows_role(&viewer.role) && self.roles.is_known(&viewer.role)
    }

    fn message_for(&self, restriction: &TermRestriction) -> String {
        let message = restriction.denial_message.trim();
        if message.is_empty() {
            self.settings.default_message().to_string()
        } else {
            message.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::RoleBypassPolicy;
    use crate::catalog::Term;
    use crate::roles::{DEFAULT_ANONYMOUS_ROLE, RoleDefinition, default_role_definitions};
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::collections::BTreeSet;

    const CATEGORY_A: TermId = 1;
    const CATEGORY_B: TermId = 2;
    const TAG: TermId = 3;
    const FOREIGN: TermId = 4;

    struct Harness {
        _fixture: TestFixtureRoot,
        store: Arc<TermRestrictionStore>,
        engine: AccessEngine,
        catalog: Arc<Catalog>,
    }

    fn term(id: TermId, taxonomy: &str) -> Term {
        Term {
            id,
            taxonomy: taxonomy.to_string(),
            name: format!("Term {}", id),
            slug: format!("term-{}", id),
        }
    }

    fn item(id: u64, terms: Vec<TermId>) -> ContentItem {
        ContentItem {
            id,
            content_type: "download".to_string(),
            title: format!("Item {}", id),
            slug: format!("item-{}", id),
            excerpt: String::new(),
            body: String::new(),
            terms,
        }
    }

    fn harness_with_roles(roles: Vec<RoleDefinition>) -> Harness {
        let fixture = TestFixtureRoot::new_unique("engine").unwrap();
        let settings = Arc::new(RestrictionSettings::default());
        let role_catalog = Arc::new(RoleCatalog::new(roles, DEFAULT_ANONYMOUS_ROLE));
        let full_catalog = Arc::new(RoleCatalog::new(
            default_role_definitions(),
            DEFAULT_ANONYMOUS_ROLE,
        ));
        let store = Arc::new(
            TermRestrictionStore::open(fixture.path().join("restrictions.yaml"), full_catalog)
                .unwrap(),
        );
        let catalog = Arc::new(
            Catalog::from_parts(
                vec![
                    term(CATEGORY_A, "download_category"),
                    term(CATEGORY_B, "download_category"),
                    term(TAG, "download_tag"),
                    term(FOREIGN, "post_tag"),
                ],
                vec![item(10, vec![CATEGORY_A, TAG])],
            )
            .unwrap(),
        );
        let bypass = Arc::new(RoleBypassPolicy::new(settings.bypass_roles()));
        let engine = AccessEngine::new(
            settings,
            role_catalog,
            store.clone(),
            catalog.clone(),
            bypass,
        );
        Harness {
            _fixture: fixture,
            store,
            engine,
            catalog,
        }
    }

    fn harness() -> Harness {
        harness_with_roles(default_role_definitions())
    }

    fn restrict(store: &TermRestrictionStore, term_id: TermId, roles: &[&str], users: Vec<u64>) {
        store
            .save(
                term_id,
                TermRestriction {
                    active: true,
                    allowed_roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
                    whitelisted_users: users,
                    denial_message: String::new(),
                },
            )
            .unwrap();
    }

    fn viewers() -> Vec<Viewer> {
        vec![
            Viewer::anonymous(DEFAULT_ANONYMOUS_ROLE),
            Viewer::user(1, "subscriber", "Sub"),
            Viewer::user(2, "editor", "Ed"),
            Viewer::user(3, "administrator", "Admin"),
            Viewer::user(4, "", "No role"),
        ]
    }

    #[test]
    fn inactive_terms_allow_every_viewer() {
        let h = harness();
        h.store
            .save(
                CATEGORY_A,
                TermRestriction {
                    active: false,
                    allowed_roles: ["subscriber".to_string()].into_iter().collect(),
                    whitelisted_users: vec![],
                    denial_message: "nope".to_string(),
                },
            )
            .unwrap();
        let item = item(11, vec![CATEGORY_A, TAG]);
        for viewer in viewers() {
            assert!(h.engine.can_view(&item, &viewer), "{:?}", viewer);
        }
    }

    #[test]
    fn item_without_terms_is_unrestricted() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &[], vec![]);
        for viewer in viewers() {
            assert!(h.engine.can_view(&item(12, vec![]), &viewer));
        }
    }

    #[test]
    fn empty_active_restriction_admits_only_bypass() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &[], vec![]);
        let item = item(13, vec![CATEGORY_A]);
        for viewer in viewers() {
            let expected = viewer.role == "administrator";
            assert_eq!(h.engine.can_view(&item, &viewer), expected, "{:?}", viewer);
        }
    }

    #[test]
    fn whitelist_overrides_role_mismatch() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &["subscriber"], vec![42]);
        let item = item(14, vec![CATEGORY_A]);
        assert!(h.engine.can_view(&item, &Viewer::user(42, "editor", "Ed")));
        assert!(!h.engine.can_view(&item, &Viewer::user(43, "editor", "Other")));
    }

    #[test]
    fn anonymous_needs_explicit_grant() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &["subscriber"], vec![]);
        let item = item(15, vec![CATEGORY_A]);
        let anonymous = Viewer::anonymous(DEFAULT_ANONYMOUS_ROLE);
        assert!(!h.engine.can_view(&item, &anonymous));

        restrict(&h.store, CATEGORY_A, &["subscriber", DEFAULT_ANONYMOUS_ROLE], vec![]);
        assert!(h.engine.can_view(&item, &anonymous));
    }

    #[test]
    fn restrictions_combine_with_and_across_taxonomies() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &["subscriber"], vec![]);
        restrict(&h.store, TAG, &["editor"], vec![]);
        let item = item(16, vec![CATEGORY_A, TAG]);

        let decision = h.engine.decide(&item, &Viewer::user(1, "subscriber", "Sub"));
        assert_eq!(
            decision,
            AccessDecision::Denied {
                term_id: TAG,
                message: RestrictionSettings::default().default_message().to_string(),
            }
        );
        assert!(!h.engine.can_view(&item, &Viewer::user(2, "editor", "Ed")));
        assert!(h.engine.can_view(&item, &Viewer::user(3, "administrator", "Admin")));
    }

    #[test]
    fn first_denying_term_supplies_message() {
        let h = harness();
        h.store
            .save(
                CATEGORY_B,
                TermRestriction {
                    active: true,
                    allowed_roles: BTreeSet::new(),
                    whitelisted_users: vec![],
                    denial_message: "Buy the bundle first.".to_string(),
                },
            )
            .unwrap();
        restrict(&h.store, CATEGORY_A, &[], vec![]);
        let item = item(17, vec![CATEGORY_B, CATEGORY_A]);
        assert_eq!(
            h.engine.decide(&item, &Viewer::user(1, "subscriber", "Sub")),
            AccessDecision::Denied {
                term_id: CATEGORY_B,
                message: "Buy the bundle first.".to_string(),
            }
        );
    }

    #[test]
    fn unmanaged_taxonomies_are_ignored() {
        let h = harness();
        restrict(&h.store, FOREIGN, &[], vec![]);
        assert!(
            h.engine
                .can_view(&item(18, vec![FOREIGN]), &Viewer::user(1, "subscriber", "Sub"))
        );
    }

    #[test]
    fn deleted_role_never_matches() {
        let without_subscriber: Vec<RoleDefinition> = default_role_definitions()
            .into_iter()
            .filter(|role| role.id != "subscriber")
            .collect();
        let h = harness_with_roles(without_subscriber);
        restrict(&h.store, CATEGORY_A, &["subscriber"], vec![]);
        assert!(
            !h.engine
                .can_view(&item(19, vec![CATEGORY_A]), &Viewer::user(1, "subscriber", "Sub"))
        );
    }

    #[test]
    fn dangling_term_references_are_skipped() {
        let h = harness();
        restrict(&h.store, CATEGORY_A, &["subscriber"], vec![]);
        let item = item(20, vec![999, CATEGORY_A]);
        assert!(h.engine.can_view(&item, &Viewer::user(1, "subscriber", "Sub")));
        assert!(h.catalog.term(999).is_none());
    }
}
