// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::roles::RoleId;

pub const DEFAULT_TAXONOMIES: [(&str, &str); 2] = [
    ("download_category", "Download Categories"),
    ("download_tag", "Download Tags"),
];
pub const DEFAULT_CONTENT_TYPE: &str = "download";
pub const DEFAULT_BYPASS_ROLE: &str = "administrator";
pub const DEFAULT_DENIAL_MESSAGE: &str = "This content is restricted to certain users.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedTaxonomy {
    pub slug: String,
    pub label: Option<String>,
}

impl ManagedTaxonomy {
    pub fn new(slug: impl Into<String>, label: Option<String>) -> Self {
        Self {
            slug: slug.into(),
            label,
        }
    }

    /// Display label, falling back to the slug when none is configured.
    pub fn label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.slug,
        }
    }
}

/// Which taxonomies carry restrictions and which content types honor them.
///
/// Built once from the validated config and shared by every service.
#[derive(Debug, Clone)]
pub struct RestrictionSettings {
    taxonomies: Vec<ManagedTaxonomy>,
    content_types: Vec<String>,
    bypass_roles: Vec<RoleId>,
    anonymous_role: RoleId,
    default_message: String,
}

impl RestrictionSettings {
    pub fn new(
        taxonomies: Vec<ManagedTaxonomy>,
        content_types: Vec<String>,
        bypass_roles: Vec<RoleId>,
        anonymous_role: RoleId,
        default_message: String,
    ) -> Self {
        Self {
            taxonomies,
            content_types,
            bypass_roles,
            anonymous_role,
            default_message,
        }
    }

    pub fn with_taxonomy(mut self, slug: &str, label: Option<&str>) -> Self {
        if !self.is_managed_taxonomy(slug) {
            self.taxonomies
                .push(ManagedTaxonomy::new(slug, label.map(str::to_string)));
        }
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        if !self.is_managed_content_type(content_type) {
            self.content_types.push(content_type.to_string());
        }
        self
    }

    pub fn taxonomies(&self) -> &[ManagedTaxonomy] {
        &self.taxonomies
    }

    pub fn taxonomy(&self, slug: &str) -> Option<&ManagedTaxonomy> {
        self.taxonomies.iter().find(|taxonomy| taxonomy.slug == slug)
    }

    pub fn is_managed_taxonomy(&self, slug: &str) -> bool {
        self.taxonomy(slug).is_some()
    }

    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }

    pub fn is_managed_content_type(&self, content_type: &str) -> bool {
        self.content_types.iter().any(|managed| managed == content_type)
    }

    pub fn bypass_roles(&self) -> &[RoleId] {
        &self.bypass_roles
    }

    pub fn anonymous_role(&self) -> &str {
        &self.anonymous_role
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }
}

impl Default for RestrictionSettings {
    fn default() -> Self {
        Self {
            taxonomies: DEFAULT_TAXONOMIES
                .iter()
                .map(|(slug, label)| ManagedTaxonomy::new(*slug, Some(label.to_string())))
                .collect(),
            content_types: vec![DEFAULT_CONTENT_TYPE.to_string()],
            bypass_roles: vec![DEFAULT_BYPASS_ROLE.to_string()],
            anonymous_role: crate::roles::DEFAULT_ANONYMOUS_ROLE.to_string(),
            default_message: DEFAULT_DENIAL_MESSAGE.to_string(),
        }
    }
}
