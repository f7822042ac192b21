// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};

pub type TermId = u64;
pub type ItemId = u64;

/// A category/tag-like classification owned by the host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ContentItem {
    pub id: ItemId,
    pub content_type: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub terms: Vec<TermId>,
}

// Structure matching the catalog.yaml file format
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(super) struct CatalogFile {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}
