// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{CatalogFile, ContentItem, ItemId, Term, TermId};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum CatalogError {
    FileError(String),
    ParseError(String),
    Invalid(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::FileError(msg) => write!(f, "Catalog file error: {}", msg),
            CatalogError::ParseError(msg) => write!(f, "Catalog parse error: {}", msg),
            CatalogError::Invalid(msg) => write!(f, "Invalid catalog: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only view of the host's taxonomy terms and content items.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    terms: Vec<Term>,
    items: Vec<ContentItem>,
    term_index: HashMap<TermId, usize>,
    item_index: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            warn!(
                "Catalog file {} not found; starting with an empty catalog",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: CatalogFile = serde_yaml::from_str(&content).map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Self::from_parts(file.terms, file.items)
    }

    pub fn from_parts(terms: Vec<Term>, items: Vec<ContentItem>) -> Result<Self, CatalogError> {
        let mut term_index = HashMap::with_capacity(terms.len());
        for (position, term) in terms.iter().enumerate() {
            if term.taxonomy.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "term {} has no taxonomy",
                    term.id
                )));
            }
            if term_index.insert(term.id, position).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate term id {}",
                    term.id
                )));
            }
        }

        let mut item_index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if item_index.insert(item.id, position).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate item id {}",
                    item.id
                )));
            }
            for term_id in &item.terms {
                if !term_index.contains_key(term_id) {
                    warn!("Item {} references unknown term {}", item.id, term_id);
                }
            }
        }

        debug!(
            "Catalog loaded with {} terms and {} items",
            terms.len(),
            items.len()
        );
        Ok(Self {
            terms,
            items,
            term_index,
            item_index,
        })
    }

    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.term_index.get(&id).map(|position| &self.terms[*position])
    }

    /// Looks up a term only if it belongs to `taxonomy`.
    pub fn term_in(&self, taxonomy: &str, id: TermId) -> Option<&Term> {
        self.term(id).filter(|term| term.taxonomy == taxonomy)
    }

    pub fn term_ids(&self) -> HashSet<TermId> {
        self.term_index.keys().copied().collect()
    }

    pub fn item(&self, id: ItemId) -> Option<&ContentItem> {
        self.item_index.get(&id).map(|position| &self.items[*position])
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Terms attached to `item`, in the item's order. Dangling ids are skipped.
    pub fn terms_for_item(&self, item: &ContentItem) -> Vec<&Term> {
        item.terms
            .iter()
            .filter_map(|term_id| {
                let term = self.term(*term_id);
                if term.is_none() {
                    debug!("Skipping unknown term {} on item {}", term_id, item.id);
                }
                term
            })
            .collect()
    }

    pub fn items_with_term(&self, term_id: TermId) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| item.terms.contains(&term_id))
            .collect()
    }

    /// Case-insensitive substring search over title, excerpt and body.
    pub fn search(&self, query: &str) -> Vec<&ContentItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item.excerpt.to_lowercase().contains(&needle)
                    || item.body.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
