// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::catalog::{ContentItem, Term};
use minijinja::{Value, context};

#[derive(Debug, Clone)]
pub struct ErrorPageContext {
    app_name: String,
}

impl ErrorPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemPageContext {
    app_name: String,
    title: String,
    excerpt: String,
    body: String,
    terms: Vec<String>,
}

impl ItemPageContext {
    pub fn new(app_name: &str, item: &ContentItem, terms: &[&Term]) -> Self {
        Self {
            app_name: app_name.to_string(),
            title: item.title.clone(),
            excerpt: item.excerpt.clone(),
            body: item.body.clone(),
            terms: terms.iter().map(|term| term.name.clone()).collect(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            title => &self.title,
            excerpt => &self.excerpt,
            body => &self.body,
            terms => &self.terms
        }
    }
}

/// Substitute view shown in place of an item the viewer may not see. Carries
/// nothing from the item itself.
#[derive(Debug, Clone)]
pub struct RestrictedPageContext {
    app_name: String,
    message: String,
}

impl RestrictedPageContext {
    pub fn new(app_name: &str, message: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            message => &self.message
        }
    }
}
