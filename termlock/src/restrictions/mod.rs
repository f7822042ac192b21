// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod settings;
mod store;
mod types;
pub(crate) mod yaml_store;

pub use settings::{ManagedTaxonomy, RestrictionSettings};
pub use store::TermRestrictionStore;
pub use types::TermRestriction;
pub use yaml_store::StoreError;
