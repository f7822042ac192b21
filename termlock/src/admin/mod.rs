// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


mod ajax;
pub mod controller;
pub mod handlers;
pub mod middleware;

pub use controller::{
    AddUserOutcome, AdminController, AdminError, TaxonomySummary, TermPanel, TermPanelForm,
    UserCandidate, UserSummary,
};
pub use handlers::configure;
