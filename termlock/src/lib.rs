// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


pub mod access;
pub mod admin;
pub mod app_state;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod iam;
pub mod public;
pub mod restrictions;
pub mod roles;
pub mod runtime_paths;
pub mod templates;
pub mod util;

/// Mount point of the admin controller routes.
pub const ADMIN_PATH: &str = "/admin";
