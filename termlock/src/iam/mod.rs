// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


mod avatar;
pub mod middleware;
mod store;
pub(crate) mod types;

pub use avatar::avatar_url;
pub use middleware::{Viewer, ViewerMiddlewareFactory, ViewerRequest, ViewerResolver};
pub use store::{FileUserDirectory, MAX_SEARCH_RESULTS, UserDirectory};
pub use types::{IamError, User, UserId};
