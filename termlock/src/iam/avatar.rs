// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use sha2::{Digest, Sha256};

const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar/";
const AVATAR_SIZE: u32 = 32;

/// Gravatar URL for `email`, keyed by the SHA-256 of the normalized address.
pub fn avatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "{}{}?s={}&d=mp",
        GRAVATAR_BASE,
        hex::encode(digest),
        AVATAR_SIZE
    )
}
