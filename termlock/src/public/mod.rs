// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;

pub mod error;
pub mod gate;
pub mod handlers;

pub use gate::{ContentGate, GateOutcome};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .route("/api/items", web::get().to(handlers::list_items))
        .route("/api/items/{id}", web::get().to(handlers::item_json))
        .route("/api/search", web::get().to(handlers::search_items))
        .route("/items/{id}", web::get().to(handlers::item_page));
}

/// Malformed query strings answer with the JSON error shape instead of
/// actix's plain-text default.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query parameters: {}", err);
        let response = error::json_error(StatusCode::BAD_REQUEST, &message);
        InternalError::from_response(err, response).into()
    })
}
