// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::ajax;
use super::controller::{AdminError, TermPanelForm};
use super::middleware::RequireBypassMiddleware;
use crate::access::BypassPolicy;
use crate::app_state::AppState;
use crate::catalog::TermId;
use crate::iam::UserId;
use crate::public::error::{json_error, no_store};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound for admin JSON bodies.
const MAX_ADMIN_JSON_BYTES: usize = 64 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig, admin_path: &str, bypass: Arc<dyn BypassPolicy>) {
    cfg.service(
        web::scope(admin_path)
            .wrap(RequireBypassMiddleware::new(bypass))
            .app_data(json_config())
            .route("/roles", web::get().to(list_roles))
            .route("/taxonomies", web::get().to(list_taxonomies))
            .route("/terms/{taxonomy}/{term_id}", web::get().to(get_term))
            .route("/terms/{taxonomy}/{term_id}", web::put().to(save_term))
            .route("/terms/{taxonomy}/{term_id}", web::delete().to(clear_term))
            .route(
                "/terms/{taxonomy}/{term_id}/whitelist/remove",
                web::post().to(remove_whitelisted),
            )
            .configure(|cfg| ajax::configure(cfg, "/ajax")),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_ADMIN_JSON_BYTES)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            let response = json_error(StatusCode::BAD_REQUEST, &message);
            InternalError::from_response(err, response).into()
        })
}

/// Maps controller failures onto JSON error responses. Persistence details
/// stay in the server log.
pub(crate) fn admin_error_response(operation: &str, err: AdminError) -> HttpResponse {
    match err {
        AdminError::InvalidRequest(msg) => json_error(StatusCode::BAD_REQUEST, &msg),
        AdminError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, &msg),
        AdminError::Storage(err) => {
            log::error!("Failed to {}: {}", operation, err);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            )
        }
    }
}

pub(crate) fn parse_id<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, AdminError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AdminError::InvalidRequest(format!("Parameter '{}' must be numeric", field)))
}

#[derive(Debug, Deserialize)]
pub struct RemoveUsersRequest {
    pub user_ids: Vec<UserId>,
}

async fn list_roles(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(no_store(StatusCode::OK).json(app_state.admin.role_labels()))
}

async fn list_taxonomies(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(no_store(StatusCode::OK).json(app_state.admin.taxonomies()))
}

async fn get_term(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (taxonomy, raw_term_id) = path.into_inner();
    let result = parse_id::<TermId>("term_id", &raw_term_id)
        .and_then(|term_id| app_state.admin.term_panel(&taxonomy, term_id));
    Ok(match result {
        Ok(panel) => no_store(StatusCode::OK).json(panel),
        Err(err) => admin_error_response("load term panel", err),
    })
}

async fn save_term(
    path: web::Path<(String, String)>,
    form: web::Json<TermPanelForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (taxonomy, raw_term_id) = path.into_inner();
    let result = parse_id::<TermId>("term_id", &raw_term_id)
        .and_then(|term_id| app_state.admin.save_panel(&taxonomy, term_id, form.into_inner()));
    Ok(match result {
        Ok(panel) => {
            log::info!(
                "Restriction panel saved for {} term {}",
                panel.taxonomy,
                panel.term_id
            );
            no_store(StatusCode::OK).json(panel)
        }
        Err(err) => admin_error_response("save term restriction", err),
    })
}

async fn clear_term(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (taxonomy, raw_term_id) = path.into_inner();
    let result = parse_id::<TermId>("term_id", &raw_term_id)
        .and_then(|term_id| app_state.admin.clear_panel(&taxonomy, term_id));
    Ok(match result {
        Ok(panel) => no_store(StatusCode::OK).json(panel),
        Err(err) => admin_error_response("clear term restriction", err),
    })
}

async fn remove_whitelisted(
    path: web::Path<(String, String)>,
    body: web::Json<RemoveUsersRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (taxonomy, raw_term_id) = path.into_inner();
    let result = parse_id::<TermId>("term_id", &raw_term_id).and_then(|term_id| {
        app_state
            .admin
            .remove_whitelisted(&taxonomy, term_id, &body.user_ids)
    });
    Ok(match result {
        Ok(panel) => no_store(StatusCode::OK).json(panel),
        Err(err) => admin_error_response("remove whitelisted users", err),
    })
}
