// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::controller::{AddUserOutcome, AdminError, UserCandidate};
use super::handlers::{admin_error_response, parse_id};
use crate::app_state::AppState;
use crate::catalog::TermId;
use crate::iam::UserId;
use crate::public::error::no_store;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig, base_path: &str) {
    cfg.route(
        &format!("{}/search-users", base_path),
        web::get().to(search_users),
    )
    .route(
        &format!("{}/add-user", base_path),
        web::get().to(add_user_query),
    )
    .route(
        &format!("{}/add-user", base_path),
        web::post().to(add_user_json),
    );
}

/// Query-string parameters arrive untyped; every field is validated here
/// before anything reaches the controller.
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    pub q: Option<String>,
    pub term_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddUserQuery {
    pub user_id: Option<String>,
    pub taxonomy: Option<String>,
    pub term_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub user_id: UserId,
    pub taxonomy: String,
    pub term_id: TermId,
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, AdminError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AdminError::InvalidRequest(format!("Parameter '{}' is required", field)))
}

impl AddUserQuery {
    fn validate(&self) -> Result<AddUserRequest, AdminError> {
        Ok(AddUserRequest {
            user_id: parse_id("user_id", required("user_id", &self.user_id)?)?,
            taxonomy: required("taxonomy", &self.taxonomy)?.to_string(),
            term_id: parse_id("term_id", required("term_id", &self.term_id)?)?,
        })
    }
}

async fn search_users(
    query: web::Query<SearchUsersQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(match run_search(&query, &app_state) {
        Ok(candidates) => no_store(StatusCode::OK).json(candidates),
        Err(err) => admin_error_response("search users", err),
    })
}

fn run_search(
    query: &SearchUsersQuery,
    app_state: &AppState,
) -> Result<Vec<UserCandidate>, AdminError> {
    let q = required("q", &query.q)?;
    let term_id = match query.term_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id::<TermId>("term_id", raw)?),
        _ => None,
    };
    app_state.admin.search_users(q, term_id)
}

async fn add_user_query(
    query: web::Query<AddUserQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(match query.validate() {
        Ok(request) => add_user(request, &app_state),
        Err(err) => admin_error_response("add whitelisted user", err),
    })
}

async fn add_user_json(
    body: web::Json<AddUserRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(add_user(body.into_inner(), &app_state))
}

fn add_user(request: AddUserRequest, app_state: &AppState) -> HttpResponse {
    match app_state
        .admin
        .resolve_and_add(&request.taxonomy, request.term_id, request.user_id)
    {
        Ok(AddUserOutcome::Added(summary)) => no_store(StatusCode::OK).json(summary),
        Ok(AddUserOutcome::AlreadyPresent { user_id }) => {
            no_store(StatusCode::OK).json(json!({ "already_present": true, "user_id": user_id }))
        }
        Err(err) => admin_error_response("add whitelisted user", err),
    }
}
