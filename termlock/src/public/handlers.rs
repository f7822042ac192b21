// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use super::error::{self, json_error, no_store};
use super::gate::GateOutcome;
use crate::app_state::AppState;
use crate::catalog::{Catalog, ContentItem, ItemId, TermId};
use crate::iam::{Viewer, ViewerRequest};
use crate::templates::{ItemPageContext, RestrictedPageContext, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub term: Option<TermId>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct TermSummary<'a> {
    pub id: TermId,
    pub taxonomy: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ItemSummary<'a> {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub content_type: &'a str,
    pub title: &'a str,
    pub slug: &'a str,
    pub excerpt: &'a str,
    pub terms: Vec<TermSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail<'a> {
    #[serde(flatten)]
    pub summary: ItemSummary<'a>,
    pub body: &'a str,
}

impl<'a> ItemSummary<'a> {
    fn new(item: &'a ContentItem, catalog: &'a Catalog) -> Self {
        Self {
            id: item.id,
            content_type: &item.content_type,
            title: &item.title,
            slug: &item.slug,
            excerpt: &item.excerpt,
            terms: catalog
                .terms_for_item(item)
                .into_iter()
                .map(|term| TermSummary {
                    id: term.id,
                    taxonomy: &term.taxonomy,
                    name: &term.name,
                    slug: &term.slug,
                })
                .collect(),
        }
    }
}

/// The viewer resolved by the identity middleware, or anonymous when the
/// middleware did not run.
pub fn current_viewer(req: &HttpRequest, app_state: &AppState) -> Viewer {
    req.viewer()
        .unwrap_or_else(|| Viewer::anonymous(app_state.settings.anonymous_role()))
}

pub async fn list_items(
    req: HttpRequest,
    query: web::Query<ListQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = current_viewer(&req, &app_state);
    let catalog = app_state.catalog.as_ref();

    let candidates: Vec<&ContentItem> = match query.term {
        Some(term_id) => catalog.items_with_term(term_id),
        None => catalog.items().iter().collect(),
    };
    let candidates = candidates.into_iter().filter(|item| {
        query
            .content_type
            .as_deref()
            .is_none_or(|content_type| item.content_type == content_type)
    });

    let visible: Vec<ItemSummary> = app_state
        .gate
        .filter_visible(candidates, &viewer)
        .into_iter()
        .map(|item| ItemSummary::new(item, catalog))
        .collect();

    Ok(no_store(StatusCode::OK).json(json!({ "items": visible })))
}

pub async fn search_items(
    req: HttpRequest,
    query: web::Query<SearchQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = current_viewer(&req, &app_state);
    let catalog = app_state.catalog.as_ref();

    let visible: Vec<ItemSummary> = app_state
        .gate
        .filter_visible(catalog.search(&query.q), &viewer)
        .into_iter()
        .map(|item| ItemSummary::new(item, catalog))
        .collect();

    Ok(no_store(StatusCode::OK).json(json!({ "query": query.q.trim(), "items": visible })))
}

pub async fn item_json(
    req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Ok(item_id) = path.trim().parse::<ItemId>() else {
        return Ok(json_error(StatusCode::BAD_REQUEST, "Item id must be numeric"));
    };
    let catalog = app_state.catalog.as_ref();
    let Some(item) = catalog.item(item_id) else {
        return Ok(json_error(StatusCode::NOT_FOUND, "Item not found"));
    };

    let viewer = current_viewer(&req, &app_state);
    match app_state.gate.resolve(item, &viewer) {
        GateOutcome::Visible => Ok(no_store(StatusCode::OK).json(ItemDetail {
            summary: ItemSummary::new(item, catalog),
            body: &item.body,
        })),
        GateOutcome::Restricted { message } => {
            debug!("Item {} withheld from viewer {:?}", item.id, viewer.user_id);
            Ok(no_store(StatusCode::FORBIDDEN).json(json!({
                "id": item.id,
                "restricted": true,
                "message": message,
            })))
        }
    }
}

pub async fn item_page(
    req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let templates = app_state.templates.as_ref();
    let item = path
        .trim()
        .parse::<ItemId>()
        .ok()
        .and_then(|item_id| app_state.catalog.item(item_id));
    let Some(item) = item else {
        return error::serve_404(&app_state.error_renderer, Some(templates));
    };

    let viewer = current_viewer(&req, &app_state);
    let app_name = app_state.error_renderer.app_name();
    let (status, rendered) = match app_state.gate.resolve(item, &viewer) {
        GateOutcome::Visible => {
            let terms = app_state.catalog.terms_for_item(item);
            let context = ItemPageContext::new(app_name, item, &terms).to_value();
            (
                StatusCode::OK,
                render_minijinja_template(templates, "public/item.html", context),
            )
        }
        GateOutcome::Restricted { message } => {
            let context = RestrictedPageContext::new(app_name, &message).to_value();
            (
                StatusCode::FORBIDDEN,
                render_minijinja_template(templates, "public/restricted.html", context),
            )
        }
    };

    match rendered {
        Ok(html) => Ok(no_store(status)
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(e) => {
            log::error!("Failed to render item {}: {}", item.id, e);
            error::serve_500(&app_state.error_renderer, Some(templates))
        }
    }
}

pub async fn not_found(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    error::serve_404(&app_state.error_renderer, Some(app_state.templates.as_ref()))
}
