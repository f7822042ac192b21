// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::templates::{ErrorPageContext, TemplateEngine, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder, Result};
use serde_json::json;

#[derive(Clone)]
pub struct ErrorRenderer {
    app_name: String,
}

impl ErrorRenderer {
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

/// Response builder for gated content; decisions depend on the viewer, so
/// nothing may be cached.
pub fn no_store(status: StatusCode) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    builder
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .insert_header(("Pragma", "no-cache"))
        .insert_header(("Expires", "0"));
    builder
}

pub fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    no_store(status).json(json!({ "error": message }))
}

pub fn serve_404(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    serve_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::NOT_FOUND,
        "error_404.html",
    )
}

pub fn serve_500(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    serve_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::INTERNAL_SERVER_ERROR,
        "error_500.html",
    )
}

fn serve_error_page(
    app_name: &str,
    template_engine: Option<&dyn TemplateEngine>,
    status: StatusCode,
    template: &str,
) -> Result<HttpResponse> {
    let context = ErrorPageContext::new(app_name).to_value();

    let html = match template_engine {
        Some(engine) => match render_minijinja_template(engine, template, context) {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to render {} error template: {}", status.as_u16(), e);
                fallback_html(app_name, status)
            }
        },
        None => fallback_html(app_name, status),
    };

    Ok(no_store(status)
        .content_type("text/html; charset=utf-8")
        .body(html))
}

fn fallback_html(app_name: &str, status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        r#"<!DOCTYPE html>
<html><head><title>{code} - {reason} | {app}</title></head>
<body><h1>{code} - {reason}</h1></body></html>"#,
        code = status.as_u16(),
        reason = reason,
        app = app_name
    )
}
