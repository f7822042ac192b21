// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::HeaderMap;
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use super::store::UserDirectory;
use super::types::UserId;
use crate::config::ValidatedConfig;

/// The actor behind a request: a known user with their primary role, or an
/// anonymous visitor carrying the configured anonymous pseudo-role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
    pub role: String,
    pub name: String,
}

impl Viewer {
    pub fn anonymous(anonymous_role: &str) -> Self {
        Self {
            user_id: None,
            role: anonymous_role.to_string(),
            name: String::new(),
        }
    }

    pub fn user(user_id: UserId, role: &str, name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            role: role.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Maps the trusted identity header onto a [`Viewer`].
pub struct ViewerResolver {
    directory: Arc<dyn UserDirectory>,
    user_header: String,
    anonymous_role: String,
}

impl ViewerResolver {
    pub fn new(directory: Arc<dyn UserDirectory>, user_header: &str, anonymous_role: &str) -> Self {
        Self {
            directory,
            user_header: user_header.trim().to_string(),
            anonymous_role: anonymous_role.to_string(),
        }
    }

    pub fn from_config(directory: Arc<dyn UserDirectory>, config: &ValidatedConfig) -> Self {
        Self::new(
            directory,
            &config.identity.user_header,
            config.restrictions.anonymous_role(),
        )
    }

    pub fn anonymous(&self) -> Viewer {
        Viewer::anonymous(&self.anonymous_role)
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Viewer {
        let Some(raw) = headers
            .get(self.user_header.as_str())
            .and_then(|value| value.to_str().ok())
        else {
            return self.anonymous();
        };

        let user_id = match raw.trim().parse::<UserId>() {
            Ok(id) => id,
            Err(_) => {
                log::debug!("Ignoring malformed {} header value", self.user_header);
                return self.anonymous();
            }
        };

        match self.directory.get(user_id) {
            Some(user) => Viewer::user(user.id, &user.role, user.display_name()),
            None => {
                log::debug!("Unknown user id {} in identity header", user_id);
                self.anonymous()
            }
        }
    }
}

/// Reads the viewer resolved by [`ViewerMiddlewareFactory`].
pub trait ViewerRequest {
    fn viewer(&self) -> Option<Viewer>;
}

impl ViewerRequest for HttpRequest {
    fn viewer(&self) -> Option<Viewer> {
        self.extensions().get::<Viewer>().cloned()
    }
}

pub struct ViewerMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for ViewerMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ViewerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ViewerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ViewerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ViewerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(resolver) = req.app_data::<Data<ViewerResolver>>() {
            let viewer = resolver.resolve(req.headers());
            req.extensions_mut().insert(viewer);
        } else {
            log::error!("ViewerResolver missing from app data; request treated as anonymous");
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
