// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use crate::access::BypassPolicy;
use crate::iam::ViewerRequest;
use crate::public::error::json_error;
use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::StatusCode,
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

/// Middleware that admits only viewers holding the bypass capability:
/// anonymous callers get 401, signed-in viewers without it get 403.
pub struct RequireBypassMiddleware {
    policy: Arc<dyn BypassPolicy>,
}

impl RequireBypassMiddleware {
    pub fn new(policy: Arc<dyn BypassPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireBypassMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireBypassMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireBypassMiddlewareService {
            service,
            policy: self.policy.clone(),
        }))
    }
}

pub struct RequireBypassMiddlewareService<S> {
    service: S,
    policy: Arc<dyn BypassPolicy>,
}

impl<S, B> Service<ServiceRequest> for RequireBypassMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let viewer = req.request().viewer().filter(|viewer| !viewer.is_anonymous());

        let rejection = match &viewer {
            None => Some((StatusCode::UNAUTHORIZED, "Authentication required")),
            Some(viewer) if !self.policy.bypasses(viewer) => {
                log::warn!(
                    "Admin access denied for user {:?} with role '{}' on {}",
                    viewer.user_id,
                    viewer.role,
                    req.path()
                );
                Some((StatusCode::FORBIDDEN, "Administrator access required"))
            }
            Some(_) => None,
        };

        if let Some((status, message)) = rejection {
            let (req, _) = req.into_parts();
            let response = json_error(status, message).map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
