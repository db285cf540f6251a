//! Request logging middleware.
//!
//! Each request is logged once on arrival and once on completion. Both lines
//! carry the session user when the bearer token verifies. The token itself is
//! never logged. Rejecting a bad token is left to
//! [`SessionAuth`](crate::auth::SessionAuth).

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::auth::{SessionKey, verify_session_token};

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// How the caller identified itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Caller {
    Anonymous,
    /// A bearer token was sent but did not verify.
    Rejected,
    User(i32),
}

impl Caller {
    fn resolve(req: &ServiceRequest) -> Self {
        let Some(token) = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
        else {
            return Self::Anonymous;
        };

        let Some(key) = req.app_data::<web::Data<SessionKey>>() else {
            return Self::Rejected;
        };

        verify_session_token(token, key)
            .ok()
            .and_then(|claims| claims.user_id())
            .map_or(Self::Rejected, Self::User)
    }

    fn user_id(self) -> Option<i32> {
        match self {
            Self::User(id) => Some(id),
            Self::Anonymous | Self::Rejected => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Rejected => "rejected",
            Self::User(_) => "session",
        }
    }
}

/// Read requests are logged at debug; everything that can change the catalog,
/// a run or a member is logged at info.
fn is_mutation(method: &str) -> bool {
    matches!(method, "POST" | "PUT" | "PATCH" | "DELETE")
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let caller = Caller::resolve(&req);
        let user_id = caller.user_id();

        if is_mutation(&method) {
            info!(
                target: "api",
                method = %method,
                path = %path,
                caller = caller.label(),
                user_id = ?user_id,
                "→ Request started"
            );
        } else {
            debug!(
                target: "api",
                method = %method,
                path = %path,
                caller = caller.label(),
                user_id = ?user_id,
                "→ Request started"
            );
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let duration_ms = start.elapsed().as_millis() as u64;
            let status = res.status();

            log_completion(&method, &path, user_id, status, duration_ms);

            Ok(res)
        })
    }
}

fn log_completion(
    method: &str,
    path: &str,
    user_id: Option<i32>,
    status: StatusCode,
    duration_ms: u64,
) {
    let status_code = status.as_u16();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!(
            target: "api",
            method,
            path,
            user_id = ?user_id,
            status = status_code,
            duration_ms,
            "← Access denied"
        );
    } else if status == StatusCode::CONFLICT {
        // Edits against a completed run or plan.
        warn!(
            target: "api",
            method,
            path,
            user_id = ?user_id,
            status = status_code,
            duration_ms,
            "← Conflict"
        );
    } else if status.is_server_error() {
        error!(
            target: "api",
            method,
            path,
            user_id = ?user_id,
            status = status_code,
            duration_ms,
            "← Server error"
        );
    } else if status.is_client_error() {
        warn!(
            target: "api",
            method,
            path,
            user_id = ?user_id,
            status = status_code,
            duration_ms,
            "← Client error"
        );
    } else {
        info!(
            target: "api",
            method,
            path,
            user_id = ?user_id,
            status = status_code,
            duration_ms,
            "← Request completed"
        );
    }
}
