//! Actix-web extractor resolving the authenticated subject from a bearer
//! session token.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use super::{SessionKey, verify_session_token};
use crate::db::{self, DbPool};
use crate::error::ErrorResponse;
use crate::models::UserStatus;
use crate::services::Subject;

const BEARER_PREFIX: &str = "Bearer ";

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let code = if self.status == StatusCode::UNAUTHORIZED {
            "UNAUTHORIZED"
        } else {
            "INTERNAL_ERROR"
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: code.to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid session token for an active user.
///
/// ```ignore
/// async fn handler(auth: SessionAuth) -> impl Responder {
///     // auth.subject identifies the caller
/// }
/// ```
pub struct SessionAuth {
    pub subject: Subject,
}

impl FromRequest for SessionAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let key = req.app_data::<web::Data<SessionKey>>().cloned();
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .map(|t| t.trim().to_string());

        Box::pin(async move {
            let (Some(pool), Some(key)) = (pool, key) else {
                return Err(AuthError::internal("Internal configuration error"));
            };

            let token = token.ok_or_else(|| {
                AuthError::unauthorized("Missing session token. Provide Authorization: Bearer header.")
            })?;

            let claims = verify_session_token(&token, &key).map_err(AuthError::unauthorized)?;
            let user_id = claims
                .user_id()
                .ok_or_else(|| AuthError::unauthorized("Invalid session subject"))?;

            let user = db::users::find_by_id(pool.connection(), user_id)
                .await
                .map_err(|e| AuthError::internal(e.to_string()))?
                .ok_or_else(|| AuthError::unauthorized("Unknown user"))?;

            if UserStatus::parse(&user.status) != Some(UserStatus::Active) {
                debug!(user_id, "Rejected session for inactive user");
                return Err(AuthError::unauthorized("Account is not active"));
            }

            Ok(SessionAuth {
                subject: Subject::new(user.id),
            })
        })
    }
}
