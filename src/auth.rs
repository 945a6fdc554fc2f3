//! Caller identity
//!
//! Token issuance and sign-in live in the managed auth service. This module
//! only turns a bearer token into a [`Session`] by asking that service who the
//! token belongs to. Handlers receive the session as an extractor argument and
//! pass it down explicitly; nothing reads the current user from shared state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;

/// The signed-in host making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Resolves a bearer token to the user it was issued for
#[async_trait::async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<Session>;
}

/// Verifies tokens against the auth service's `/auth/v1/user` endpoint
#[derive(Clone)]
pub struct RemoteAuthVerifier {
    http_client: HttpClient,
    auth_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl RemoteAuthVerifier {
    pub fn new(auth_url: String, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl AuthVerifier for RemoteAuthVerifier {
    async fn verify(&self, token: &str) -> AppResult<Session> {
        let url = format!("{}/auth/v1/user", self.auth_url);

        let mut request = self.http_client.get(&url).bearer_auth(token);
        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key);
        }

        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => {
                let user: AuthUser = response.json().await?;
                Ok(Session {
                    user_id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Unauthorized(
                "Invalid or expired session".to_string(),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status = %status, body = %body, "Auth service request failed");
                Err(AppError::ExternalApi(format!(
                    "Auth service returned status {}",
                    status
                )))
            }
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor that requires a signed-in user.
/// Returns 401 when the header is missing or the auth service rejects the token.
#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

        let session = state.auth.verify(token).await?;
        tracing::debug!(user_id = %session.user_id, "Session verified");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::get, Json, Router};
    use serde_json::json;

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Basic Zm9v"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    async fn spawn_fake_auth() -> String {
        let user_id = Uuid::nil();
        let router = Router::new().route(
            "/auth/v1/user",
            get(move |headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|h| h.to_str().ok())
                    == Some("Bearer good-token");
                let has_key = headers.get("apikey").is_some();

                if authorized && has_key {
                    (
                        axum::http::StatusCode::OK,
                        Json(json!({ "id": user_id, "email": "host@example.com" })),
                    )
                } else {
                    (
                        axum::http::StatusCode::UNAUTHORIZED,
                        Json(json!({ "msg": "invalid JWT" })),
                    )
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_remote_verifier_accepts_valid_token() {
        let verifier = RemoteAuthVerifier::new(
            spawn_fake_auth().await,
            Some("anon-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let session = verifier.verify("good-token").await.unwrap();
        assert_eq!(session.user_id, Uuid::nil());
        assert_eq!(session.email.as_deref(), Some("host@example.com"));
    }

    #[tokio::test]
    async fn test_remote_verifier_rejects_bad_token() {
        let verifier = RemoteAuthVerifier::new(
            spawn_fake_auth().await,
            Some("anon-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = verifier.verify("stale-token").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
