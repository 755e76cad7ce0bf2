//! API key authentication layer

use axum::{
    body::Body,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

struct AuthState {
    header_name: HeaderName,
    api_key: Option<String>,
    bypass_paths: Vec<String>,
}

impl AuthState {
    fn is_authorized(&self, req: &Request<Body>) -> bool {
        if self.bypass_paths.iter().any(|p| p == req.uri().path()) {
            return true;
        }

        // No configured secret means nothing can match.
        let Some(expected) = self.api_key.as_deref() else {
            return false;
        };

        req.headers()
            .get(&self.header_name)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |provided| !provided.is_empty() && provided == expected)
    }
}

/// Rejects requests whose API key header does not match the configured secret
#[derive(Clone)]
pub struct AuthLayer {
    state: Arc<AuthState>,
}

impl AuthLayer {
    pub fn new(header_name: &str, api_key: Option<String>, bypass_paths: Vec<String>) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid auth header name '{}': {}", header_name, e)))?;

        if api_key.is_none() {
            warn!("No API key configured; every authenticated request will be rejected");
        }

        Ok(Self {
            state: Arc::new(AuthState {
                header_name,
                api_key,
                bypass_paths,
            }),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(
            &config.header_name,
            config.resolve_api_key(),
            config.bypass_paths.clone(),
        )
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    state: Arc<AuthState>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if self.state.is_authorized(&req) {
            Box::pin(self.inner.call(req))
        } else {
            warn!(path = %req.uri().path(), "Rejected request with invalid or missing API key");
            Box::pin(async { Ok(AppError::Unauthorized.into_response()) })
        }
    }
}
