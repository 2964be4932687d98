//! Route value object.
//!
//! An [`Endpoint`] pairs a path with the HTTP methods it answers to. Routes
//! are mounted from endpoints so the accepted methods live next to the path
//! instead of being spread across router calls.

use crate::types::{AppError, Result};
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
    routing::MethodFilter,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    route: String,
    methods: Vec<Method>,
}

impl Endpoint {
    /// An empty method list means `GET`.
    pub fn new(route: impl Into<String>, methods: Vec<Method>) -> Self {
        let methods = if methods.is_empty() {
            vec![Method::GET]
        } else {
            methods
        };

        Self {
            route: route.into(),
            methods,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Combine the endpoint's methods into one axum filter.
    pub fn method_filter(&self) -> Result<MethodFilter> {
        let mut combined: Option<MethodFilter> = None;
        for method in &self.methods {
            let filter = MethodFilter::try_from(method.clone()).map_err(|e| {
                AppError::Configuration(format!(
                    "Route '{}' uses unsupported method {}: {}",
                    self.route, method, e
                ))
            })?;
            combined = Some(match combined {
                Some(acc) => acc.or(filter),
                None => filter,
            });
        }

        combined.ok_or_else(|| AppError::Configuration(format!("Route '{}' has no methods", self.route)))
    }

    /// Log that the endpoint was hit.
    pub fn info(&self) {
        let methods: Vec<&str> = self.methods().iter().map(Method::as_str).collect();
        tracing::debug!(route = %self.route, methods = ?methods, "Endpoint called");
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("/default", vec![Method::GET])
    }
}

/// Per-route middleware calling [`Endpoint::info`] before the handler runs.
///
/// Requests with a method the endpoint does not accept pass through to the
/// router's 405 response without being logged as calls.
pub async fn log_endpoint(
    State(endpoint): State<Arc<Endpoint>>,
    request: Request,
    next: Next,
) -> Response {
    if endpoint.allows(request.method()) {
        endpoint.info();
    } else {
        tracing::debug!(
            route = %endpoint.route(),
            method = %request.method(),
            "Method not allowed"
        );
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let endpoint = Endpoint::default();
        assert_eq!(endpoint.route(), "/default");
        assert_eq!(endpoint.methods(), &[Method::GET]);
    }

    #[test]
    fn test_empty_methods_fall_back_to_get() {
        let endpoint = Endpoint::new("/ai", vec![]);
        assert!(endpoint.allows(&Method::GET));
        assert!(!endpoint.allows(&Method::POST));
    }

    #[test]
    fn test_method_filter_combines_methods() {
        let endpoint = Endpoint::new("/pdf", vec![Method::POST, Method::PUT]);
        assert!(endpoint.method_filter().is_ok());
        assert!(endpoint.allows(&Method::PUT));
    }

    #[test]
    fn test_method_filter_rejects_unknown_method() {
        let custom = Method::from_bytes(b"PURGE").unwrap();
        let endpoint = Endpoint::new("/cache", vec![custom]);
        assert!(matches!(
            endpoint.method_filter(),
            Err(AppError::Configuration(_))
        ));
    }
}
