//! Request context extraction and authentication middleware.
//!
//! In debug mode, caller identity is supplied via `X-User-Id` / `X-Role`
//! headers for local development. In production mode, identity is
//! extracted from a verified JWT. Listings are public: an absent
//! credential resolves to no caller, and the mutation workflow treats
//! that as unauthorized. A credential that is present but invalid is
//! rejected here, before any handler runs.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;
use ulid::Ulid;

use folio_catalog::{CallerIdentity, Role};

use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::server::AppState;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request context derived from authentication and headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The resolved caller, if the request carried a credential.
    pub caller: Option<CallerIdentity>,
    /// Request ID for tracing/correlation.
    pub request_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let headers = &parts.headers;

        let request_id =
            request_id_from_headers(headers).unwrap_or_else(|| Ulid::new().to_string());

        let caller = if state.config.debug {
            caller_from_headers(headers, &request_id)?
        } else {
            caller_from_jwt(headers, &state.config.jwt, &request_id)?
        };

        let ctx = Self { caller, request_id };
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

fn caller_from_headers(
    headers: &HeaderMap,
    request_id: &str,
) -> Result<Option<CallerIdentity>, ApiError> {
    let Some(user_id) = header_string(headers, "X-User-Id") else {
        return Ok(None);
    };

    let role = match header_string(headers, "X-Role") {
        Some(raw) => Role::parse(&raw).ok_or_else(|| {
            ApiError::unauthorized(format!("unrecognized role '{raw}' (debug mode)"))
                .with_request_id(request_id.to_string())
        })?,
        None => Role::Standard,
    };

    Ok(Some(CallerIdentity { user_id, role }))
}

fn caller_from_jwt(
    headers: &HeaderMap,
    jwt: &JwtConfig,
    request_id: &str,
) -> Result<Option<CallerIdentity>, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let (decoding_key, algorithm) = jwt_decoding_key(jwt, request_id)?;
    let mut validation = Validation::new(algorithm);
    validation.leeway = jwt.leeway_seconds;
    validation.validate_nbf = true;

    if let Some(iss) = jwt.issuer.as_deref() {
        validation.set_issuer(&[iss]);
    }
    if let Some(aud) = jwt.audience.as_deref() {
        validation.set_audience(&[aud]);
    }

    let data = jsonwebtoken::decode::<Value>(&token, &decoding_key, &validation)
        .map_err(|_| ApiError::invalid_token().with_request_id(request_id.to_string()))?;

    let Some(obj) = data.claims.as_object() else {
        return Err(ApiError::invalid_token().with_request_id(request_id.to_string()));
    };

    let user_id = extract_required_claim(obj, &jwt.user_claim, request_id)?;
    let role_raw = extract_required_claim(obj, &jwt.role_claim, request_id)?;

    // Unrecognized role values fail closed; nothing unexpected is admin.
    let role = Role::parse(&role_raw)
        .ok_or_else(|| ApiError::invalid_token().with_request_id(request_id.to_string()))?;

    Ok(Some(CallerIdentity { user_id, role }))
}

fn jwt_decoding_key(
    jwt: &JwtConfig,
    request_id: &str,
) -> Result<(DecodingKey, Algorithm), ApiError> {
    match (jwt.hs256_secret.as_deref(), jwt.rs256_public_key_pem.as_deref()) {
        (Some(secret), None) => Ok((DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)),
        (None, Some(pem)) => DecodingKey::from_rsa_pem(pem.as_bytes())
            .map(|key| (key, Algorithm::RS256))
            .map_err(|e| {
                ApiError::internal(format!("failed to parse jwt.rs256_public_key_pem: {e}"))
                    .with_request_id(request_id.to_string())
            }),
        (Some(_), Some(_)) => Err(ApiError::internal(
            "jwt.hs256_secret and jwt.rs256_public_key_pem are mutually exclusive",
        )
        .with_request_id(request_id.to_string())),
        (None, None) => Err(ApiError::internal(
            "jwt.hs256_secret or jwt.rs256_public_key_pem is required when debug=false",
        )
        .with_request_id(request_id.to_string())),
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    header_string(headers, "X-Request-Id").or_else(|| header_string(headers, "X-Request-ID"))
}

fn extract_required_claim(
    obj: &serde_json::Map<String, Value>,
    claim: &str,
    request_id: &str,
) -> Result<String, ApiError> {
    obj.get(claim)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::invalid_token().with_request_id(request_id.to_string()))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = header_string(headers, "Authorization")?;
    let token = raw.strip_prefix("Bearer ")?;
    Some(token.to_string())
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    value.to_str().ok().map(str::to_string)
}

/// Context middleware.
///
/// Resolves the caller once per request, injects a [`RequestContext`]
/// into request extensions, and echoes the request ID on the response.
pub async fn context_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let ctx = match RequestContext::from_request_parts(&mut parts, &state).await {
        Ok(ctx) => ctx,
        Err(err) => return err.into_response(),
    };

    let mut req = Request::from_parts(parts, body);
    let request_id = ctx.request_id.clone();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn absent_debug_headers_resolve_to_no_caller() {
        let caller = caller_from_headers(&headers(&[]), "req-1").unwrap();
        assert!(caller.is_none());
    }

    #[test]
    fn debug_headers_resolve_role() {
        let caller = caller_from_headers(
            &headers(&[("x-user-id", "u-1"), ("x-role", "admin")]),
            "req-1",
        )
        .unwrap()
        .unwrap();
        assert_eq!(caller.user_id, "u-1");
        assert!(caller.role.is_admin());
    }

    #[test]
    fn debug_role_defaults_to_standard() {
        let caller = caller_from_headers(&headers(&[("x-user-id", "u-1")]), "req-1")
            .unwrap()
            .unwrap();
        assert_eq!(caller.role, Role::Standard);
    }

    #[test]
    fn unrecognized_debug_role_is_rejected() {
        let result = caller_from_headers(
            &headers(&[("x-user-id", "u-1"), ("x-role", "root")]),
            "req-1",
        );
        assert!(result.is_err());
    }

    #[test]
    fn absent_authorization_resolves_to_no_caller() {
        let jwt = JwtConfig {
            hs256_secret: Some("secret".to_string()),
            ..JwtConfig::default()
        };
        let caller = caller_from_jwt(&headers(&[]), &jwt, "req-1").unwrap();
        assert!(caller.is_none());
    }

    #[test]
    fn garbage_bearer_token_is_rejected() {
        let jwt = JwtConfig {
            hs256_secret: Some("secret".to_string()),
            ..JwtConfig::default()
        };
        let result = caller_from_jwt(
            &headers(&[("authorization", "Bearer not-a-jwt")]),
            &jwt,
            "req-1",
        );
        assert!(result.is_err());
    }

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        assert!(bearer_token(&headers(&[("authorization", "Basic abc")])).is_none());
        assert_eq!(
            bearer_token(&headers(&[("authorization", "Bearer abc")])).as_deref(),
            Some("abc")
        );
    }
}
