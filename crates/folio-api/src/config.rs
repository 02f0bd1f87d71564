//! Server configuration.

use serde::{Deserialize, Serialize};

use folio_core::{Error, Result};

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` allows any origin (debug only).
    pub allowed_origins: Vec<String>,
    /// Preflight cache max age in seconds.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

/// JWT authentication configuration (used when `debug` is false).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtConfig {
    /// Shared secret for HS256 verification.
    pub hs256_secret: Option<String>,
    /// PEM-encoded RSA public key for RS256 verification.
    pub rs256_public_key_pem: Option<String>,
    /// Required `iss` claim, when set.
    pub issuer: Option<String>,
    /// Required `aud` claim, when set.
    pub audience: Option<String>,
    /// Claim holding the caller role (default `role`).
    pub role_claim: String,
    /// Claim holding the caller id (default `sub`).
    pub user_claim: String,
    /// Clock skew tolerance for time-based claims, in seconds.
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            hs256_secret: None,
            rs256_public_key_pem: None,
            issuer: None,
            audience: None,
            role_claim: "role".to_string(),
            user_claim: "sub".to_string(),
            leeway_seconds: 30,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field(
                "hs256_secret",
                &self.hs256_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "rs256_public_key_pem",
                &self.rs256_public_key_pem.as_ref().map(|_| "[PEM]"),
            )
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("role_claim", &self.role_claim)
            .field("user_claim", &self.user_claim)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Configuration for the Folio API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode.
    ///
    /// When enabled:
    /// - Caller identity is taken from `X-User-Id` / `X-Role` headers
    ///
    /// When disabled:
    /// - Identity comes from a verified `Authorization: Bearer <jwt>`
    pub debug: bool,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// JWT authentication configuration (used when `debug` is false).
    #[serde(default)]
    pub jwt: JwtConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            debug: false,
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `FOLIO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("FOLIO_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("FOLIO_DEBUG")? {
            config.debug = debug;
        }
        if let Some(origins) = env_string("FOLIO_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("FOLIO_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }
        if let Some(secret) = env_string("FOLIO_JWT_SECRET") {
            config.jwt.hs256_secret = Some(secret);
        }
        if let Some(pem) = env_string("FOLIO_JWT_PUBLIC_KEY_PEM") {
            config.jwt.rs256_public_key_pem = Some(pem);
        }
        if let Some(issuer) = env_string("FOLIO_JWT_ISSUER") {
            config.jwt.issuer = Some(issuer);
        }
        if let Some(audience) = env_string("FOLIO_JWT_AUDIENCE") {
            config.jwt.audience = Some(audience);
        }
        if let Some(claim) = env_string("FOLIO_JWT_ROLE_CLAIM") {
            config.jwt.role_claim = claim;
        }
        if let Some(claim) = env_string("FOLIO_JWT_USER_CLAIM") {
            config.jwt.user_claim = claim;
        }

        Ok(config)
    }

    /// Validates settings that only make sense together.
    ///
    /// # Errors
    ///
    /// Returns an error when production mode lacks a JWT key source, has
    /// two key sources, or allows a wildcard CORS origin.
    pub fn validate(&self) -> Result<()> {
        if !self.debug
            && self
                .cors
                .allowed_origins
                .iter()
                .any(|origin| origin == "*")
        {
            return Err(Error::InvalidInput(
                "cors.allowed_origins cannot include '*' when debug=false".to_string(),
            ));
        }

        if !self.debug {
            let has_hs256_secret = self.jwt.hs256_secret.is_some();
            let has_rs256_public_key = self.jwt.rs256_public_key_pem.is_some();

            if !has_hs256_secret && !has_rs256_public_key {
                return Err(Error::InvalidInput(
                    "FOLIO_JWT_SECRET or FOLIO_JWT_PUBLIC_KEY_PEM is required when FOLIO_DEBUG=false"
                        .to_string(),
                ));
            }
            if has_hs256_secret && has_rs256_public_key {
                return Err(Error::InvalidInput(
                    "FOLIO_JWT_SECRET and FOLIO_JWT_PUBLIC_KEY_PEM are mutually exclusive"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_allowed_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    env_string(name)
        .map(|raw| parse_bool(name, &raw))
        .transpose()
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    env_string(name)
        .map(|raw| {
            raw.parse::<u16>()
                .map_err(|_| Error::InvalidInput(format!("{name} must be a port number, got '{raw}'")))
        })
        .transpose()
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    env_string(name)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| Error::InvalidInput(format!("{name} must be an integer, got '{raw}'")))
        })
        .transpose()
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be true or false, got '{raw}'"
        ))),
    }
}
