//! App JWT claims and signing.

use std::fmt::Debug;
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MECHANISM: &str = "app";

/// Validity window of an app JWT. The provider rejects anything over 10 minutes.
pub const DEFAULT_JWT_TTL: Duration = Duration::from_secs(600);

/// Claims of a self-signed app JWT.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds).
    pub exp: i64,
    /// App id.
    pub iss: String,
}

impl AppClaims {
    pub fn new(app_id: impl Into<String>, issued_at: i64, ttl: Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
            iss: app_id.into(),
        }
    }
}

/// Signs app JWTs. Injectable so tests can avoid real key material.
pub trait JwtSigner: Send + Sync + Debug {
    fn sign(&self, claims: &AppClaims) -> Result<String>;
}

/// RS256 signer backed by a PEM-encoded RSA private key.
#[derive(Clone)]
pub struct RsaJwtSigner {
    key: EncodingKey,
}

impl RsaJwtSigner {
    /// Parse the key and perform a probe signature, so a malformed key fails
    /// here rather than on the first request.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = normalize_pem(pem);
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            Error::configuration(Some(MECHANISM), format!("invalid private key: {}", e))
        })?;

        let signer = Self { key };
        signer
            .sign(&AppClaims::new("0", 0, DEFAULT_JWT_TTL))
            .map_err(|e| {
                Error::configuration(Some(MECHANISM), format!("unusable private key: {}", e))
            })?;

        Ok(signer)
    }
}

impl JwtSigner for RsaJwtSigner {
    fn sign(&self, claims: &AppClaims) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &self.key)
            .map_err(|e| Error::authentication_with(MECHANISM, "failed to sign app JWT", e))
    }
}

impl Debug for RsaJwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaJwtSigner")
            .field("algorithm", &Algorithm::RS256)
            .finish_non_exhaustive()
    }
}

/// Undo `\n` escaping, common when keys are passed through environment variables.
fn normalize_pem(pem: &str) -> String {
    let trimmed = pem.trim();
    if trimmed.contains("\\n") && !trimmed.contains('\n') {
        trimmed.replace("\\n", "\n")
    } else {
        trimmed.to_string()
    }
}
