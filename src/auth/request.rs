//! Outgoing request description passed through `hook()`.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::{Credential, CredentialKind};
use crate::{Error, Result};

/// Value-semantics description of a request about to be sent.
///
/// `hook()` never mutates its input; it returns a copy with the
/// `Authorization` header set, so a request template can be reused safely.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl AuthRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Current `Authorization` header, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Route path of the request, without host or query.
    ///
    /// Accepts absolute URLs as well as bare routes such as `/app`.
    pub fn path(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self
                .url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Copy of this request carrying `credential` in the `Authorization` header.
    pub fn with_credential(&self, credential: &Credential) -> Result<Self> {
        let mut value = HeaderValue::from_str(&credential.header_value()).map_err(|_| {
            let mechanism = credential.kind().as_str();
            let message = "credential contains characters not allowed in an HTTP header";
            match credential.kind() {
                // Values supplied by the caller or its environment.
                CredentialKind::Token | CredentialKind::Basic | CredentialKind::Action => {
                    Error::configuration(Some(mechanism), message)
                }
                _ => Error::authentication(mechanism, message),
            }
        })?;
        value.set_sensitive(true);

        let mut request = self.clone();
        request.headers.insert(AUTHORIZATION, value);
        Ok(request)
    }

    /// Build a reqwest request from this description.
    pub fn to_reqwest(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone());
        match self.body {
            Some(ref body) => builder.json(body),
            None => builder,
        }
    }
}
