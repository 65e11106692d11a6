use std::sync::Arc;
use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use skynet_core::{Error, Result};
use tracing::debug;

use crate::config::{DEFAULT_PORTAL_URL, PortalOptions};
use crate::content_type::{ContentTypeResolver, DefaultContentTypeResolver};

/// Client for a Skynet portal.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PortalClient {
    portal_url: String,
    options: PortalOptions,
    http: reqwest::Client,
    pub(crate) content_types: Arc<dyn ContentTypeResolver>,
}

impl Default for PortalClient {
    fn default() -> Self {
        Self::new(DEFAULT_PORTAL_URL)
    }
}

impl PortalClient {
    pub fn new(portal_url: impl Into<String>) -> Self {
        Self::with_options(portal_url, PortalOptions::default())
    }

    /// Creates a client whose requests use `options` unless a call
    /// overrides them.
    pub fn with_options(portal_url: impl Into<String>, options: PortalOptions) -> Self {
        Self {
            portal_url: portal_url.into(),
            options,
            http: reqwest::Client::new(),
            content_types: Arc::new(DefaultContentTypeResolver),
        }
    }

    pub fn with_content_type_resolver(mut self, resolver: impl ContentTypeResolver + 'static) -> Self {
        self.content_types = Arc::new(resolver);
        self
    }

    pub fn portal_url(&self) -> &str {
        &self.portal_url
    }

    pub fn options(&self) -> &PortalOptions {
        &self.options
    }

    /// Builds a request against the endpoint in `call_options`.
    pub(crate) fn request(
        &self,
        method: Method,
        call_options: &PortalOptions,
        extra_path: &str,
        query: &[(&str, String)],
    ) -> PreparedRequest {
        let opts = self.options.merged(call_options);
        let portal_url = opts.portal_url.as_deref().unwrap_or(&self.portal_url);
        let url = make_url(
            portal_url,
            opts.endpoint_path.as_deref().unwrap_or_default(),
            extra_path,
            query,
        );

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(api_key) = &opts.api_key {
            builder = builder.basic_auth("", Some(api_key));
        }
        if let Some(user_agent) = &opts.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }

        PreparedRequest {
            builder,
            method,
            url,
            timeout: opts.timeout,
        }
    }
}

/// Joins the portal URL, the endpoint path and an optional extra path with
/// single slashes and appends the query, sorted by key.
///
/// ```
/// use skynet_portal::make_url;
///
/// let url = make_url("https://siasky.net/", "/skynet/skyfile", "", &[("foo", "bar".into())]);
/// assert_eq!(url, "https://siasky.net/skynet/skyfile?foo=bar");
/// ```
pub fn make_url(portal_url: &str, path: &str, extra_path: &str, query: &[(&str, String)]) -> String {
    let mut url = format!(
        "{}/{}",
        portal_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if !extra_path.is_empty() {
        url = format!(
            "{}/{}",
            url.trim_end_matches('/'),
            extra_path.trim_start_matches('/')
        );
    }
    if !query.is_empty() {
        let mut pairs = query.to_vec();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        url = format!("{url}?{encoded}");
    }
    url
}

/// A request that is ready to be sent.
pub(crate) struct PreparedRequest {
    builder: RequestBuilder,
    method: Method,
    url: String,
    timeout: Option<Duration>,
}

impl PreparedRequest {
    pub fn json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Sends the request without looking at the status code.
    pub async fn send(self) -> Result<PortalResponse> {
        debug!(method = %self.method, url = %self.url, "sending portal request");
        let timeout = self.timeout;
        let response = self
            .builder
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        debug!(status = response.status().as_u16(), url = %self.url, "portal responded");
        Ok(PortalResponse {
            response,
            method: self.method,
            timeout,
        })
    }

    /// Sends the request and turns error statuses into
    /// [`Error::HttpStatus`].
    pub async fn execute(self) -> Result<PortalResponse> {
        let response = self.send().await?;
        if response.status().as_u16() >= 400 {
            let method = response.method().to_string();
            let (status, message) = response.error_message().await;
            return Err(Error::HttpStatus {
                status,
                method,
                message,
            });
        }
        Ok(response)
    }
}

/// A portal response together with what is needed to report errors on it.
pub(crate) struct PortalResponse {
    response: Response,
    method: Method,
    timeout: Option<Duration>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl PortalResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Consumes the response and returns its status and the message of the
    /// error body. Bodies that are not `{"message": ...}` are returned as
    /// they are.
    pub async fn error_message(self) -> (u16, String) {
        let status = self.response.status().as_u16();
        let message = match self.response.bytes().await {
            Ok(body) => match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(parsed) => parsed.message,
                Err(_) => String::from_utf8_lossy(&body).into_owned(),
            },
            Err(e) => format!("could not read response body: {e}"),
        };
        (status, message)
    }

    pub async fn json<T: DeserializeOwned>(self, what: &'static str) -> Result<T> {
        let body = self
            .response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(what, e))
    }

    pub fn into_inner(self) -> Response {
        self.response
    }
}

pub(crate) fn transport_error(e: reqwest::Error, timeout: Option<Duration>) -> Error {
    match timeout {
        Some(timeout) if e.is_timeout() => Error::Timeout(timeout),
        _ => Error::Transport(Box::new(e)),
    }
}
