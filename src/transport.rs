// Transport: turns a storage call into an authenticated HTTPS request and
// hands back the raw response. The `Transport` trait is the seam tests use
// to replace the network with a scripted stub.

use crate::config::Credentials;
use crate::error::{Result, StorageError};
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::fs::File;
use std::time::Duration;
use url::Url;

pub const JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Request body. Files are streamed, never buffered whole.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    File(File),
}

/// A fully built request, ready to put on the wire.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: String,
    pub content_type: &'static str,
    pub body: RequestBody,
}

/// Status line and the whole body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status: 200,
            reason: "OK".into(),
            body: body.into(),
        }
    }

    /// Only 200 counts as success; the body of anything else is dropped.
    pub fn into_body(self) -> Result<Vec<u8>> {
        if self.status != 200 {
            return Err(StorageError::RemoteService {
                status: self.status,
                reason: self.reason,
            });
        }
        Ok(self.body)
    }
}

/// Something that can execute an [`HttpRequest`].
///
/// Implementations return `Err(StorageError::Transport)` only when no
/// response was obtained; any status line is returned as a response.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking reqwest transport. Each call opens its own connection scope
/// and reads the body to the end before returning.
#[derive(Clone, Debug)]
pub struct HttpsTransport {
    client: Client,
}

impl HttpsTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpsTransport {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpsTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(AUTHORIZATION, request.authorization)
            .header(CONTENT_TYPE, request.content_type);
        if let RequestBody::File(file) = request.body {
            builder = builder.body(file);
        }
        let res = builder.send()?;
        let status = res.status();
        let body = res.bytes()?.to_vec();
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}

/// `Basic` authorization value for the given credentials. Built fresh on
/// every request so rotated credentials take effect immediately.
pub fn basic_auth(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username, credentials.access_key);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

/// `https://{host}/rest/v1/{group}/{account}[/{extra}][?{query}]`.
/// A host that already carries a scheme (`http://127.0.0.1:8080`) is used
/// as the base URL unchanged.
///
/// Every path component is percent-encoded as one segment, so a remote
/// name containing `/` stays a single segment.
pub fn resource_url(
    host: &str,
    group: &str,
    account: &str,
    extra: Option<&str>,
    query: &[(&str, &str)],
) -> Result<Url> {
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    let mut url = Url::parse(&base)
        .map_err(|e| StorageError::Config(format!("invalid host '{host}': {e}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| StorageError::Config(format!("host '{host}' cannot carry a path")))?;
        segments.clear().extend(["rest", "v1", group, account]);
        if let Some(extra) = extra {
            segments.push(extra);
        }
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
