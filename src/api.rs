// Storage API client: the list and upload calls of the Sauce storage REST
// API, expressed on top of a `Transport`. Nothing here is cached; every
// call goes to the service.

use crate::config::{Credentials, StorageConfig};
use crate::error::{Result, StorageError};
use crate::transport::{
    basic_auth, resource_url, HttpRequest, HttpsTransport, RequestBody, Transport, JSON,
    OCTET_STREAM,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use url::form_urlencoded;

const STORAGE_GROUP: &str = "storage";
const ACCESS_SCHEME: &str = "sauce-storage:";

/// One file as reported by the storage service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteFileRecord {
    /// Listings call it `name`, upload responses call it `filename`.
    #[serde(alias = "filename", default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Hex MD5 of the stored content.
    #[serde(default)]
    pub md5: Option<String>,
    /// Upload time, seconds since the epoch.
    #[serde(default)]
    pub mtime: Option<f64>,
    /// Client-side access identifier, see [`access_url`]. The service
    /// never sends it; `StorageClient` fills it on every record it returns.
    #[serde(default)]
    pub url: String,
}

impl RemoteFileRecord {
    fn with_access_url(mut self) -> Self {
        self.url = access_url(&self.name);
        self
    }
}

#[derive(Deserialize)]
struct FileListing {
    files: Vec<RemoteFileRecord>,
}

/// `sauce-storage:` followed by the form-urlencoded remote name, the way
/// downstream test configurations reference stored apps.
pub fn access_url(remote_name: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(remote_name.as_bytes()).collect();
    format!("{ACCESS_SCHEME}{encoded}")
}

/// Client for one account on one storage host.
#[derive(Clone, Debug)]
pub struct StorageClient<T = HttpsTransport> {
    transport: T,
    host: String,
    credentials: Credentials,
}

impl StorageClient<HttpsTransport> {
    /// Build a client that talks HTTPS to `config.host` (or to the given
    /// base URL when the host carries a scheme).
    pub fn new(config: StorageConfig) -> Result<Self> {
        let transport = HttpsTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, config.host, config.credentials))
    }
}

impl<T: Transport> StorageClient<T> {
    pub fn with_transport(transport: T, host: impl Into<String>, credentials: Credentials) -> Self {
        StorageClient {
            transport,
            host: host.into(),
            credentials,
        }
    }

    /// Swap credentials on a live client. Later requests use the new ones.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Send one request against the storage group and return the body of
    /// a 200 response.
    fn request(
        &self,
        method: Method,
        name: Option<&str>,
        query: &[(&str, &str)],
        body: RequestBody,
        content_type: &'static str,
    ) -> Result<Vec<u8>> {
        let url = resource_url(
            &self.host,
            STORAGE_GROUP,
            &self.credentials.username,
            name,
            query,
        )?;
        tracing::debug!(method = %method, path = url.path(), "Sending storage request");
        let request = HttpRequest {
            method,
            url,
            authorization: basic_auth(&self.credentials),
            content_type,
            body,
        };
        self.transport.execute(request)?.into_body()
    }

    /// List every file in the account's storage, in the order the service
    /// returns them.
    pub fn list_files(&self) -> Result<Vec<RemoteFileRecord>> {
        let body = self.request(Method::GET, None, &[], RequestBody::Empty, JSON)?;
        let listing: FileListing = serde_json::from_slice(&body)?;
        Ok(listing
            .files
            .into_iter()
            .map(RemoteFileRecord::with_access_url)
            .collect())
    }

    /// Upload `local_path` under `remote_name`, streaming the raw bytes.
    /// The local file is opened before anything is sent.
    pub fn upload_file(
        &self,
        local_path: &Path,
        remote_name: &str,
        overwrite: bool,
    ) -> Result<RemoteFileRecord> {
        let file = File::open(local_path).map_err(|e| StorageError::not_found(local_path, e))?;
        let query: &[(&str, &str)] = if overwrite {
            &[("overwrite", "true")]
        } else {
            &[]
        };
        let body = self.request(
            Method::POST,
            Some(remote_name),
            query,
            RequestBody::File(file),
            OCTET_STREAM,
        )?;
        let mut record: RemoteFileRecord = serde_json::from_slice(&body)?;
        if record.name.is_empty() {
            record.name = remote_name.to_string();
        }
        Ok(record.with_access_url())
    }
}
