// Configuration: where the storage service lives and who we are.
// Values come from the environment first and fall back to a small JSON
// file in the user's home directory, which the interactive UI can write.

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Sauce Labs REST endpoint.
pub const DEFAULT_HOST: &str = "saucelabs.com";

const CREDENTIALS_FILE: &str = ".sauce_storage.json";

/// Account name and access key used for Basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            access_key: access_key.into(),
        }
    }

    /// Path of the credentials file in the user's home directory.
    pub fn default_path() -> PathBuf {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.join(CREDENTIALS_FILE)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| StorageError::not_found(path, e))?;
        serde_json::from_slice(&data)
            .map_err(|e| StorageError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the credentials as JSON to `path`, readable by the owner only.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        write_private(path, &data)
            .map_err(|e| StorageError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Everything a client needs to reach the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub host: String,
    pub credentials: Credentials,
    /// Whole-request deadline. `None` leaves the HTTP client default.
    pub timeout: Option<Duration>,
}

impl StorageConfig {
    pub fn new(credentials: Credentials) -> Self {
        StorageConfig {
            host: DEFAULT_HOST.to_string(),
            credentials,
            timeout: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the config from `SAUCE_USERNAME`, `SAUCE_ACCESS_KEY` and the
    /// optional `SAUCE_STORAGE_HOST` / `SAUCE_STORAGE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Environment first, then the credentials file in the home directory.
    pub fn load() -> Result<Self> {
        match Self::from_env() {
            Ok(config) => Ok(config),
            Err(env_err) => {
                let path = Credentials::default_path();
                if !path.exists() {
                    return Err(env_err);
                }
                tracing::debug!(path = %path.display(), "Loading credentials from file");
                Self::new(Credentials::from_file(&path)?).with_env_overrides()
            }
        }
    }

    /// Apply `SAUCE_STORAGE_HOST` / `SAUCE_STORAGE_TIMEOUT_SECS` to a config
    /// whose credentials came from somewhere other than the environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_overrides(lookup)?;
        Ok(self)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = non_empty(&lookup, "SAUCE_USERNAME")?;
        let access_key = non_empty(&lookup, "SAUCE_ACCESS_KEY")?;
        let mut config = Self::new(Credentials::new(username, access_key));
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SAUCE_STORAGE_HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(secs) = lookup("SAUCE_STORAGE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                StorageError::Config(format!("SAUCE_STORAGE_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            self.timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a file that already existed.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, data)
}

fn non_empty<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StorageError::Config(format!("{key} is not set")))
}
