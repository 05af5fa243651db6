// Verified sync: compare a local file with its stored copy by MD5 and only
// upload when they differ. Every check re-lists the account's storage;
// nothing is remembered between calls.

use crate::api::{RemoteFileRecord, StorageClient};
use crate::digest::{file_md5_with_block_size, DEFAULT_BLOCK_SIZE};
use crate::error::{Result, StorageError};
use crate::transport::{HttpsTransport, Transport};
use std::path::Path;

/// What [`StorageSync::update`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Remote content already matched; nothing was uploaded.
    AlreadyMatched(RemoteFileRecord),
    /// Uploaded, and the fresh listing returned this record.
    Uploaded(RemoteFileRecord),
    /// Uploaded, but the listing that followed did not contain the name.
    Unconfirmed { name: String },
}

impl SyncOutcome {
    pub fn record(&self) -> Option<&RemoteFileRecord> {
        match self {
            SyncOutcome::AlreadyMatched(r) | SyncOutcome::Uploaded(r) => Some(r),
            SyncOutcome::Unconfirmed { .. } => None,
        }
    }

    pub fn uploaded(&self) -> bool {
        !matches!(self, SyncOutcome::AlreadyMatched(_))
    }

    /// Treat an unconfirmed upload as an error.
    pub fn into_record(self) -> Result<RemoteFileRecord> {
        match self {
            SyncOutcome::AlreadyMatched(r) | SyncOutcome::Uploaded(r) => Ok(r),
            SyncOutcome::Unconfirmed { name } => Err(StorageError::LookupInconsistency { name }),
        }
    }
}

/// `name` if given, otherwise the base name of `local_path`. An empty
/// name would address the listing endpoint, so it is rejected.
pub fn resolve_remote_name(local_path: &Path, name: Option<&str>) -> Result<String> {
    if let Some(name) = name {
        if name.is_empty() {
            return Err(StorageError::InvalidName(local_path.to_path_buf()));
        }
        return Ok(name.to_string());
    }
    local_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::InvalidName(local_path.to_path_buf()))
}

/// High-level storage operations built on [`StorageClient`].
#[derive(Debug)]
pub struct StorageSync<T = HttpsTransport> {
    client: StorageClient<T>,
    block_size: usize,
}

impl<T: Transport> StorageSync<T> {
    pub fn new(client: StorageClient<T>) -> Self {
        StorageSync {
            client,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Read size used when hashing local files.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn client(&self) -> &StorageClient<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut StorageClient<T> {
        &mut self.client
    }

    /// All stored files, each with its access identifier filled in.
    pub fn list(&self) -> Result<Vec<RemoteFileRecord>> {
        self.client.list_files()
    }

    /// Fresh lookup of a single stored file by exact name.
    pub fn find_record(&self, remote_name: &str) -> Result<Option<RemoteFileRecord>> {
        Ok(self
            .client
            .list_files()?
            .into_iter()
            .find(|f| f.name == remote_name))
    }

    /// Hex MD5 of a local file.
    pub fn local_md5(&self, local_path: &Path) -> Result<String> {
        file_md5_with_block_size(local_path, self.block_size)
    }

    /// True when a file named `remote_name` (default: the local base name)
    /// is stored and its MD5 equals the local one.
    pub fn is_verified(&self, local_path: &Path, remote_name: Option<&str>) -> Result<bool> {
        let remote_name = resolve_remote_name(local_path, remote_name)?;
        let local_hash = self.local_md5(local_path)?;
        let record = self.find_record(&remote_name)?;
        Ok(matches_digest(record.as_ref(), &local_hash))
    }

    /// Upload, then look the file up again. `None` means the listing did
    /// not show the file yet.
    pub fn put(
        &self,
        local_path: &Path,
        remote_name: Option<&str>,
        overwrite: bool,
    ) -> Result<Option<RemoteFileRecord>> {
        let remote_name = resolve_remote_name(local_path, remote_name)?;
        self.upload_and_lookup(local_path, &remote_name, overwrite)
    }

    /// Make the stored copy match the local file, uploading only if needed.
    pub fn update(&self, local_path: &Path, remote_name: Option<&str>) -> Result<SyncOutcome> {
        let remote_name = resolve_remote_name(local_path, remote_name)?;
        let local_hash = self.local_md5(local_path)?;
        let existing = self.find_record(&remote_name)?;

        if matches_digest(existing.as_ref(), &local_hash) {
            if let Some(record) = existing {
                tracing::info!(name = %remote_name, md5 = %local_hash, "Already up to date");
                return Ok(SyncOutcome::AlreadyMatched(record));
            }
        }

        tracing::info!(name = %remote_name, md5 = %local_hash, "Uploading changed file");
        Ok(match self.upload_and_lookup(local_path, &remote_name, true)? {
            Some(record) => SyncOutcome::Uploaded(record),
            None => SyncOutcome::Unconfirmed { name: remote_name },
        })
    }

    fn upload_and_lookup(
        &self,
        local_path: &Path,
        remote_name: &str,
        overwrite: bool,
    ) -> Result<Option<RemoteFileRecord>> {
        self.client.upload_file(local_path, remote_name, overwrite)?;
        let record = self.find_record(remote_name)?;
        if record.is_none() {
            tracing::warn!(name = %remote_name, "Upload succeeded but file is missing from listing");
        }
        Ok(record)
    }
}

fn matches_digest(record: Option<&RemoteFileRecord>, local_hash: &str) -> bool {
    record
        .and_then(|r| r.md5.as_deref())
        .is_some_and(|md5| md5 == local_hash)
}
