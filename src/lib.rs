// Library root
// -----------
// Client for the Sauce Labs storage REST API. The binary (`main.rs`) wraps
// it in an interactive menu.
//
// Module responsibilities:
// - `config`: account credentials, host and timeout, from env or file.
// - `transport`: authenticated HTTPS requests behind the `Transport` trait.
// - `api`: list and upload calls, `RemoteFileRecord`, access identifiers.
// - `digest`: chunked MD5 of local files.
// - `sync`: verified upload (only upload when the stored MD5 differs).
// - `ui`: terminal menu flows that delegate to `sync`.
pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod sync;
pub mod transport;
pub mod ui;

pub use api::{access_url, RemoteFileRecord, StorageClient};
pub use config::{Credentials, StorageConfig};
pub use error::StorageError;
pub use sync::{resolve_remote_name, StorageSync, SyncOutcome};
