//! chemdrill-loader — remote question-pool loading.
//!
//! Fetches named pools from a remote endpoint with bounded timeouts,
//! fixed-delay retries, and strict envelope validation; caches results in
//! a two-tier store and degrades to bundled datasets when every remote
//! attempt is exhausted.

pub mod config;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod remote;
pub mod validate;

pub use config::{create_loader, load_config, ChemdrillConfig};
pub use error::{LoaderError, ValidationFailure};
pub use fallback::FallbackCatalog;
pub use loader::{LoaderConfig, PoolLoader};
pub use remote::{HttpRemoteSource, MockRemoteSource, RemoteSource};
