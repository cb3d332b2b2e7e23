//! Storage contracts for the persisted refresh token.
//!
//! [`KeyValueStore`] is the storage boundary: a synchronous string slot per key.
//! [`RefreshTokenStore`] sits on top of it and owns the single refresh-token slot keyed by
//! [`REFRESH_TOKEN_KEY`]. No expiry or rotation logic lives here.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Fixed key under which the refresh token is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refresh-token";

/// Synchronous string key/value storage backend.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`, if any.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Writes `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Persisted refresh-token slot.
#[derive(Clone)]
pub struct RefreshTokenStore {
	backend: Arc<dyn KeyValueStore>,
}
impl RefreshTokenStore {
	/// Wraps a storage backend.
	pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
		Self { backend }
	}

	/// Creates a store backed by a fresh [`MemoryStore`].
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}

	/// Returns the persisted refresh token, or an empty string when unset.
	pub fn get_refresh_token(&self) -> Result<String, StoreError> {
		Ok(self.backend.get(REFRESH_TOKEN_KEY)?.unwrap_or_default())
	}

	/// Persists `refresh`, replacing the previous token.
	pub fn set_refresh_token(&self, refresh: &str) -> Result<(), StoreError> {
		self.backend.set(REFRESH_TOKEN_KEY, refresh)
	}

	/// Returns `true` when a non-empty refresh token is persisted.
	pub fn has_refresh_token(&self) -> Result<bool, StoreError> {
		Ok(!self.get_refresh_token()?.is_empty())
	}

	pub(crate) fn refresh_secret(&self) -> Result<Option<TokenSecret>, StoreError> {
		let refresh = self.get_refresh_token()?;

		Ok((!refresh.is_empty()).then(|| TokenSecret::new(refresh)))
	}
}
impl Debug for RefreshTokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshTokenStore(..)")
	}
}
impl Default for RefreshTokenStore {
	fn default() -> Self {
		Self::in_memory()
	}
}
