//! Thread-safe in-memory [`KeyValueStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{KeyValueStore, StoreError},
};

/// Thread-safe storage backend that keeps values in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<String, String>>>);
impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}
}
