//! REST resource facade over any [`Requester`].

// self
use crate::{
	_prelude::*,
	client::{Query, Requester, ResponseHandle},
};

/// Maps a base path onto list/detail/create/update/delete calls.
#[derive(Debug)]
pub struct RestResource<'a, R>
where
	R: Requester,
{
	path: String,
	requester: &'a R,
}
impl<'a, R> RestResource<'a, R>
where
	R: Requester,
{
	/// Binds `path` on `requester`.
	pub fn new(path: impl Into<String>, requester: &'a R) -> Self {
		Self { path: path.into(), requester }
	}

	/// Returns the bound base path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// `GET {path}`
	pub fn get_all(&self, params: impl Into<Query>) -> ResponseHandle {
		self.requester.get(&self.path, params)
	}

	/// `GET {path}/{id}`
	pub fn get_by_id(&self, id: impl Display, params: impl Into<Query>) -> ResponseHandle {
		self.requester.get(&self.item(id), params)
	}

	/// `POST {path}`
	pub fn create(&self, body: &impl Serialize) -> ResponseHandle {
		self.requester.post(&self.path, body)
	}

	/// `PUT {path}/{id}`
	pub fn update(&self, id: impl Display, body: &impl Serialize) -> ResponseHandle {
		self.requester.put(&self.item(id), body)
	}

	/// `PATCH {path}/{id}`
	pub fn partial_update(&self, id: impl Display, body: &impl Serialize) -> ResponseHandle {
		self.requester.patch(&self.item(id), body)
	}

	/// `DELETE {path}/{id}`
	pub fn remove(&self, id: impl Display) -> ResponseHandle {
		self.requester.delete(&self.item(id))
	}

	fn item(&self, id: impl Display) -> String {
		format!("{}/{id}", self.path.trim_end_matches('/'))
	}
}
