//! Request client: authorization-header injection, URL resolution, and cancellable handles.

pub mod config;
pub mod response;
pub mod rest;

pub use config::*;
pub use response::*;
pub use rest::*;

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{self, JwtPayload, TokenSecret},
	error::ConfigError,
	http::{HttpRequest, HttpResponse, HttpTransport, Method},
	obs,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Request client specialized for the crate's default reqwest transport.
pub type ReqwestRequestClient = RequestClient<ReqwestTransport>;

/// Query parameters appended to a request URL, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);
impl Query {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one parameter.
	pub fn pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.push((key.into(), value.into()));

		self
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the parameters.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}
impl<K, V> FromIterator<(K, V)> for Query
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl<K, V, const N: usize> From<[(K, V); N]> for Query
where
	K: Into<String>,
	V: Into<String>,
{
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}
impl<K, V> From<Vec<(K, V)>> for Query
where
	K: Into<String>,
	V: Into<String>,
{
	fn from(pairs: Vec<(K, V)>) -> Self {
		pairs.into_iter().collect()
	}
}

/// Method, path, parameters, and body of a request before URL resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL or path relative to the base URL.
	pub url: String,
	/// Query parameters.
	pub params: Query,
	/// JSON body.
	pub body: Option<serde_json::Value>,
}
impl RequestSpec {
	/// Creates a spec without parameters or body.
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self { method, url: url.into(), params: Query::default(), body: None }
	}

	/// Replaces the query parameters.
	pub fn with_params(mut self, params: impl Into<Query>) -> Self {
		self.params = params.into();

		self
	}

	/// Replaces the JSON body.
	pub fn with_body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}
}

/// Capability shared by [`RequestClient`] and [`AuthClient`](crate::flows::AuthClient).
pub trait Requester {
	/// Issues `spec` and returns its cancellable handle.
	fn request(&self, spec: RequestSpec) -> ResponseHandle;

	/// Issues a `GET` with query parameters.
	fn get(&self, url: &str, params: impl Into<Query>) -> ResponseHandle
	where
		Self: Sized,
	{
		self.request(RequestSpec::new(Method::Get, url).with_params(params))
	}

	/// Issues a `POST` with a JSON body.
	fn post(&self, url: &str, body: &impl Serialize) -> ResponseHandle
	where
		Self: Sized,
	{
		with_json_body(self, Method::Post, url, body)
	}

	/// Issues a `PUT` with a JSON body.
	fn put(&self, url: &str, body: &impl Serialize) -> ResponseHandle
	where
		Self: Sized,
	{
		with_json_body(self, Method::Put, url, body)
	}

	/// Issues a `PATCH` with a JSON body.
	fn patch(&self, url: &str, body: &impl Serialize) -> ResponseHandle
	where
		Self: Sized,
	{
		with_json_body(self, Method::Patch, url, body)
	}

	/// Issues a `DELETE`.
	fn delete(&self, url: &str) -> ResponseHandle
	where
		Self: Sized,
	{
		self.request(RequestSpec::new(Method::Delete, url))
	}

	/// Binds a REST resource rooted at `path`.
	fn rest(&self, path: impl Into<String>) -> RestResource<'_, Self>
	where
		Self: Sized,
	{
		RestResource::new(path, self)
	}
}

fn with_json_body<R>(
	requester: &R,
	method: Method,
	url: &str,
	body: &impl Serialize,
) -> ResponseHandle
where
	R: Requester,
{
	match serde_json::to_value(body) {
		Ok(body) => requester.request(RequestSpec::new(method, url).with_body(body)),
		Err(e) => ResponseHandle::failed(ConfigError::from(e).into()),
	}
}

/// HTTP client that injects the current access token into every request.
///
/// Clones share the access token, base URL, and trailing-slash mode; each call still gets
/// its own [`CancelHandle`].
pub struct RequestClient<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	shared: Arc<ClientShared>,
}
impl<T> RequestClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over the caller-provided transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let shared = ClientShared {
			authorization_key: config.authorization_key,
			authorization_prefix: config.authorization_prefix,
			base_url: RwLock::new(config.base_url),
			access_token: RwLock::new(None),
			trailing_slash: AtomicBool::new(config.trailing_slash),
		};

		Self { transport: transport.into(), shared: Arc::new(shared) }
	}

	/// Returns the underlying transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Returns the current access token.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.shared.access_token.read().clone()
	}

	/// Replaces the access token; `None` or an empty token stops sending the authorization
	/// header.
	pub fn set_access_token(&self, token: Option<TokenSecret>) {
		*self.shared.access_token.write() = token.filter(|token| !token.expose().is_empty());
	}

	/// Drops the access token so later requests carry no authorization header.
	pub fn clear_token(&self) {
		self.set_access_token(None);
	}

	/// Copies the access token from another client.
	pub fn sync_token<U>(&self, from: &RequestClient<U>)
	where
		U: ?Sized + HttpTransport,
	{
		self.set_access_token(from.access_token());
	}

	/// Returns the base URL.
	pub fn base_url(&self) -> Option<Url> {
		self.shared.base_url.read().clone()
	}

	/// Replaces the base URL.
	pub fn set_base_url(&self, base_url: Option<Url>) {
		*self.shared.base_url.write() = base_url;
	}

	/// Copies the base URL from another client.
	pub fn sync_base_url<U>(&self, from: &RequestClient<U>)
	where
		U: ?Sized + HttpTransport,
	{
		self.set_base_url(from.base_url());
	}

	/// Returns whether request paths get a trailing `/`.
	pub fn trailing_slash(&self) -> bool {
		self.shared.trailing_slash.load(Ordering::Relaxed)
	}

	/// Toggles the trailing-slash mode for every subsequent dispatch.
	pub fn set_trailing_slash(&self, enabled: bool) {
		self.shared.trailing_slash.store(enabled, Ordering::Relaxed);
	}

	/// Decodes the current access token's payload without verifying it.
	pub fn current_claims<C>(&self) -> Option<JwtPayload<C>>
	where
		C: DeserializeOwned,
	{
		self.shared.access_token.read().as_ref().and_then(|token| auth::decode(token.expose()))
	}

	/// Issues `GET url` with query parameters.
	pub fn get(&self, url: &str, params: impl Into<Query>) -> ResponseHandle {
		<Self as Requester>::get(self, url, params)
	}

	/// Issues `POST url` with a JSON body.
	pub fn post(&self, url: &str, body: &impl Serialize) -> ResponseHandle {
		<Self as Requester>::post(self, url, body)
	}

	/// Issues `PUT url` with a JSON body.
	pub fn put(&self, url: &str, body: &impl Serialize) -> ResponseHandle {
		<Self as Requester>::put(self, url, body)
	}

	/// Issues `PATCH url` with a JSON body.
	pub fn patch(&self, url: &str, body: &impl Serialize) -> ResponseHandle {
		<Self as Requester>::patch(self, url, body)
	}

	/// Issues `DELETE url`.
	pub fn delete(&self, url: &str) -> ResponseHandle {
		<Self as Requester>::delete(self, url)
	}

	/// Binds a REST resource rooted at `path`.
	pub fn rest(&self, path: impl Into<String>) -> RestResource<'_, Self> {
		RestResource::new(path, self)
	}

	/// Builds the dispatch future for `spec`.
	///
	/// URL resolution and header injection happen on first poll.
	pub(crate) fn dispatch(
		&self,
		spec: RequestSpec,
	) -> impl Future<Output = Result<HttpResponse>> + Send + 'static + use<T> {
		let transport = Arc::clone(&self.transport);
		let shared = Arc::clone(&self.shared);

		async move {
			let request = shared.prepare(spec)?;

			obs::flow_debug!(method = %request.method, url = %request.url, "Dispatching request.");

			let response = transport.execute(request).await?;

			if response.is_success() {
				Ok(response)
			} else {
				obs::flow_debug!(status = response.status, "Request failed with a non-2xx status.");

				Err(Error::HttpStatus { status: response.status, body: response.body })
			}
		}
	}
}
#[cfg(feature = "reqwest")]
impl RequestClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_transport(config, ReqwestTransport::default())
	}
}
impl<T> Requester for RequestClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn request(&self, spec: RequestSpec) -> ResponseHandle {
		let cancel = CancelHandle::default();
		let stage = cancel.guard(self.dispatch(spec));

		ResponseHandle::new(Box::pin(stage), cancel)
	}
}
impl<T> Clone for RequestClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: Arc::clone(&self.transport), shared: Arc::clone(&self.shared) }
	}
}
impl<T> Debug for RequestClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestClient")
			.field("base_url", &self.base_url().map(String::from))
			.field("authorization_key", &self.shared.authorization_key)
			.field("access_token_set", &self.shared.access_token.read().is_some())
			.field("trailing_slash", &self.trailing_slash())
			.finish()
	}
}

struct ClientShared {
	authorization_key: String,
	authorization_prefix: String,
	base_url: RwLock<Option<Url>>,
	access_token: RwLock<Option<TokenSecret>>,
	trailing_slash: AtomicBool,
}
impl ClientShared {
	fn prepare(&self, spec: RequestSpec) -> Result<HttpRequest, ConfigError> {
		let base_url = self.base_url.read().clone();
		let url = resolve_url(
			base_url.as_ref(),
			&spec.url,
			self.trailing_slash.load(Ordering::Relaxed),
			&spec.params,
		)?;
		let mut headers = Vec::new();

		if let Some(token) = self.access_token.read().as_ref() {
			headers.push((
				self.authorization_key.clone(),
				config::authorization_value(&self.authorization_prefix, token.expose()),
			));
		}

		Ok(HttpRequest { method: spec.method, url, headers, body: spec.body })
	}
}

/// Resolves `path` against `base_url`, applies the trailing-slash mode, and appends `params`.
///
/// Absolute `path`s bypass the base URL. Relative paths are joined onto the base path rather
/// than replacing it, so `/items` under `https://host/api` becomes `https://host/api/items`.
pub fn resolve_url(
	base_url: Option<&Url>,
	path: &str,
	trailing_slash: bool,
	params: &Query,
) -> Result<Url, ConfigError> {
	let joined = match (Url::parse(path), base_url) {
		(Ok(absolute), _) => absolute.to_string(),
		(Err(_), Some(base)) if path.is_empty() => base.to_string(),
		(Err(_), Some(base)) =>
			format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/')),
		(Err(_), None) => path.to_owned(),
	};
	let mut url = Url::parse(&joined)
		.map_err(|source| ConfigError::InvalidRequestUrl { value: joined.clone(), source })?;

	if trailing_slash && !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}
	if !params.is_empty() {
		url.query_pairs_mut().extend_pairs(params.iter());
	}

	Ok(url)
}
