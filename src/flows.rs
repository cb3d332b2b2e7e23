//! Token lifecycle on top of [`RequestClient`]: sign-in, refresh, and verified requests.

pub mod refresh;
pub mod verify;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{JwtPayload, RefreshTokens, TokenSecret},
	client::{ClientConfig, RequestClient, RequestSpec, Requester, ResponseHandle, RestResource},
	http::HttpTransport,
	store::RefreshTokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Auth client specialized for the crate's default reqwest transport.
pub type ReqwestAuthClient = AuthClient<ReqwestTransport>;

/// Boxed future returned by [`RefreshCallback::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Option<String>> + 'a + Send>>;

/// Exchanges a refresh token for a new access token.
///
/// Implementations resolve to the new access token, or `None` (or an empty string) when the
/// exchange failed. The base URL of the auth client is passed along so the callback can reach
/// the same API.
pub trait RefreshCallback
where
	Self: Send + Sync,
{
	/// Runs one exchange.
	fn refresh(&self, tokens: RefreshTokens, base_url: Option<Url>) -> RefreshFuture<'_>;
}
impl<F, Fut> RefreshCallback for F
where
	F: Send + Sync + Fn(RefreshTokens, Option<Url>) -> Fut,
	Fut: 'static + Send + Future<Output = Option<String>>,
{
	fn refresh(&self, tokens: RefreshTokens, base_url: Option<Url>) -> RefreshFuture<'_> {
		Box::pin(self(tokens, base_url))
	}
}

/// Request client that owns an access/refresh token lifecycle.
///
/// The access token lives in memory on the wrapped [`RequestClient`]; the refresh token is
/// persisted through a [`RefreshTokenStore`]. Clones share both, the refresh callback, and the
/// single-flight state, so concurrent refreshes through any clone collapse into one exchange.
pub struct AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	client: RequestClient<T>,
	tokens: RefreshTokenStore,
	refresh_callback: Option<Arc<dyn RefreshCallback>>,
	single_flight: Arc<SingleFlight>,
}
impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps an existing request client and refresh-token store.
	pub fn with_client(client: RequestClient<T>, tokens: RefreshTokenStore) -> Self {
		Self {
			refresh_metrics: Default::default(),
			client,
			tokens,
			refresh_callback: None,
			single_flight: Default::default(),
		}
	}

	/// Creates a client over the caller-provided transport with an in-memory token store.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		Self::with_client(
			RequestClient::with_transport(config, transport),
			RefreshTokenStore::in_memory(),
		)
	}

	/// Replaces the refresh-token store.
	pub fn with_token_store(mut self, tokens: RefreshTokenStore) -> Self {
		self.tokens = tokens;

		self
	}

	/// Installs the refresh callback.
	pub fn with_refresh_callback(mut self, callback: Arc<dyn RefreshCallback>) -> Self {
		self.refresh_callback = Some(callback);

		self
	}

	/// Installs a closure as the refresh callback.
	pub fn with_refresh_fn<F, Fut>(self, callback: F) -> Self
	where
		F: 'static + Send + Sync + Fn(RefreshTokens, Option<Url>) -> Fut,
		Fut: 'static + Send + Future<Output = Option<String>>,
	{
		self.with_refresh_callback(Arc::new(callback))
	}

	/// Returns the wrapped request client.
	pub fn client(&self) -> &RequestClient<T> {
		&self.client
	}

	/// Returns the refresh-token store.
	pub fn token_store(&self) -> &RefreshTokenStore {
		&self.tokens
	}

	/// Returns `true` when a refresh callback is installed.
	pub fn has_refresh_callback(&self) -> bool {
		self.refresh_callback.is_some()
	}

	/// Returns the current access token.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.client.access_token()
	}

	/// Drops the access token. The persisted refresh token is kept.
	pub fn clear_token(&self) {
		self.client.clear_token();
	}

	/// Decodes the current access token's payload without verifying it.
	pub fn current_claims<C>(&self) -> Option<JwtPayload<C>>
	where
		C: DeserializeOwned,
	{
		self.client.current_claims()
	}

	/// Binds a REST resource rooted at `path`.
	pub fn rest(&self, path: impl Into<String>) -> RestResource<'_, Self> {
		RestResource::new(path, self)
	}
}
#[cfg(feature = "reqwest")]
impl AuthClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport and an in-memory token store.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_client(RequestClient::new(config), RefreshTokenStore::in_memory())
	}
}
impl<T> Requester for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn request(&self, spec: RequestSpec) -> ResponseHandle {
		self.client.request(spec)
	}
}
impl<T> Clone for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			refresh_metrics: Arc::clone(&self.refresh_metrics),
			client: self.client.clone(),
			tokens: self.tokens.clone(),
			refresh_callback: self.refresh_callback.clone(),
			single_flight: Arc::clone(&self.single_flight),
		}
	}
}
impl<T> Debug for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("client", &self.client)
			.field("tokens", &self.tokens)
			.field("refresh_callback_set", &self.refresh_callback.is_some())
			.finish()
	}
}
