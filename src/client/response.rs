//! Cancellable response handles.

// std
use std::future::IntoFuture;
// crates.io
use futures::future::{AbortHandle, Abortable};
// self
use crate::{_prelude::*, http::HttpResponse, obs, schema::Schema};

/// Boxed future resolving to the raw response of one request.
pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send>>;

/// Cancels the request (or request chain) that issued it.
///
/// Cancellation is sticky: stages registered after [`cancel`](Self::cancel) are aborted before
/// they are polled. Cancelling one handle never affects other requests.
#[derive(Clone, Default)]
pub struct CancelHandle(Arc<Mutex<CancelState>>);
impl CancelHandle {
	/// Aborts every in-flight stage and any stage registered later.
	pub fn cancel(&self) {
		let mut state = self.0.lock();

		state.cancelled = true;

		for handle in state.active.drain(..) {
			handle.abort();
		}
	}

	/// Returns `true` once [`cancel`](Self::cancel) was called.
	pub fn is_cancelled(&self) -> bool {
		self.0.lock().cancelled
	}

	/// Wraps one network stage so it resolves to [`Error::Cancelled`] once cancelled.
	pub(crate) fn guard<F, T>(&self, stage: F) -> impl Future<Output = Result<T>> + use<F, T>
	where
		F: Future<Output = Result<T>>,
	{
		let (handle, registration) = AbortHandle::new_pair();

		{
			let mut state = self.0.lock();

			if state.cancelled {
				handle.abort();
			} else {
				state.active.push(handle);
			}
		}

		let stage = Abortable::new(stage, registration);

		async move {
			match stage.await {
				Ok(result) => result,
				Err(_) => Err(Error::Cancelled),
			}
		}
	}
}
impl Debug for CancelHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CancelHandle").field("cancelled", &self.is_cancelled()).finish()
	}
}

#[derive(Default)]
struct CancelState {
	cancelled: bool,
	active: Vec<AbortHandle>,
}

/// Pending response returned by every request method.
///
/// Nothing is sent until the handle is awaited; the authorization header is read at that
/// point, so a token installed between the call and the first poll is picked up.
pub struct ResponseHandle {
	future: ResponseFuture,
	cancel: CancelHandle,
}
impl ResponseHandle {
	pub(crate) fn new(future: ResponseFuture, cancel: CancelHandle) -> Self {
		Self { future, cancel }
	}

	pub(crate) fn failed(error: Error) -> Self {
		Self::new(Box::pin(async move { Err(error) }), CancelHandle::default())
	}

	/// Returns a handle that cancels this request from elsewhere.
	pub fn cancel_handle(&self) -> CancelHandle {
		self.cancel.clone()
	}

	/// Cancels this request.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Awaits the raw response.
	pub async fn response(self) -> Result<HttpResponse> {
		self.future.await
	}

	/// Awaits the response and applies `schema`.
	///
	/// Transport and status failures surface as `Err`. A payload that fails validation is
	/// logged and resolves to `Ok(None)`, so callers branch on absence explicitly.
	pub async fn parse<S>(self, schema: &S) -> Result<Option<S::Output>>
	where
		S: ?Sized + Schema,
	{
		let response = self.future.await?;

		match schema.validate(&response.body) {
			Ok(value) => Ok(Some(value)),
			Err(_e) => {
				obs::flow_warn!(
					path = %_e.path,
					message = %_e.message,
					"Response failed schema validation."
				);

				Ok(None)
			},
		}
	}

	/// Awaits the response and applies `schema`, surfacing validation failures as
	/// [`Error::Validation`].
	pub async fn validate<S>(self, schema: &S) -> Result<S::Output>
	where
		S: ?Sized + Schema,
	{
		let response = self.future.await?;

		Ok(schema.validate(&response.body)?)
	}
}
impl IntoFuture for ResponseHandle {
	type IntoFuture = ResponseFuture;
	type Output = Result<HttpResponse>;

	fn into_future(self) -> Self::IntoFuture {
		self.future
	}
}
impl Debug for ResponseHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseHandle").field("cancel", &self.cancel).finish()
	}
}
