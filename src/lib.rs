//! Bearer-token HTTP client with schema-checked responses and a single-shot
//! refresh-and-replay protocol for expired access tokens.
//!
//! [`client::RequestClient`] injects the authorization header, validates payloads through
//! [`schema::Schema`], and hands out independently cancellable [`client::ResponseHandle`]s.
//! [`flows::AuthClient`] wraps it with an access/refresh token lifecycle: a GET issued through
//! [`flows::AuthClient::get_with_verify`] that fails with `401` on an expired token triggers at
//! most one refresh and exactly one replay.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod schema;
pub mod store;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
