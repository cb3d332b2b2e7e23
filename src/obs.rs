//! Optional observability helpers for token flows.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits structured spans named `token_relay.flow` with the `flow` and
//!   `stage` (call site) fields, plus warn/debug events when a refresh is skipped or a payload
//!   fails validation.
//! - `metrics` increments the `token_relay_flow_total` counter for every attempt/success/failure,
//!   labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

/// Emits a `warn` event when the `tracing` feature is enabled.
macro_rules! flow_warn {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		{
			::tracing::warn!($($arg)+);
		}
	}};
}
pub(crate) use flow_warn;

/// Emits a `debug` event when the `tracing` feature is enabled.
macro_rules! flow_debug {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!($($arg)+);
		}
	}};
}
pub(crate) use flow_debug;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Token flows observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Token installation through `sign`.
	Sign,
	/// Access-token refresh through the refresh callback.
	Refresh,
	/// GET with transparent refresh-and-replay.
	VerifiedRequest,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Sign => "sign",
			FlowKind::Refresh => "refresh",
			FlowKind::VerifiedRequest => "verified_request",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
