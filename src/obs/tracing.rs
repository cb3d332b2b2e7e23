// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Anything a flow can resolve to that distinguishes success from failure.
pub trait FlowResult {
	/// Returns `true` when the flow succeeded.
	fn is_success(&self) -> bool;
}
impl FlowResult for bool {
	fn is_success(&self) -> bool {
		*self
	}
}
impl<T, E> FlowResult for Result<T, E> {
	fn is_success(&self) -> bool {
		self.is_ok()
	}
}

/// Span wrapping one execution of a token flow.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("token_relay.flow", flow = kind.as_str(), stage) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Runs `fut` inside a [`FlowSpan`] and records attempt plus success/failure outcomes.
pub async fn observe<Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Fut::Output
where
	Fut: Future,
	Fut::Output: FlowResult,
{
	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let output = FlowSpan::new(kind, stage).instrument(fut).await;
	let outcome = if output.is_success() { FlowOutcome::Success } else { FlowOutcome::Failure };

	obs::record_flow_outcome(kind, outcome);

	output
}
