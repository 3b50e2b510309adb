//! Optional observability for relay flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap each flow in a span named `bearer_relay.flow` carrying the `flow`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `bearer_relay_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.
//!
//! With neither feature enabled everything in here compiles down to nothing.

// std
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
};
// self
use crate::error::Result;

/// Relay operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authenticated send (the fast path plus any recovery).
	Send,
	/// Access-token refresh against the auth service.
	Refresh,
	/// Remote logout plus local credential clear.
	Logout,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Send => "send",
			FlowKind::Refresh => "refresh",
			FlowKind::Logout => "logout",
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
	/// Entry to a relay operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
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

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bearer_relay_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Runs a relay flow with attempt/success/failure recording and, when the
/// `tracing` feature is on, a span wrapped around the whole invocation.
pub(crate) async fn observe_flow<T, Fut>(
	kind: FlowKind,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = instrument_flow(kind, stage, fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}

#[cfg(feature = "tracing")]
fn instrument_flow<Fut>(
	kind: FlowKind,
	stage: &'static str,
	fut: Fut,
) -> tracing::instrument::Instrumented<Fut>
where
	Fut: Future,
{
	use tracing::Instrument;

	fut.instrument(tracing::info_span!("bearer_relay.flow", flow = kind.as_str(), stage))
}
#[cfg(not(feature = "tracing"))]
fn instrument_flow<Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Fut
where
	Fut: Future,
{
	let _ = (kind, stage);

	fut
}
