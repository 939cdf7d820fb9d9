//! Bridges between observables and other reactive primitives.
//!
//! * [`stream`]: any `futures::Stream` as a read-only observable.
//! * [`broadcast`]: a `tokio::sync::broadcast` channel as a subject.
//! * [`watch`]: a `tokio::sync::watch` cell as a subject or observable.
//! * [`property`]: a getter/setter pair as a subject or observable.
//!
//! Channel and stream adapters only start collecting once the observable is
//! observed for the first time.

pub mod property;

#[cfg(feature = "tokio")]
pub mod broadcast;
#[cfg(feature = "tokio")]
pub mod stream;
#[cfg(feature = "tokio")]
pub mod watch;

#[cfg(feature = "tokio")]
use std::future::Future;

#[cfg(feature = "tokio")]
use crate::observation::WeakObservation;
#[cfg(feature = "tokio")]
use crate::{Narrow, Observation, Scope};

/// Spawns `task` in `scope` when `observation` gets its first observer.
#[cfg(feature = "tokio")]
pub(crate) fn collect_on_first_observation<R, T, F, Fut>(
	observation: &Observation<R, T>,
	scope: &Scope,
	task: F,
) where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
	F: FnOnce(WeakObservation<R, T>) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let target = observation.downgrade();
	let scope = scope.clone();
	observation.set_on_first_observation(move || {
		tracing::debug!("starting upstream collection");
		scope.spawn(task(target));
	});
}
