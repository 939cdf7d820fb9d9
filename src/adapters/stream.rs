use futures::{Stream, StreamExt};

use crate::adapters::collect_on_first_observation;
use crate::observation::WeakObservation;
use crate::{
	DefaultObservable, InitializedObservable, Narrow, ObservationDefault, ObservationInitialized,
	ObservationUninitialized, ObservableOptional, Scope, UninitializedObservable,
};

/// Turns a stream into an observable of its latest item.
pub trait StreamObservableExt: Stream + Sized + Send + 'static {
	fn into_initialized_observable(
		self,
		initial: Self::Item,
		scope: &Scope,
	) -> InitializedObservable<Self::Item>
	where
		Self::Item: Clone + PartialEq + Send + Sync + 'static,
	{
		let inner = ObservationInitialized::with_dispatcher(initial, scope.dispatcher());
		collect_on_first_observation(inner.observation(), scope, move |target| {
			forward(self, target)
		});
		inner.into()
	}

	fn into_uninitialized_observable(self, scope: &Scope) -> UninitializedObservable<Self::Item>
	where
		Self::Item: Clone + PartialEq + Send + Sync + 'static,
	{
		let inner = ObservationUninitialized::with_dispatcher(scope.dispatcher());
		collect_on_first_observation(inner.observation(), scope, move |target| {
			forward(self, target)
		});
		inner.into()
	}

	/// `None` items and the time before the first item read as `default`.
	fn into_default_observable<R>(self, default: R, scope: &Scope) -> DefaultObservable<R>
	where
		Self: Stream<Item = Option<R>>,
		R: Clone + PartialEq + Send + Sync + 'static,
	{
		let inner =
			ObservationDefault::with_initial(default, ObservableOptional::Nothing, Some(scope.dispatcher()));
		collect_on_first_observation(inner.observation(), scope, move |target| {
			forward(self, target)
		});
		inner.into()
	}
}

impl<S> StreamObservableExt for S where S: Stream + Sized + Send + 'static {}

async fn forward<S, R, T>(source: S, target: WeakObservation<R, T>)
where
	S: Stream<Item = T> + Send,
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
{
	futures::pin_mut!(source);
	while let Some(value) = source.next().await {
		let Some(observation) = target.upgrade() else {
			break;
		};
		if let Err(error) = observation.set_upstream(value).await {
			tracing::warn!(%error, "stopping stream collection");
			break;
		}
	}
	tracing::debug!("stream collection finished");
}
