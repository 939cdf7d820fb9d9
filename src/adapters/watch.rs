use std::sync::Arc;

use tokio::sync::watch;

use crate::adapters::collect_on_first_observation;
use crate::observation::WeakObservation;
use crate::{
	DefaultSubject, InitializedObservable, InitializedSubject, Narrow, Observation, ObservationDefault,
	ObservationInitialized, ObservableOptional, Scope,
};

/// Subjects backed by a watch cell.
///
/// Reads pull the latest value out of the cell, writes replace it.
pub trait WatchSubjectExt<T> {
	fn to_initialized_subject(&self, scope: &Scope) -> InitializedSubject<T>;
}

impl<T> WatchSubjectExt<T> for Arc<watch::Sender<T>>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn to_initialized_subject(&self, scope: &Scope) -> InitializedSubject<T> {
		let initial = self.borrow().clone();
		let inner = ObservationInitialized::with_dispatcher(initial, scope.dispatcher());
		connect(inner.observation(), self, scope);
		inner.into()
	}
}

pub trait WatchDefaultSubjectExt<R> {
	fn to_default_subject(&self, default: R, scope: &Scope) -> DefaultSubject<R>;
}

impl<R> WatchDefaultSubjectExt<R> for Arc<watch::Sender<Option<R>>>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	fn to_default_subject(&self, default: R, scope: &Scope) -> DefaultSubject<R> {
		let initial = ObservableOptional::Value(self.borrow().clone());
		let inner = ObservationDefault::with_initial(default, initial, Some(scope.dispatcher()));
		connect(inner.observation(), self, scope);
		inner.into()
	}
}

/// Read-only observables following a watch cell.
pub trait WatchObservableExt<T> {
	fn into_initialized_observable(self, scope: &Scope) -> InitializedObservable<T>;
}

impl<T> WatchObservableExt<T> for watch::Receiver<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn into_initialized_observable(self, scope: &Scope) -> InitializedObservable<T> {
		let initial = self.borrow().clone();
		let inner = ObservationInitialized::with_dispatcher(initial, scope.dispatcher());
		let observation = inner.observation();

		let latest = self.clone();
		observation.set_before_get(move || latest.borrow().clone());
		collect_on_first_observation(observation, scope, move |target| follow(self, target));

		inner.into()
	}
}

fn connect<R, T>(observation: &Observation<R, T>, sender: &Arc<watch::Sender<T>>, scope: &Scope)
where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
{
	let latest = sender.subscribe();
	observation.set_before_get(move || latest.borrow().clone());

	let outgoing = sender.clone();
	observation.set_write_through(move |value| {
		outgoing.send_replace(value.clone());
	});

	let incoming = sender.clone();
	collect_on_first_observation(observation, scope, move |target| {
		follow(incoming.subscribe(), target)
	});
}

async fn follow<R, T>(mut receiver: watch::Receiver<T>, target: WeakObservation<R, T>)
where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
{
	while receiver.changed().await.is_ok() {
		let value = receiver.borrow_and_update().clone();

		let Some(observation) = target.upgrade() else {
			break;
		};
		if let Err(error) = observation.set_upstream(value).await {
			tracing::warn!(%error, "stopping watch collection");
			break;
		}
	}
	tracing::debug!("watch collection finished");
}
