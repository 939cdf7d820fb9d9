use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::adapters::collect_on_first_observation;
use crate::observation::WeakObservation;
use crate::{
	DefaultSubject, InitializedSubject, Narrow, Observation, ObservationDefault, ObservationInitialized,
	ObservationUninitialized, ObservableOptional, Scope, UninitializedSubject,
};

/// Subjects backed by a broadcast channel.
///
/// Values set on the subject are sent to the channel. Values sent by
/// anybody else are picked up once the subject is observed.
pub trait BroadcastSubjectExt<T> {
	fn to_initialized_subject(&self, initial: T, scope: &Scope) -> InitializedSubject<T>;

	fn to_uninitialized_subject(&self, scope: &Scope) -> UninitializedSubject<T>;
}

impl<T> BroadcastSubjectExt<T> for broadcast::Sender<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn to_initialized_subject(&self, initial: T, scope: &Scope) -> InitializedSubject<T> {
		let inner = ObservationInitialized::with_dispatcher(initial, scope.dispatcher());
		connect(inner.observation(), self, scope);
		inner.into()
	}

	fn to_uninitialized_subject(&self, scope: &Scope) -> UninitializedSubject<T> {
		let inner = ObservationUninitialized::with_dispatcher(scope.dispatcher());
		connect(inner.observation(), self, scope);
		inner.into()
	}
}

pub trait BroadcastDefaultSubjectExt<R> {
	fn to_default_subject(&self, default: R, scope: &Scope) -> DefaultSubject<R>;
}

impl<R> BroadcastDefaultSubjectExt<R> for broadcast::Sender<Option<R>>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	fn to_default_subject(&self, default: R, scope: &Scope) -> DefaultSubject<R> {
		let inner =
			ObservationDefault::with_initial(default, ObservableOptional::Nothing, Some(scope.dispatcher()));
		connect(inner.observation(), self, scope);
		inner.into()
	}
}

/// Values this subject sent itself and has yet to receive back.
///
/// `None` until the subject is observed and its receiver exists.
type Echoes<T> = Arc<Mutex<Option<VecDeque<T>>>>;

fn connect<R, T>(observation: &Observation<R, T>, sender: &broadcast::Sender<T>, scope: &Scope)
where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + PartialEq + Send + Sync + 'static,
{
	let echoes: Echoes<T> = Arc::new(Mutex::new(None));

	let outgoing = sender.clone();
	observation.set_write_through({
		let echoes = echoes.clone();
		move |value| {
			let mut echoes = echoes.lock();
			if let Some(pending) = echoes.as_mut() {
				pending.push_back(value.clone());
			}
			if outgoing.send(value.clone()).is_err() {
				tracing::trace!("no broadcast receivers");
				if let Some(pending) = echoes.as_mut() {
					pending.pop_back();
				}
			}
		}
	});

	let incoming = sender.clone();
	collect_on_first_observation(observation, scope, move |target| {
		let receiver = incoming.subscribe();
		*echoes.lock() = Some(VecDeque::new());
		receive(receiver, echoes, target)
	});
}

async fn receive<R, T>(
	mut receiver: broadcast::Receiver<T>,
	echoes: Echoes<T>,
	target: WeakObservation<R, T>,
) where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + PartialEq + Send + Sync + 'static,
{
	loop {
		let value = match receiver.recv().await {
			Ok(value) => value,
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "broadcast receiver lagged behind");
				if let Some(pending) = echoes.lock().as_mut() {
					pending.clear();
				}
				continue;
			}
			Err(RecvError::Closed) => break,
		};

		if is_echo(&echoes, &value) {
			continue;
		}

		let Some(observation) = target.upgrade() else {
			break;
		};
		if let Err(error) = observation.set_upstream(value).await {
			tracing::warn!(%error, "stopping broadcast collection");
			break;
		}
	}
	tracing::debug!("broadcast collection finished");
}

fn is_echo<T: PartialEq>(echoes: &Echoes<T>, value: &T) -> bool {
	let mut echoes = echoes.lock();
	match echoes.as_mut() {
		Some(pending) if pending.front() == Some(value) => {
			pending.pop_front();
			true
		}
		_ => false,
	}
}
