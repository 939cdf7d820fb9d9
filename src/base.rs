use std::future::Future;

#[cfg(feature = "tokio")]
use futures::{Stream, StreamExt};

use crate::{Error, Narrow, ObservableOptional, Observation, SimpleDisposable, Updates};

#[cfg(feature = "tokio")]
use crate::Scope;

/// Read-only access to an [`Observation`].
pub trait BaseObservable {
	/// The type listeners receive.
	type Item: Clone + PartialEq + Send + Sync + 'static;

	/// The type values are set with.
	type Raw: Narrow<Self::Item> + Clone + Send + Sync + 'static;

	fn observation(&self) -> &Observation<Self::Item, Self::Raw>;

	/// Observes the value, including the absence of one.
	fn observe_optional(
		&self,
		on_next: impl Fn(Option<&Self::Item>) + Send + Sync + 'static,
	) -> SimpleDisposable {
		self.observation().observe(on_next)
	}

	fn current_or_none(&self) -> Option<Self::Item> {
		self.observation().current().into_option()
	}

	fn initial_value(&self) -> &ObservableOptional<Self::Raw> {
		self.observation().initial_value()
	}

	/// A stream starting with the current value followed by every change.
	fn updates(&self) -> Updates<Self::Item> {
		Updates::new(self.observation())
	}
}

/// Read-write access to an [`Observation`].
pub trait BaseSubject: BaseObservable {
	/// Fire-and-forget update.
	fn post(&self, value: Self::Raw) {
		self.observation().post(value)
	}

	fn set_blocking(&self, value: Self::Raw) -> Result<ObservableOptional<Self::Raw>, Error> {
		self.observation().set_blocking(value)
	}

	/// Updates the value and waits until listeners were notified.
	fn set(
		&self,
		value: Self::Raw,
	) -> impl Future<Output = Result<ObservableOptional<Self::Raw>, Error>> + Send + 'static {
		self.observation().set_async(value)
	}

	/// Forwards every item of `source` into [`set`](Self::set) until the
	/// scope is cancelled or the stream ends.
	#[cfg(feature = "tokio")]
	fn bind<S>(&self, source: S, scope: &Scope) -> tokio::task::JoinHandle<()>
	where
		S: Stream<Item = Self::Raw> + Send + 'static,
	{
		let observation = self.observation().clone();
		scope.spawn(async move {
			futures::pin_mut!(source);
			while let Some(value) = source.next().await {
				if let Err(error) = observation.set_async(value).await {
					tracing::warn!(%error, "stopping binding");
					break;
				}
			}
		})
	}
}
