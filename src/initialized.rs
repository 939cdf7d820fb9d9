use std::sync::Arc;

use crate::{BaseObservable, BaseSubject, Dispatcher, ObservableOptional, Observation, SimpleDisposable};

/// An observation that always holds a value.
pub struct ObservationInitialized<T> {
	observation: Observation<T>,
}

impl<T> Clone for ObservationInitialized<T> {
	fn clone(&self) -> Self {
		Self {
			observation: self.observation.clone(),
		}
	}
}

impl<T> ObservationInitialized<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(value: T) -> Self {
		ObservationInitialized {
			observation: Observation::new(ObservableOptional::Value(value), None),
		}
	}

	pub fn with_dispatcher(value: T, dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationInitialized {
			observation: Observation::with_dispatcher(ObservableOptional::Value(value), None, dispatcher),
		}
	}

	#[inline]
	pub fn observation(&self) -> &Observation<T> {
		&self.observation
	}

	pub fn current(&self) -> T {
		// Starts as a `Value` and every `T` narrows to itself.
		match self.observation.current() {
			ObservableOptional::Value(value) => value,
			ObservableOptional::Nothing => unreachable!("initialized observation without a value"),
		}
	}

	pub fn observe(&self, on_next: impl Fn(&T) + Send + Sync + 'static) -> SimpleDisposable {
		self.observation.observe(move |value| {
			if let Some(value) = value {
				on_next(value)
			}
		})
	}
}

/// Read-only view of a value that is always present.
pub struct InitializedObservable<T> {
	inner: ObservationInitialized<T>,
}

impl<T: Clone> Clone for InitializedObservable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> InitializedObservable<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(value: T) -> Self {
		ObservationInitialized::new(value).into()
	}

	pub fn with_dispatcher(value: T, dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationInitialized::with_dispatcher(value, dispatcher).into()
	}

	#[inline]
	pub fn current(&self) -> T {
		self.inner.current()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(&T) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}
}

impl<T> From<ObservationInitialized<T>> for InitializedObservable<T> {
	fn from(inner: ObservationInitialized<T>) -> Self {
		InitializedObservable { inner }
	}
}

impl<T> BaseObservable for InitializedObservable<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = T;
	type Raw = T;

	fn observation(&self) -> &Observation<T> {
		self.inner.observation()
	}
}

/// A value that is always present and can be updated.
pub struct InitializedSubject<T> {
	inner: ObservationInitialized<T>,
}

impl<T: Clone> Clone for InitializedSubject<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> InitializedSubject<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(value: T) -> Self {
		ObservationInitialized::new(value).into()
	}

	pub fn with_dispatcher(value: T, dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationInitialized::with_dispatcher(value, dispatcher).into()
	}

	#[inline]
	pub fn current(&self) -> T {
		self.inner.current()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(&T) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}

	/// A read-only view sharing this subject's value.
	pub fn as_observable(&self) -> InitializedObservable<T> {
		self.inner.clone().into()
	}
}

impl<T> From<ObservationInitialized<T>> for InitializedSubject<T> {
	fn from(inner: ObservationInitialized<T>) -> Self {
		InitializedSubject { inner }
	}
}

impl<T> BaseObservable for InitializedSubject<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = T;
	type Raw = T;

	fn observation(&self) -> &Observation<T> {
		self.inner.observation()
	}
}

impl<T> BaseSubject for InitializedSubject<T> where T: Clone + PartialEq + Send + Sync + 'static {}
