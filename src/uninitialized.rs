use std::sync::Arc;

use crate::{BaseObservable, BaseSubject, Dispatcher, ObservableOptional, Observation, SimpleDisposable};

/// An observation that starts without a value.
pub struct ObservationUninitialized<T> {
	observation: Observation<T>,
}

impl<T> Clone for ObservationUninitialized<T> {
	fn clone(&self) -> Self {
		Self {
			observation: self.observation.clone(),
		}
	}
}

impl<T> ObservationUninitialized<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new() -> Self {
		ObservationUninitialized {
			observation: Observation::new(ObservableOptional::Nothing, None),
		}
	}

	pub fn with_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationUninitialized {
			observation: Observation::with_dispatcher(ObservableOptional::Nothing, None, dispatcher),
		}
	}

	#[inline]
	pub fn observation(&self) -> &Observation<T> {
		&self.observation
	}

	pub fn current_or_none(&self) -> Option<T> {
		self.observation.current().into_option()
	}

	pub fn observe(&self, on_next: impl Fn(Option<&T>) + Send + Sync + 'static) -> SimpleDisposable {
		self.observation.observe(on_next)
	}
}

impl<T> Default for ObservationUninitialized<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

pub struct UninitializedObservable<T> {
	inner: ObservationUninitialized<T>,
}

impl<T> Clone for UninitializedObservable<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> UninitializedObservable<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new() -> Self {
		ObservationUninitialized::new().into()
	}

	pub fn with_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationUninitialized::with_dispatcher(dispatcher).into()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(Option<&T>) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}
}

impl<T> Default for UninitializedObservable<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> From<ObservationUninitialized<T>> for UninitializedObservable<T> {
	fn from(inner: ObservationUninitialized<T>) -> Self {
		UninitializedObservable { inner }
	}
}

impl<T> BaseObservable for UninitializedObservable<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = T;
	type Raw = T;

	fn observation(&self) -> &Observation<T> {
		self.inner.observation()
	}
}

/// A subject that may not have a value yet.
pub struct UninitializedSubject<T> {
	inner: ObservationUninitialized<T>,
}

impl<T> Clone for UninitializedSubject<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> UninitializedSubject<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new() -> Self {
		ObservationUninitialized::new().into()
	}

	pub fn with_dispatcher(dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationUninitialized::with_dispatcher(dispatcher).into()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(Option<&T>) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}

	pub fn as_observable(&self) -> UninitializedObservable<T> {
		self.inner.clone().into()
	}
}

impl<T> Default for UninitializedSubject<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T> From<ObservationUninitialized<T>> for UninitializedSubject<T> {
	fn from(inner: ObservationUninitialized<T>) -> Self {
		UninitializedSubject { inner }
	}
}

impl<T> BaseObservable for UninitializedSubject<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = T;
	type Raw = T;

	fn observation(&self) -> &Observation<T> {
		self.inner.observation()
	}
}

impl<T> BaseSubject for UninitializedSubject<T> where T: Clone + PartialEq + Send + Sync + 'static {}
