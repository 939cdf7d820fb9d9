use std::sync::Arc;

use crate::{BaseObservable, BaseSubject, Dispatcher, ObservableOptional, Observation, SimpleDisposable};

/// An observation that substitutes a default for a missing value.
///
/// Values are set as `Option<R>`; `None` and the unset state both read as
/// the default.
pub struct ObservationDefault<R> {
	observation: Observation<R, Option<R>>,
	default: R,
}

impl<R: Clone> Clone for ObservationDefault<R> {
	fn clone(&self) -> Self {
		Self {
			observation: self.observation.clone(),
			default: self.default.clone(),
		}
	}
}

impl<R> ObservationDefault<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(default: R, initial: Option<R>) -> Self {
		Self::with_initial(default, ObservableOptional::Value(initial), None)
	}

	/// Starts unset, reading as `default` until a value arrives.
	pub fn unset(default: R) -> Self {
		Self::with_initial(default, ObservableOptional::Nothing, None)
	}

	pub fn with_dispatcher(default: R, initial: Option<R>, dispatcher: Arc<dyn Dispatcher>) -> Self {
		Self::with_initial(default, ObservableOptional::Value(initial), Some(dispatcher))
	}

	pub(crate) fn with_initial(
		default: R,
		initial: ObservableOptional<Option<R>>,
		dispatcher: Option<Arc<dyn Dispatcher>>,
	) -> Self {
		let observation = match dispatcher {
			Some(dispatcher) => Observation::with_dispatcher(initial, Some(default.clone()), dispatcher),
			None => Observation::new(initial, Some(default.clone())),
		};
		ObservationDefault { observation, default }
	}

	#[inline]
	pub fn observation(&self) -> &Observation<R, Option<R>> {
		&self.observation
	}

	#[inline]
	pub fn default_value(&self) -> &R {
		&self.default
	}

	pub fn current(&self) -> R {
		self.observation
			.current()
			.into_option()
			.unwrap_or_else(|| self.default.clone())
	}

	pub fn observe(&self, on_next: impl Fn(&R) + Send + Sync + 'static) -> SimpleDisposable {
		self.observation.observe(move |value| {
			if let Some(value) = value {
				on_next(value)
			}
		})
	}
}

pub struct DefaultObservable<R> {
	inner: ObservationDefault<R>,
}

impl<R: Clone> Clone for DefaultObservable<R> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<R> DefaultObservable<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(default: R, initial: Option<R>) -> Self {
		ObservationDefault::new(default, initial).into()
	}

	pub fn with_dispatcher(default: R, initial: Option<R>, dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationDefault::with_dispatcher(default, initial, dispatcher).into()
	}

	#[inline]
	pub fn current(&self) -> R {
		self.inner.current()
	}

	#[inline]
	pub fn default_value(&self) -> &R {
		self.inner.default_value()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(&R) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}
}

impl<R> From<ObservationDefault<R>> for DefaultObservable<R> {
	fn from(inner: ObservationDefault<R>) -> Self {
		DefaultObservable { inner }
	}
}

impl<R> BaseObservable for DefaultObservable<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = R;
	type Raw = Option<R>;

	fn observation(&self) -> &Observation<R, Option<R>> {
		self.inner.observation()
	}
}

/// A subject that never exposes absence: `None` posts read as the default.
pub struct DefaultSubject<R> {
	inner: ObservationDefault<R>,
}

impl<R: Clone> Clone for DefaultSubject<R> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<R> DefaultSubject<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(default: R, initial: Option<R>) -> Self {
		ObservationDefault::new(default, initial).into()
	}

	pub fn with_dispatcher(default: R, initial: Option<R>, dispatcher: Arc<dyn Dispatcher>) -> Self {
		ObservationDefault::with_dispatcher(default, initial, dispatcher).into()
	}

	#[inline]
	pub fn current(&self) -> R {
		self.inner.current()
	}

	#[inline]
	pub fn default_value(&self) -> &R {
		self.inner.default_value()
	}

	#[inline]
	pub fn observe(&self, on_next: impl Fn(&R) + Send + Sync + 'static) -> SimpleDisposable {
		self.inner.observe(on_next)
	}

	pub fn as_observable(&self) -> DefaultObservable<R> {
		self.inner.clone().into()
	}
}

impl<R> From<ObservationDefault<R>> for DefaultSubject<R> {
	fn from(inner: ObservationDefault<R>) -> Self {
		DefaultSubject { inner }
	}
}

impl<R> BaseObservable for DefaultSubject<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	type Item = R;
	type Raw = Option<R>;

	fn observation(&self) -> &Observation<R, Option<R>> {
		self.inner.observation()
	}
}

impl<R> BaseSubject for DefaultSubject<R> where R: Clone + PartialEq + Send + Sync + 'static {}
