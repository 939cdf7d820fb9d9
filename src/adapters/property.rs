use std::sync::Arc;

use crate::{
	DefaultSubject, Dispatcher, Immediate, InitializedObservable, InitializedSubject, ObservationDefault,
	ObservationInitialized, ObservableOptional,
};

type Getter<T> = Arc<dyn Fn() -> T + Send + Sync>;
type Setter<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A value living elsewhere, reachable through a getter and a setter.
///
/// Subjects made from a property read it through the getter on every access
/// and write to it through the setter on every update, so changes made
/// directly to the property show up on the next read.
pub struct Property<T> {
	get: Getter<T>,
	set: Setter<T>,
	dispatcher: Arc<dyn Dispatcher>,
}

impl<T> Clone for Property<T> {
	fn clone(&self) -> Self {
		Property {
			get: self.get.clone(),
			set: self.set.clone(),
			dispatcher: self.dispatcher.clone(),
		}
	}
}

impl<T> Property<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(
		get: impl Fn() -> T + Send + Sync + 'static,
		set: impl Fn(T) + Send + Sync + 'static,
	) -> Self {
		Property {
			get: Arc::new(get),
			set: Arc::new(set),
			dispatcher: Immediate::shared(),
		}
	}

	pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
		self.dispatcher = dispatcher;
		self
	}

	pub fn get(&self) -> T {
		(self.get)()
	}

	pub fn set(&self, value: T) {
		(self.set)(value)
	}

	pub fn into_initialized_subject(self) -> InitializedSubject<T> {
		let inner = ObservationInitialized::with_dispatcher(self.get(), self.dispatcher.clone());
		let observation = inner.observation();

		let get = self.get;
		observation.set_before_get(move || get());
		let set = self.set;
		observation.set_write_through(move |value| set(value.clone()));

		inner.into()
	}
}

impl<R> Property<Option<R>>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	/// A subject reading `default` whenever the property holds `None`.
	pub fn into_default_subject(self, default: R) -> DefaultSubject<R> {
		let initial = ObservableOptional::Value(self.get());
		let inner = ObservationDefault::with_initial(default, initial, Some(self.dispatcher.clone()));
		let observation = inner.observation();

		let get = self.get;
		observation.set_before_get(move || get());
		let set = self.set;
		observation.set_write_through(move |value| set(value.clone()));

		inner.into()
	}
}

/// A read-only [`Property`].
pub struct ReadProperty<T> {
	get: Getter<T>,
	dispatcher: Arc<dyn Dispatcher>,
}

impl<T> ReadProperty<T>
where
	T: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(get: impl Fn() -> T + Send + Sync + 'static) -> Self {
		ReadProperty {
			get: Arc::new(get),
			dispatcher: Immediate::shared(),
		}
	}

	pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
		self.dispatcher = dispatcher;
		self
	}

	pub fn into_initialized_observable(self) -> InitializedObservable<T> {
		let inner = ObservationInitialized::with_dispatcher((self.get)(), self.dispatcher);
		let get = self.get;
		inner.observation().set_before_get(move || get());
		inner.into()
	}
}

impl<T> From<Property<T>> for ReadProperty<T> {
	fn from(property: Property<T>) -> Self {
		ReadProperty {
			get: property.get,
			dispatcher: property.dispatcher,
		}
	}
}
