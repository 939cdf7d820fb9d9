use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use crate::dispatch::{run_async, run_blocking, Dispatcher, Immediate};
use crate::{Error, Narrow, ObservableOptional, SimpleDisposable};

pub type Listener<R> = Arc<dyn Fn(Option<&R>) + Send + Sync>;

type BeforeGet<T> = Arc<dyn Fn() -> T + Send + Sync>;
type WriteThrough<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Where a new value comes from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Origin {
	/// Set by application code through the observation.
	Local,
	/// Pulled or received from the external source an adapter tracks.
	Upstream,
}

/// The value holder shared by every observable and subject.
///
/// `R` is the type listeners see, `T` the type values are set with. The two
/// differ for default-backed observations, where `T = Option<R>` and a
/// missing value is replaced by the default.
///
/// Mutations and notification rounds run on the observation's
/// [`Dispatcher`]. Listeners are called synchronously, in registration
/// order, and only when the value actually changes.
pub struct Observation<R, T = R> {
	body: Arc<ObservationBody<R, T>>,
}

impl<R, T> Clone for Observation<R, T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

/// Does not keep the observation alive; used by background tasks feeding it.
pub(crate) struct WeakObservation<R, T> {
	body: Weak<ObservationBody<R, T>>,
}

impl<R, T> WeakObservation<R, T> {
	pub(crate) fn upgrade(&self) -> Option<Observation<R, T>> {
		self.body.upgrade().map(|body| Observation { body })
	}
}

struct ObservationBody<R, T> {
	initial_value: ObservableOptional<T>,
	default_value: Option<R>,
	dispatcher: Arc<dyn Dispatcher>,
	current: Mutex<ObservableOptional<R>>,
	listeners: Mutex<SmallVec<[(u64, Listener<R>); 4]>>,
	next_listener: AtomicU64,
	first_observation: Mutex<FirstObservation>,
	hooks: RwLock<Hooks<T>>,
}

enum FirstObservation {
	Pending(Option<Box<dyn FnOnce() + Send>>),
	Fired,
}

struct Hooks<T> {
	before_get: Option<BeforeGet<T>>,
	write_through: Option<WriteThrough<T>>,
}

impl<R, T> Observation<R, T>
where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
{
	pub fn new(initial_value: ObservableOptional<T>, default_value: Option<R>) -> Self {
		Self::with_dispatcher(initial_value, default_value, Immediate::shared())
	}

	pub fn with_dispatcher(
		initial_value: ObservableOptional<T>,
		default_value: Option<R>,
		dispatcher: Arc<dyn Dispatcher>,
	) -> Self {
		let current = initial_value.clone().as_result(default_value.as_ref());

		Observation {
			body: Arc::new(ObservationBody {
				initial_value,
				default_value,
				dispatcher,
				current: Mutex::new(current),
				listeners: Mutex::new(SmallVec::new()),
				next_listener: AtomicU64::new(0),
				first_observation: Mutex::new(FirstObservation::Pending(None)),
				hooks: RwLock::new(Hooks {
					before_get: None,
					write_through: None,
				}),
			}),
		}
	}

	#[inline]
	pub fn initial_value(&self) -> &ObservableOptional<T> {
		&self.body.initial_value
	}

	#[inline]
	pub fn default_value(&self) -> Option<&R> {
		self.body.default_value.as_ref()
	}

	#[inline]
	pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
		&self.body.dispatcher
	}

	/// Registers `on_next` and immediately calls it with the current value.
	///
	/// The first call to `observe` on an observation also fires the
	/// first-observation callback, before the listener is registered.
	/// Registration and the first delivery run on the dispatcher, so called
	/// from elsewhere this blocks until the main context got to it.
	pub fn observe(
		&self,
		on_next: impl Fn(Option<&R>) + Send + Sync + 'static,
	) -> SimpleDisposable {
		self.body.fire_first_observation();

		let listener: Listener<R> = Arc::new(on_next);
		let id = self.body.next_listener.fetch_add(1, Ordering::Relaxed);

		let body = self.body.clone();
		let attached = listener.clone();
		if let Err(error) = run_blocking(&*self.body.dispatcher, move || body.attach(id, attached)) {
			tracing::warn!(%error, "attaching listener outside the main context");
			self.body.attach(id, listener);
		}

		let body = Arc::downgrade(&self.body);
		SimpleDisposable::new(move || {
			if let Some(body) = Weak::upgrade(&body) {
				body.listeners.lock().retain(|(other, _)| *other != id);
			}
		})
	}

	/// The current value.
	///
	/// With a `before_get` hook installed the hook runs first (on the
	/// dispatcher) and a fresher value is applied before being returned.
	pub fn current(&self) -> ObservableOptional<R> {
		if self.body.hooks.read().before_get.is_some() {
			let body = self.body.clone();
			if let Err(error) = run_blocking(&*self.body.dispatcher, move || body.refresh()) {
				tracing::warn!(%error, "could not refresh observed value");
			}
		}
		self.body.current.lock().clone()
	}

	/// Updates the value without waiting for the main context.
	pub fn post(&self, value: T) {
		self.body.clone().post(value, Origin::Local);
	}

	/// Updates the value, blocking until the main context applied it.
	pub fn set_blocking(&self, value: T) -> Result<ObservableOptional<T>, Error> {
		let body = self.body.clone();
		run_blocking(&*self.body.dispatcher, move || body.apply(value, Origin::Local))
	}

	/// Updates the value, suspending until the main context applied it.
	pub fn set_async(
		&self,
		value: T,
	) -> impl Future<Output = Result<ObservableOptional<T>, Error>> + Send + 'static {
		let body = self.body.clone();
		let dispatcher = self.body.dispatcher.clone();
		run_async(dispatcher, move || body.apply(value, Origin::Local))
	}

	pub(crate) fn set_upstream(
		&self,
		value: T,
	) -> impl Future<Output = Result<ObservableOptional<T>, Error>> + Send + 'static {
		let body = self.body.clone();
		let dispatcher = self.body.dispatcher.clone();
		run_async(dispatcher, move || body.apply(value, Origin::Upstream))
	}

	/// Sets the callback fired on the first call to [`observe`](Self::observe).
	///
	/// If that call already happened the callback runs right away.
	pub fn set_on_first_observation(&self, callback: impl FnOnce() + Send + 'static) {
		let mut state = self.body.first_observation.lock();
		if let FirstObservation::Pending(pending) = &mut *state {
			*pending = Some(Box::new(callback));
			return;
		}

		std::mem::drop(state);
		callback();
	}

	/// Installs a hook computing a fresher value on every read.
	pub fn set_before_get(&self, hook: impl Fn() -> T + Send + Sync + 'static) {
		self.body.hooks.write().before_get = Some(Arc::new(hook));
	}

	/// Installs a hook receiving every locally set value before it is
	/// applied, used to push values out to an external source.
	pub fn set_write_through(&self, hook: impl Fn(&T) + Send + Sync + 'static) {
		self.body.hooks.write().write_through = Some(Arc::new(hook));
	}

	pub(crate) fn downgrade(&self) -> WeakObservation<R, T> {
		WeakObservation {
			body: Arc::downgrade(&self.body),
		}
	}

	pub fn is_observed(&self) -> bool {
		matches!(*self.body.first_observation.lock(), FirstObservation::Fired)
	}

	pub fn listener_count(&self) -> usize {
		self.body.listeners.lock().len()
	}
}

impl<R, T> ObservationBody<R, T>
where
	R: Clone + PartialEq + Send + Sync + 'static,
	T: Narrow<R> + Clone + Send + Sync + 'static,
{
	fn fire_first_observation(&self) {
		let callback = {
			let mut state = self.first_observation.lock();
			match std::mem::replace(&mut *state, FirstObservation::Fired) {
				FirstObservation::Pending(callback) => {
					tracing::debug!("first observation");
					callback
				}
				FirstObservation::Fired => None,
			}
		};

		if let Some(callback) = callback {
			callback();
		}
	}

	fn post(self: Arc<Self>, value: T, origin: Origin) {
		if self.dispatcher.is_current() {
			self.apply(value, origin);
			return;
		}

		let dispatcher = self.dispatcher.clone();
		let body = self.clone();
		if let Err(error) = dispatcher.dispatch(Box::new(move || {
			body.apply(value, origin);
		})) {
			tracing::warn!(%error, "dropping posted value");
		}
	}

	/// Pulls a fresher value through `before_get`. Must run on the dispatcher.
	fn refresh(&self) {
		let before_get = self.hooks.read().before_get.clone();
		if let Some(before_get) = before_get {
			self.apply(before_get(), Origin::Upstream);
		}
	}

	/// Refreshes, then registers `listener` and hands it the current value.
	/// Must run on the dispatcher.
	fn attach(&self, id: u64, listener: Listener<R>) {
		self.refresh();
		self.listeners.lock().push((id, listener.clone()));

		let current = self.current.lock().clone();
		listener(current.value_or_none());
	}

	/// Must run on the dispatcher.
	fn apply(&self, value: T, origin: Origin) -> ObservableOptional<T> {
		let next = ObservableOptional::Value(value.clone()).as_result(self.default_value.as_ref());

		if origin == Origin::Local {
			// Compare against the source, not a stale cache.
			self.refresh();
			if *self.current.lock() == next {
				return ObservableOptional::Value(value);
			}

			let write_through = self.hooks.read().write_through.clone();
			if let Some(write_through) = write_through {
				write_through(&value);
			}
		}

		{
			let mut current = self.current.lock();
			if *current == next {
				return ObservableOptional::Value(value);
			}
			*current = next.clone();
		}

		tracing::trace!(?origin, "observed value changed");
		self.notify(&next);
		ObservableOptional::Value(value)
	}

	fn notify(&self, value: &ObservableOptional<R>) {
		let listeners: SmallVec<[Listener<R>; 4]> = self
			.listeners
			.lock()
			.iter()
			.map(|(_, listener)| listener.clone())
			.collect();

		tracing::trace!(listeners = listeners.len(), "notifying");

		let mut first_panic: Option<Box<dyn Any + Send>> = None;
		for listener in listeners {
			let result = panic::catch_unwind(AssertUnwindSafe(|| listener(value.value_or_none())));
			if let Err(payload) = result {
				tracing::error!("listener panicked during notification");
				first_panic.get_or_insert(payload);
			}
		}

		if let Some(payload) = first_panic {
			panic::resume_unwind(payload);
		}
	}
}

impl<R, T> std::fmt::Debug for Observation<R, T>
where
	R: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Observation")
			.field("current", &*self.body.current.lock())
			.field("listeners", &self.body.listeners.lock().len())
			.finish()
	}
}
