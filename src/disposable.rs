use std::sync::Arc;

use parking_lot::Mutex;

/// A handle that releases a listener or resource.
pub trait Disposable: Send + Sync {
	/// Releases the underlying resource. Calling it again does nothing.
	fn dispose(&self);

	fn add_to(self, bag: &DisposeBag)
	where
		Self: Sized + 'static,
	{
		bag.add(self);
	}
}

impl<D: Disposable + ?Sized> Disposable for Box<D> {
	fn dispose(&self) {
		(**self).dispose()
	}
}

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
	fn dispose(&self) {
		(**self).dispose()
	}
}

/// Runs its release action at most once.
#[must_use = "dropping a disposable does not dispose it"]
pub struct SimpleDisposable {
	on_dispose: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl SimpleDisposable {
	pub fn new(on_dispose: impl FnOnce() + Send + 'static) -> Self {
		SimpleDisposable {
			on_dispose: Mutex::new(Some(Box::new(on_dispose))),
		}
	}

	pub fn is_disposed(&self) -> bool {
		self.on_dispose.lock().is_none()
	}
}

impl Disposable for SimpleDisposable {
	fn dispose(&self) {
		let on_dispose = self.on_dispose.lock().take();
		if let Some(on_dispose) = on_dispose {
			on_dispose();
		}
	}
}

impl std::fmt::Debug for SimpleDisposable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SimpleDisposable")
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

/// A container of disposables released together.
///
/// Clones share the same contents, so a bag can be nested inside another
/// bag and still be used directly. Disposing empties the bag; it accepts
/// new items afterwards.
#[derive(Clone, Default)]
pub struct DisposeBag {
	items: Arc<Mutex<Vec<Box<dyn Disposable>>>>,
}

impl DisposeBag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, disposable: impl Disposable + 'static) {
		self.items.lock().push(Box::new(disposable));
	}

	pub fn len(&self) -> usize {
		self.items.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.lock().is_empty()
	}
}

impl Disposable for DisposeBag {
	fn dispose(&self) {
		let items = std::mem::take(&mut *self.items.lock());
		for item in items {
			item.dispose();
		}
	}
}

impl std::fmt::Debug for DisposeBag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DisposeBag").field("len", &self.len()).finish()
	}
}
