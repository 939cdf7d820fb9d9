use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use futures::channel::{mpsc, oneshot};
use futures::StreamExt;
use parking_lot::Mutex;

use crate::Error;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The execution context that owns observable state.
///
/// Every mutation and every notification round runs on the dispatcher.
/// Callers that are not on it get redirected.
pub trait Dispatcher: Send + Sync + 'static {
	/// Returns `true` if the calling thread already runs on this context.
	fn is_current(&self) -> bool;

	/// Queue `task` for execution on this context.
	fn dispatch(&self, task: Task) -> Result<(), Error>;
}

/// Runs everything inline on the caller's thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Immediate {
	pub fn shared() -> Arc<dyn Dispatcher> {
		Arc::new(Immediate)
	}
}

impl Dispatcher for Immediate {
	fn is_current(&self) -> bool {
		true
	}

	fn dispatch(&self, task: Task) -> Result<(), Error> {
		task();
		Ok(())
	}
}

/// A dedicated thread that plays the role of the "main" context.
///
/// Tasks are executed one at a time in the order they were queued.
pub struct MainContext {
	sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
	thread_id: ThreadId,
	handle: Mutex<Option<JoinHandle<()>>>,
}

pub struct MainContextBuilder {
	name: String,
	stack_size: Option<usize>,
}

impl Default for MainContextBuilder {
	fn default() -> Self {
		MainContextBuilder {
			name: String::from("observation-main"),
			stack_size: None,
		}
	}
}

impl MainContextBuilder {
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn stack_size(mut self, size: usize) -> Self {
		self.stack_size = Some(size);
		self
	}

	pub fn spawn(self) -> Result<Arc<MainContext>, Error> {
		let (sender, receiver) = mpsc::unbounded::<Task>();

		let mut builder = thread::Builder::new().name(self.name.clone());
		if let Some(size) = self.stack_size {
			builder = builder.stack_size(size);
		}

		let handle = builder
			.spawn(move || run_queue(receiver))
			.map_err(Error::Spawn)?;

		tracing::debug!(name = %self.name, "main context started");

		Ok(Arc::new(MainContext {
			sender: Mutex::new(Some(sender)),
			thread_id: handle.thread().id(),
			handle: Mutex::new(Some(handle)),
		}))
	}
}

fn run_queue(mut receiver: mpsc::UnboundedReceiver<Task>) {
	futures::executor::block_on(async {
		while let Some(task) = receiver.next().await {
			if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
				tracing::error!("task panicked on the main context");
			}
		}
	});
	tracing::debug!("main context stopped");
}

impl MainContext {
	pub fn builder() -> MainContextBuilder {
		MainContextBuilder::default()
	}

	pub fn spawn() -> Result<Arc<MainContext>, Error> {
		MainContextBuilder::default().spawn()
	}

	pub fn is_closed(&self) -> bool {
		self.sender.lock().is_none()
	}

	/// Stops accepting tasks and waits until the queued ones have run.
	///
	/// Called from the context itself it only closes the queue.
	pub fn shutdown(&self) {
		self.sender.lock().take();

		if self.is_current() {
			return;
		}

		if let Some(handle) = self.handle.lock().take() {
			if handle.join().is_err() {
				tracing::error!("main context thread terminated abnormally");
			}
		}
	}
}

impl Dispatcher for MainContext {
	fn is_current(&self) -> bool {
		thread::current().id() == self.thread_id
	}

	fn dispatch(&self, task: Task) -> Result<(), Error> {
		match &*self.sender.lock() {
			Some(sender) => sender
				.unbounded_send(task)
				.map_err(|_| Error::ContextClosed),
			None => Err(Error::ContextClosed),
		}
	}
}

impl Drop for MainContext {
	fn drop(&mut self) {
		self.sender.get_mut().take();
	}
}

impl std::fmt::Debug for MainContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MainContext")
			.field("thread_id", &self.thread_id)
			.field("closed", &self.is_closed())
			.finish()
	}
}

/// Runs `func` on the dispatcher and blocks until it is done.
///
/// A panic inside `func` is resumed on the calling thread.
pub(crate) fn run_blocking<O>(
	dispatcher: &dyn Dispatcher,
	func: impl FnOnce() -> O + Send + 'static,
) -> Result<O, Error>
where
	O: Send + 'static,
{
	if dispatcher.is_current() {
		return Ok(func());
	}

	let receiver = queue_with_result(dispatcher, func)?;
	match futures::executor::block_on(receiver) {
		Ok(Ok(output)) => Ok(output),
		Ok(Err(payload)) => panic::resume_unwind(payload),
		Err(oneshot::Canceled) => Err(Error::ContextClosed),
	}
}

/// Like [`run_blocking`], but suspends instead of blocking.
pub(crate) async fn run_async<O>(
	dispatcher: Arc<dyn Dispatcher>,
	func: impl FnOnce() -> O + Send + 'static,
) -> Result<O, Error>
where
	O: Send + 'static,
{
	if dispatcher.is_current() {
		return Ok(func());
	}

	let receiver = queue_with_result(&*dispatcher, func)?;
	match receiver.await {
		Ok(Ok(output)) => Ok(output),
		Ok(Err(payload)) => panic::resume_unwind(payload),
		Err(oneshot::Canceled) => Err(Error::ContextClosed),
	}
}

type Outcome<O> = thread::Result<O>;

fn queue_with_result<O>(
	dispatcher: &dyn Dispatcher,
	func: impl FnOnce() -> O + Send + 'static,
) -> Result<oneshot::Receiver<Outcome<O>>, Error>
where
	O: Send + 'static,
{
	let (sender, receiver) = oneshot::channel();
	dispatcher.dispatch(Box::new(move || {
		let _ = sender.send(panic::catch_unwind(AssertUnwindSafe(func)));
	}))?;
	Ok(receiver)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn immediate_runs_inline() {
		let caller = thread::current().id();
		let result = run_blocking(&Immediate, move || thread::current().id() == caller).unwrap();
		assert!(result);
	}

	#[test]
	fn main_context_runs_off_caller_thread() {
		let context = MainContext::spawn().unwrap();
		let caller = thread::current().id();

		let (on_main, thread_id) = run_blocking(&*context, {
			let context = context.clone();
			move || (context.is_current(), thread::current().id())
		})
		.unwrap();

		assert!(on_main);
		assert_ne!(thread_id, caller);
		assert!(!context.is_current());
		context.shutdown();
	}

	#[test]
	fn tasks_run_in_queue_order() {
		let context = MainContext::spawn().unwrap();
		let seen = Arc::new(Mutex::new(Vec::new()));

		for i in 0..10 {
			let seen = seen.clone();
			context.dispatch(Box::new(move || seen.lock().push(i))).unwrap();
		}

		context.shutdown();
		assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
	}

	#[test]
	fn closed_context_rejects_tasks() {
		let context = MainContext::spawn().unwrap();
		context.shutdown();

		assert!(context.is_closed());
		assert!(matches!(
			run_blocking(&*context, || ()),
			Err(Error::ContextClosed)
		));
	}

	#[test]
	#[should_panic(expected = "boom")]
	fn panic_is_resumed_on_caller() {
		let context = MainContext::spawn().unwrap();
		let _ = run_blocking(&*context, || panic!("boom"));
	}
}
