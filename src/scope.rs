use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{Dispatcher, Error, Immediate};

/// Hosts background work such as bindings and adapter collection.
///
/// Cancelling a scope stops every task spawned in it and in its children.
/// Listeners registered through `observe` are not affected.
///
/// Observables created by adapters in a scope use the scope's dispatcher
/// as their main context.
#[derive(Clone)]
pub struct Scope {
	handle: Handle,
	token: CancellationToken,
	dispatcher: Arc<dyn Dispatcher>,
}

impl Scope {
	pub fn new(handle: Handle) -> Self {
		Scope {
			handle,
			token: CancellationToken::new(),
			dispatcher: Immediate::shared(),
		}
	}

	pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
		self.dispatcher = dispatcher;
		self
	}

	pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
		self.dispatcher.clone()
	}

	/// A scope on the runtime the caller is running in.
	pub fn current() -> Result<Self, Error> {
		Handle::try_current()
			.map(Scope::new)
			.map_err(|_| Error::NoRuntime)
	}

	pub fn child(&self) -> Scope {
		Scope {
			handle: self.handle.clone(),
			token: self.token.child_token(),
			dispatcher: self.dispatcher.clone(),
		}
	}

	pub fn cancel(&self) {
		self.token.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	pub fn token(&self) -> &CancellationToken {
		&self.token
	}

	pub fn spawn<F>(&self, future: F) -> JoinHandle<()>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let token = self.token.clone();
		self.handle.spawn(async move {
			tokio::select! {
				_ = token.cancelled() => {
					tracing::debug!("scope cancelled");
				}
				_ = future => {}
			}
		})
	}
}

impl std::fmt::Debug for Scope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Scope")
			.field("cancelled", &self.is_cancelled())
			.finish()
	}
}
