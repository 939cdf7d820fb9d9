use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The main context stopped accepting tasks.
	#[error("main context is closed")]
	ContextClosed,

	#[error("failed to spawn the main context thread")]
	Spawn(#[source] io::Error),

	/// No tokio runtime is running on the current thread.
	#[error("no tokio runtime available to host the scope")]
	NoRuntime,
}
