use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};

use crate::{Disposable, Narrow, Observation, SimpleDisposable};

/// A [`Stream`] of the values an observation takes.
///
/// Dropping it disposes the underlying listener.
pub struct Updates<R> {
	receiver: mpsc::UnboundedReceiver<Option<R>>,
	subscription: SimpleDisposable,
}

impl<R> Updates<R>
where
	R: Clone + PartialEq + Send + Sync + 'static,
{
	pub(crate) fn new<T>(observation: &Observation<R, T>) -> Self
	where
		T: Narrow<R> + Clone + Send + Sync + 'static,
	{
		let (sender, receiver) = mpsc::unbounded();
		let subscription = observation.observe(move |value| {
			let _ = sender.unbounded_send(value.cloned());
		});

		Updates {
			receiver,
			subscription,
		}
	}
}

impl<R> Stream for Updates<R> {
	type Item = Option<R>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.receiver.poll_next_unpin(cx)
	}
}

impl<R> Drop for Updates<R> {
	fn drop(&mut self) {
		self.subscription.dispose();
	}
}
