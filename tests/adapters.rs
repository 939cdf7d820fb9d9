use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc;
use observation::adapters::broadcast::{BroadcastDefaultSubjectExt, BroadcastSubjectExt};
use observation::adapters::property::{Property, ReadProperty};
use observation::adapters::stream::StreamObservableExt;
use observation::adapters::watch::{WatchDefaultSubjectExt, WatchObservableExt, WatchSubjectExt};
use observation::{observer, BaseObservable, BaseSubject, Error, InitializedSubject, Scope};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use crate::mock::Recorder;

async fn eventually(mut condition: impl FnMut() -> bool) {
	for _ in 0..400 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	panic!("condition was not met in time");
}

#[test]
fn scope_requires_a_runtime() {
	assert!(matches!(Scope::current(), Err(Error::NoRuntime)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stream_is_collected_once_observed() {
	crate::init_tracing();
	let scope = Scope::current().unwrap();
	let (sender, receiver) = mpsc::unbounded::<i32>();
	let observable = receiver.into_initialized_observable(0, &scope);

	sender.unbounded_send(1).unwrap();
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(observable.current(), 0);

	let received = Recorder::new();
	let _disposable = observable.observe(observer!((received) value => received.push(*value)));
	eventually(|| observable.current() == 1).await;

	sender.unbounded_send(2).unwrap();
	eventually(|| received.values().last() == Some(&2)).await;
	assert!(received.values().ends_with(&[1, 2]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn uninitialized_stream_starts_empty() {
	let scope = Scope::current().unwrap();
	let (sender, receiver) = mpsc::unbounded::<&str>();
	let observable = receiver.into_uninitialized_observable(&scope);
	assert_eq!(observable.current_or_none(), None);

	let received = Recorder::new();
	let _disposable = observable.observe(observer!((received) value => received.push(value.copied())));

	sender.unbounded_send("x").unwrap();
	eventually(|| received.len() == 2).await;
	sender.unbounded_send("y").unwrap();
	eventually(|| received.len() == 3).await;
	assert_eq!(received.values(), vec![None, Some("x"), Some("y")]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn default_stream_reads_default_for_none() {
	let scope = Scope::current().unwrap();
	let (sender, receiver) = mpsc::unbounded::<Option<i32>>();
	let observable = receiver.into_default_observable(5, &scope);
	assert_eq!(observable.current(), 5);

	let received = Recorder::new();
	let _disposable = observable.observe(observer!((received) value => received.push(*value)));

	sender.unbounded_send(Some(1)).unwrap();
	eventually(|| received.len() == 2).await;
	sender.unbounded_send(None).unwrap();
	eventually(|| received.len() == 3).await;
	assert_eq!(received.values(), vec![5, 1, 5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_scope_stops_collection() {
	let scope = Scope::current().unwrap().child();
	let (sender, receiver) = mpsc::unbounded::<i32>();
	let observable = receiver.into_initialized_observable(0, &scope);

	let _disposable = observable.observe(|_| {});
	sender.unbounded_send(1).unwrap();
	eventually(|| observable.current() == 1).await;

	scope.cancel();
	assert!(scope.is_cancelled());
	tokio::time::sleep(Duration::from_millis(20)).await;

	let _ = sender.unbounded_send(2);
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(observable.current(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broadcast_subject_sends_and_receives() {
	crate::init_tracing();
	let scope = Scope::current().unwrap();
	let (sender, _) = broadcast::channel(16);
	let subject = sender.to_initialized_subject(0, &scope);
	let mut external = sender.subscribe();

	subject.post(1);
	assert_eq!(external.recv().await.unwrap(), 1);

	let received = Recorder::new();
	let _disposable = subject.observe(observer!((received) value => received.push(*value)));

	sender.send(7).unwrap();
	eventually(|| received.len() == 2).await;

	subject.post(8);
	subject.post(10);
	sender.send(11).unwrap();
	eventually(|| received.len() == 5).await;

	assert_eq!(received.values(), vec![1, 7, 8, 10, 11]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broadcast_subjects_without_value() {
	let scope = Scope::current().unwrap();
	let (sender, _) = broadcast::channel::<String>(4);
	let subject = sender.to_uninitialized_subject(&scope);
	assert_eq!(subject.current_or_none(), None);

	let _disposable = subject.observe(|_| {});
	sender.send(String::from("hello")).unwrap();
	eventually(|| subject.current_or_none().as_deref() == Some("hello")).await;

	let (sender, _) = broadcast::channel::<Option<u8>>(4);
	let subject = sender.to_default_subject(9, &scope);
	let _disposable = subject.observe(|_| {});
	sender.send(Some(1)).unwrap();
	eventually(|| subject.current() == 1).await;
	sender.send(None).unwrap();
	eventually(|| subject.current() == 9).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_subject_pulls_and_writes_through() {
	let scope = Scope::current().unwrap();
	let sender = Arc::new(watch::channel(1).0);
	let subject = sender.to_initialized_subject(&scope);

	sender.send_replace(2);
	assert_eq!(subject.current(), 2);

	subject.post(3);
	assert_eq!(*sender.borrow(), 3);

	let received = Recorder::new();
	let _disposable = subject.observe(observer!((received) value => received.push(*value)));
	sender.send_replace(4);

	eventually(|| received.values().last() == Some(&4)).await;
	assert_eq!(received.values(), vec![3, 4]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_default_subject_reads_default() {
	let scope = Scope::current().unwrap();
	let sender = Arc::new(watch::channel(None::<i32>).0);
	let subject = sender.to_default_subject(0, &scope);
	assert_eq!(subject.current(), 0);

	sender.send_replace(Some(5));
	assert_eq!(subject.current(), 5);

	subject.post(None);
	assert_eq!(*sender.borrow(), None);
	assert_eq!(subject.current(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watch_receiver_becomes_observable() {
	let scope = Scope::current().unwrap();
	let (sender, receiver) = watch::channel("a");
	let observable = receiver.into_initialized_observable(&scope);

	sender.send_replace("b");
	assert_eq!(observable.current(), "b");

	let received = Recorder::new();
	let _disposable = observable.observe(observer!((received) value => received.push(*value)));
	sender.send_replace("c");

	eventually(|| received.values().last() == Some(&"c")).await;
	assert_eq!(received.values(), vec!["b", "c"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bind_forwards_until_cancelled() {
	let scope = Scope::current().unwrap().child();
	let subject = InitializedSubject::new(0);
	let (sender, receiver) = mpsc::unbounded::<i32>();

	let handle = subject.bind(receiver, &scope);
	sender.unbounded_send(1).unwrap();
	eventually(|| subject.current() == 1).await;

	scope.cancel();
	handle.await.unwrap();

	let _ = sender.unbounded_send(2);
	tokio::time::sleep(Duration::from_millis(20)).await;
	assert_eq!(subject.current(), 1);
}

#[test]
fn property_subject_tracks_the_backing_value() {
	let backing = Arc::new(Mutex::new(1));
	let property = Property::new(
		{
			let backing = backing.clone();
			move || *backing.lock()
		},
		{
			let backing = backing.clone();
			move |value| *backing.lock() = value
		},
	);
	let subject = property.clone().into_initialized_subject();

	*backing.lock() = 2;
	assert_eq!(subject.current(), 2);

	subject.post(3);
	assert_eq!(*backing.lock(), 3);
	assert_eq!(property.get(), 3);

	let observable = ReadProperty::from(property).into_initialized_observable();
	*backing.lock() = 4;
	assert_eq!(observable.current(), 4);
	assert_eq!(subject.current(), 4);
}

#[test]
fn property_changed_before_observe_is_delivered_once() {
	let backing = Arc::new(AtomicUsize::new(1));
	let subject = Property::new(
		{
			let backing = backing.clone();
			move || backing.load(Ordering::SeqCst)
		},
		{
			let backing = backing.clone();
			move |value| backing.store(value, Ordering::SeqCst)
		},
	)
	.into_initialized_subject();

	backing.store(2, Ordering::SeqCst);

	let received = Recorder::new();
	let _disposable = subject.observe(observer!((received) value => received.push(*value)));

	assert_eq!(received.values(), vec![2]);

	backing.store(3, Ordering::SeqCst);
	assert_eq!(subject.current(), 3);
	assert_eq!(received.values(), vec![2, 3]);
}

#[test]
fn property_default_subject() {
	let backing: Arc<Mutex<Option<&str>>> = Arc::new(Mutex::new(None));
	let subject = Property::new(
		{
			let backing = backing.clone();
			move || *backing.lock()
		},
		{
			let backing = backing.clone();
			move |value| *backing.lock() = value
		},
	)
	.into_default_subject("none");

	assert_eq!(subject.current(), "none");

	subject.post(Some("some"));
	assert_eq!(*backing.lock(), Some("some"));
	assert_eq!(subject.current(), "some");

	*backing.lock() = None;
	assert_eq!(subject.current(), "none");
}

#[test]
fn read_property_observable() {
	let counter = Arc::new(Mutex::new(0u64));
	let observable = ReadProperty::new({
		let counter = counter.clone();
		move || *counter.lock()
	})
	.into_initialized_observable();

	let received = Recorder::new();
	let _disposable = observable.observe(observer!((received) value => received.push(*value)));

	*counter.lock() = 10;
	assert_eq!(observable.current(), 10);
	assert_eq!(received.values(), vec![0, 10]);
}
