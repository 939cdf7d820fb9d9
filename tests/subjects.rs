use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use observation::{
	observer, BaseObservable, BaseSubject, DefaultObservable, DefaultSubject, Disposable, DisposeBag,
	InitializedObservable, InitializedSubject, ObservableOptional, UninitializedObservable, UninitializedSubject,
};

use crate::mock::{Recorder, SharedMock, Spy};

#[test]
fn observable_view_shares_the_subject_value() {
	let subject = InitializedSubject::new(String::from("first"));
	let observable = subject.as_observable();

	let mock = SharedMock::new();
	mock.get().expect_next().times(3).return_const(());

	let _disposable = observable.observe({
		let mock = mock.clone();
		move |value| mock.get().next(value.clone())
	});

	subject.post(String::from("second"));
	subject.post(String::from("second"));
	subject.post(String::from("third"));

	mock.get().checkpoint();
	assert_eq!(observable.current(), "third");
	assert_eq!(subject.observation().listener_count(), 1);
}

#[test]
fn initialized_observable_keeps_its_value() {
	let observable = InitializedObservable::new(42u32);
	let received = Recorder::new();

	let _disposable = observable.observe(observer!((received) value => received.push(*value)));

	assert_eq!(observable.current(), 42);
	assert_eq!(observable.current_or_none(), Some(42));
	assert_eq!(observable.initial_value(), &ObservableOptional::Value(42u32));
	assert_eq!(received.values(), vec![42]);
}

#[test]
fn uninitialized_observable_never_updates_itself() {
	let observable: UninitializedObservable<u8> = Default::default();
	let received = Recorder::new();

	let _disposable = observable.observe(observer!((received) value => received.push(value.copied())));

	assert_eq!(observable.current_or_none(), None);
	assert_eq!(received.values(), vec![None]);
}

#[test]
fn uninitialized_subject_feeds_its_observable() {
	let subject = UninitializedSubject::<Vec<i32>>::new();
	let observable = subject.as_observable();
	let received = Recorder::new();

	let _disposable = observable.observe(observer!((received) value => received.push(value.cloned())));

	subject.post(vec![1, 2]);
	subject.set_blocking(vec![1, 2, 3]).unwrap();

	assert_eq!(
		received.values(),
		vec![None, Some(vec![1, 2]), Some(vec![1, 2, 3])]
	);
	assert!(observable.initial_value().is_nothing());
}

#[test]
fn default_subject_reads_default_for_none() {
	let subject = DefaultSubject::new(10, None);
	let received = Recorder::new();

	let _disposable = subject.observe(observer!((received) value => received.push(*value)));
	assert_eq!(subject.current(), 10);
	assert_eq!(subject.default_value(), &10);

	subject.post(Some(3));
	subject.post(None);
	subject.post(None);
	subject.post(Some(10));

	assert_eq!(received.values(), vec![10, 3, 10]);
	assert_eq!(subject.current_or_none(), Some(10));
}

#[test]
fn default_observable_starts_with_initial() {
	let observable = DefaultObservable::new(String::from("fallback"), Some(String::from("given")));

	assert_eq!(observable.current(), "given");
	assert_eq!(
		observable.initial_value(),
		&ObservableOptional::Value(Some(String::from("given")))
	);
	assert_eq!(observable.default_value(), "fallback");
}

#[test]
fn default_subject_view_sees_updates() {
	let subject = DefaultSubject::new('x', Some('a'));
	let observable = subject.as_observable();
	let received = Recorder::new();

	let _disposable = observable.observe_optional(observer!((received) value => received.push(value.copied())));

	subject.set_blocking(None).unwrap();

	assert_eq!(received.values(), vec![Some('a'), Some('x')]);
	assert_eq!(observable.current(), 'x');
}

#[test]
fn dispose_bag_releases_all_listeners() {
	let first = InitializedSubject::new(0);
	let second = UninitializedSubject::<i32>::new();
	let calls = Arc::new(AtomicUsize::new(0));

	let bag = DisposeBag::new();
	first
		.observe(observer!((calls) _value => {
			calls.fetch_add(1, Ordering::SeqCst);
		}))
		.add_to(&bag);
	second
		.observe(observer!((calls) _value => {
			calls.fetch_add(1, Ordering::SeqCst);
		}))
		.add_to(&bag);
	assert_eq!(bag.len(), 2);
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	bag.dispose();
	first.post(1);
	second.post(1);

	assert!(bag.is_empty());
	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(first.observation().listener_count(), 0);
	assert_eq!(second.observation().listener_count(), 0);
}

#[test]
fn observer_without_captures() {
	let subject = InitializedSubject::new(1);
	let disposable = subject.observe(observer!(value => assert!(*value > 0)));

	subject.post(2);
	disposable.dispose();
	subject.post(-1);

	assert!(disposable.is_disposed());
}

#[test]
fn subject_handles_are_clones_of_one_value() {
	let subject = InitializedSubject::new(1);
	let other = subject.clone();

	other.post(2);

	assert_eq!(subject.current(), 2);
	assert!(!subject.observation().is_observed());
}
