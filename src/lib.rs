//! Observable values and subjects.
//!
//! An [`Observation`] holds the current value of something and calls its
//! listeners whenever that value changes. Observables expose it read-only,
//! subjects additionally allow updating it. Every observable comes in three
//! flavours:
//!
//! * *initialized*: always has a value,
//! * *uninitialized*: starts empty,
//! * *default*: reads as a fallback value while empty.
//!
//! All mutation and notification happens on a [`Dispatcher`], the "main"
//! context. Calls from other threads block ([`Observation::set_blocking`])
//! or suspend ([`Observation::set_async`]) until the dispatcher ran them.

pub mod adapters;
pub mod macros;

mod base;
mod default;
mod dispatch;
mod disposable;
mod error;
mod initialized;
mod observation;
mod optional;
#[cfg(feature = "tokio")]
mod scope;
mod uninitialized;
mod updates;

pub use base::{BaseObservable, BaseSubject};
pub use default::{DefaultObservable, DefaultSubject, ObservationDefault};
pub use dispatch::{Dispatcher, Immediate, MainContext, MainContextBuilder, Task};
pub use disposable::{Disposable, DisposeBag, SimpleDisposable};
pub use error::Error;
pub use initialized::{InitializedObservable, InitializedSubject, ObservationInitialized};
pub use observation::{Listener, Observation};
pub use optional::{Narrow, ObservableOptional};
#[cfg(feature = "tokio")]
pub use scope::Scope;
pub use uninitialized::{ObservationUninitialized, UninitializedObservable, UninitializedSubject};
pub use updates::Updates;
