use std::fmt::Debug;

/// A value that may not have been observed yet.
///
/// `Nothing` means "no value was ever set", which is different from
/// `Value(None)` for an optional payload.
#[derive(Clone, Copy)]
pub enum ObservableOptional<T> {
	Value(T),
	Nothing,
}

impl<T> Default for ObservableOptional<T> {
	fn default() -> Self {
		ObservableOptional::Nothing
	}
}

impl<T> ObservableOptional<T> {
	#[inline]
	pub fn value_or_none(&self) -> Option<&T> {
		match self {
			ObservableOptional::Value(value) => Some(value),
			ObservableOptional::Nothing => None,
		}
	}

	#[inline]
	pub fn into_option(self) -> Option<T> {
		match self {
			ObservableOptional::Value(value) => Some(value),
			ObservableOptional::Nothing => None,
		}
	}

	#[inline]
	pub fn is_nothing(&self) -> bool {
		matches!(self, ObservableOptional::Nothing)
	}

	pub fn as_ref(&self) -> ObservableOptional<&T> {
		match self {
			ObservableOptional::Value(value) => ObservableOptional::Value(value),
			ObservableOptional::Nothing => ObservableOptional::Nothing,
		}
	}

	pub fn map<U>(self, func: impl FnOnce(T) -> U) -> ObservableOptional<U> {
		match self {
			ObservableOptional::Value(value) => ObservableOptional::Value(func(value)),
			ObservableOptional::Nothing => ObservableOptional::Nothing,
		}
	}

	/// Narrows the held value to `R`.
	///
	/// Falls back to `default` (or `Nothing` without one) when there is no
	/// value or the value cannot be narrowed.
	pub fn as_result<R>(self, default: Option<&R>) -> ObservableOptional<R>
	where
		T: Narrow<R>,
		R: Clone,
	{
		let narrowed = match self {
			ObservableOptional::Value(value) => value.narrow(),
			ObservableOptional::Nothing => None,
		};

		match (narrowed, default) {
			(Some(value), _) => ObservableOptional::Value(value),
			(None, Some(default)) => ObservableOptional::Value(default.clone()),
			(None, None) => ObservableOptional::Nothing,
		}
	}
}

impl<T, U> PartialEq<ObservableOptional<U>> for ObservableOptional<T>
where
	T: PartialEq<U>,
{
	fn eq(&self, other: &ObservableOptional<U>) -> bool {
		match (self, other) {
			(ObservableOptional::Value(a), ObservableOptional::Value(b)) => a == b,
			(ObservableOptional::Nothing, ObservableOptional::Nothing) => true,
			_ => false,
		}
	}
}

impl<T: Eq> Eq for ObservableOptional<T> {}

impl<T: Debug> Debug for ObservableOptional<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ObservableOptional::Value(value) => f.debug_tuple("Value").field(value).finish(),
			ObservableOptional::Nothing => f.write_str("Nothing"),
		}
	}
}

/// Capability query: can this value be treated as an `R`?
pub trait Narrow<R> {
	fn narrow(self) -> Option<R>;
}

impl<T> Narrow<T> for T {
	#[inline]
	fn narrow(self) -> Option<T> {
		Some(self)
	}
}

impl<T> Narrow<T> for Option<T> {
	#[inline]
	fn narrow(self) -> Option<T> {
		self
	}
}
