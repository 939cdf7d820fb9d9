pub use enclose::*;

/// Builds a listener closure, cloning the listed captures first.
///
/// ```ignore
/// let log = Arc::new(Mutex::new(Vec::new()));
/// subject.observe(observer!((log) value => log.lock().push(*value)));
/// ```
#[macro_export]
macro_rules! observer {
    (( $($d_tt:tt)* ) $value:ident => $($b:tt)*) => {
        $crate::macros::enclose!(($( $d_tt )*) move |$value| { $($b)* })
    };
    ($value:ident => $($b:tt)*) => {
        move |$value| { $($b)* }
    };
}
