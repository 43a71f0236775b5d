/// Unwraps an `Ok`, panicking with the `Err` otherwise. Extra arguments are
/// formatted into the panic message.
#[macro_export]
macro_rules! assert_ok {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Ok(v) => v,
            Err(e) => $crate::result::fail("Ok", &e, None $(.or(Some(format!($($t)*))))?),
        }
    };
}

/// Unwraps an `Err`, panicking with the `Ok` value otherwise. Extra arguments
/// are formatted into the panic message.
#[macro_export]
macro_rules! assert_err {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Err(e) => e,
            Ok(v) => $crate::result::fail("Err", &v, None $(.or(Some(format!($($t)*))))?),
        }
    };
}

#[doc(hidden)]
#[track_caller]
pub fn fail(expected: &str, actual: &dyn std::fmt::Debug, context: Option<String>) -> ! {
    match context {
        Some(context) => panic!("expected `{expected}`; actual={actual:?}, {context}"),
        None => panic!("expected `{expected}`; actual={actual:?}"),
    }
}
