//! Utility macros and functions for the HTTP crate.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(line_end <= MAX_REQUEST_LINE_BYTES, ParseError::too_large_request(line_end, MAX_REQUEST_LINE_BYTES));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
