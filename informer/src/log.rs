//! Logging shims.
//!
//! Each macro forwards to its `tracing` namesake when the `tracing` feature is
//! enabled and expands to an empty block otherwise. Bindings that exist only
//! to be logged are consumed under `cfg(not(feature = "tracing"))` at the
//! call site.

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    }};
}
