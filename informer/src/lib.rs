//! # informer - Filtered, Replay-Aware Event Emitter
//!
//! `informer` publishes events to listeners subscribed either by name or by
//! an attribute [`Filter`]. Listeners may finish synchronously or declare
//! themselves asynchronous and report later, one at a time (series) or
//! concurrently (parallel). Late subscribers can catch up on events emitted
//! before they subscribed.
//!
//! ## Quick Start
//!
//! ```rust
//! use informer::prelude::*;
//!
//! let informer = Informer::new();
//!
//! // Simple subscription by name.
//! informer.on("saved", from_fn(|_, args| {
//!     assert_eq!(args[0], Value::from("report.txt"));
//!     Ok(())
//! }));
//!
//! // Filter subscription: reached by any emitted filter carrying these attributes.
//! informer.on(filter! { "type" => "job", "queue" => "high" }, from_fn(|ctx, _| {
//!     assert_eq!(ctx.filter().unwrap().get("id"), Some(&Value::from(7)));
//!     Ok(())
//! }));
//!
//! informer.emit("saved", ("report.txt",)).unwrap();
//! informer.emit(filter! { "type" => "job", "queue" => "high", "id" => 7 }, ()).unwrap();
//! ```
//!
//! ## Asynchronous listeners
//!
//! ```rust
//! use informer::prelude::*;
//! use std::thread;
//!
//! let informer = Informer::new();
//! informer.on("upload", from_fn(|ctx, _| {
//!     let done = ctx.wait(WaitMode::Series);
//!     thread::spawn(move || done.done());
//!     Ok(())
//! }));
//!
//! let (tx, rx) = std::sync::mpsc::channel();
//! informer
//!     .emit_with("upload", (), move |error, stopped| {
//!         tx.send((error.is_none(), stopped)).unwrap();
//!     })
//!     .unwrap();
//! assert_eq!(rx.recv().unwrap(), (true, false));
//! ```
//!
//! # Error Types
//!
//! - [`EmitError`] - Faults raised or reported by an emission
//! - [`BoxError`] - What listeners return when they fail

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

#[macro_use]
mod log;

mod config;
mod context;
mod emitter;
mod listener;

pub mod testing;

pub use config::{InformerBuilder, InformerConfig};
pub use context::{Completion, Context, ContextFlags, WaitMode};
pub use emitter::{EmitStatus, Informer, NEW_LISTENER, QueryResult, REMOVE_LISTENER};
pub use listener::{FromFn, IntoListener, Listener, ListenerRef, from_fn, named};

pub use informer_core::{BoxError, EmitError, EventType, Filter, IntoArgs, SharedError, TYPE_KEY, Value, filter};
pub use informer_std::{Named, sequence};

/// Standard augmentations: slice helpers and named functions.
pub mod collections {
    pub use informer_std::collections::{SliceExt, ValueSliceExt, cast};
    pub use informer_std::named::{InvalidName, is_valid_name};
}

/// Prelude module - common imports for Informer.
///
/// # Usage
///
/// ```rust
/// use informer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Completion, Context, EmitError, EmitStatus, EventType, Filter, Informer,
        Listener, ListenerRef, Value, WaitMode, filter, from_fn, named,
    };
}
